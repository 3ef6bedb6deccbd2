use crate::config::SyncConfig;
use crate::datasources::FieldDataSource;
use crate::error::{Result, SigirError};
use crate::models::{DataSource, FieldDataSnapshot, FieldProfile, SourceOutcome, SourceReport};
use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Fans out to every field source, keeps the latest committed snapshot.
pub struct DataSyncService<S> {
    sources: S,
    timeout: Duration,
    rainfall_days: u32,
    generation: AtomicU64,
    current: Arc<RwLock<Option<FieldDataSnapshot>>>,
}

impl<S: FieldDataSource> DataSyncService<S> {
    pub fn new(sources: S, sync: &SyncConfig) -> Self {
        Self {
            sources,
            timeout: Duration::from_secs(sync.timeout_secs),
            rainfall_days: sync.rainfall_days,
            generation: AtomicU64::new(0),
            current: Arc::new(RwLock::new(None)),
        }
    }

    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Starts a new request generation. Anything still in flight becomes stale.
    pub fn begin_refresh(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    #[cfg(test)]
    pub async fn current_snapshot(&self) -> Option<FieldDataSnapshot> {
        self.current.read().await.clone()
    }

    /// One attempt per source. Returns the snapshot only if it was committed.
    pub async fn refresh(&self, field: &FieldProfile) -> Option<FieldDataSnapshot> {
        let generation = self.begin_refresh();
        let snapshot = self.fetch(field, generation).await;
        if self.commit(snapshot.clone()).await {
            Some(snapshot)
        } else {
            None
        }
    }

    /// Awaits all sources concurrently, each under its own timeout.
    pub async fn fetch(&self, field: &FieldProfile, generation: u64) -> FieldDataSnapshot {
        let s = &self.sources;
        let limit = self.timeout;

        let (weather, rainfall, topography, ndvi, soil_moisture, provider_et0) = tokio::join!(
            settle(DataSource::Weather, s.is_configured(DataSource::Weather), limit, s.weather(field)),
            settle(
                DataSource::Rainfall,
                s.is_configured(DataSource::Rainfall),
                limit,
                s.rainfall(field, self.rainfall_days)
            ),
            settle(
                DataSource::Topography,
                s.is_configured(DataSource::Topography),
                limit,
                s.topography(field)
            ),
            settle(DataSource::Ndvi, s.is_configured(DataSource::Ndvi), limit, s.ndvi(field)),
            settle(
                DataSource::SoilMoisture,
                s.is_configured(DataSource::SoilMoisture),
                limit,
                s.soil_moisture(field)
            ),
            settle(
                DataSource::Evapotranspiration,
                s.is_configured(DataSource::Evapotranspiration),
                limit,
                s.provider_et0(field)
            ),
        );

        let sources = vec![
            weather.1,
            rainfall.1,
            topography.1,
            ndvi.1,
            soil_moisture.1,
            provider_et0.1,
        ];
        let loaded = sources.iter().filter(|r| r.is_loaded()).count();
        tracing::info!(
            "Field {} refresh #{}: {}/{} sources loaded",
            field.id,
            generation,
            loaded,
            sources.len()
        );

        FieldDataSnapshot {
            field_id: field.id.clone(),
            generation,
            fetched_at: Utc::now(),
            weather: weather.0,
            rainfall: rainfall.0,
            topography: topography.0,
            ndvi: ndvi.0,
            soil_moisture: soil_moisture.0,
            provider_et0: provider_et0.0,
            sources,
        }
    }

    /// Stores the snapshot unless a newer refresh has started since it was requested.
    pub async fn commit(&self, snapshot: FieldDataSnapshot) -> bool {
        let mut current = self.current.write().await;
        if !self.is_current(snapshot.generation) {
            tracing::info!(
                "Discarding stale refresh #{} for field {} (latest is #{})",
                snapshot.generation,
                snapshot.field_id,
                self.generation.load(Ordering::SeqCst)
            );
            return false;
        }
        *current = Some(snapshot);
        true
    }
}

async fn settle<T, F>(
    source: DataSource,
    configured: bool,
    limit: Duration,
    fetch: F,
) -> (Option<T>, SourceReport)
where
    F: Future<Output = Result<T>>,
{
    if !configured {
        tracing::debug!("{} not configured, skipping", source);
        return (
            None,
            SourceReport {
                source,
                outcome: SourceOutcome::NotConfigured,
            },
        );
    }

    let (value, outcome) = match tokio::time::timeout(limit, fetch).await {
        Ok(Ok(value)) => {
            tracing::debug!("{} loaded", source);
            (Some(value), SourceOutcome::Loaded)
        }
        Ok(Err(e)) => {
            tracing::warn!("Failed to fetch {}: {}", source, e);
            (None, SourceOutcome::Failed(e.to_string()))
        }
        Err(_) => {
            tracing::warn!("{}", SigirError::Timeout(source.to_string(), limit));
            (None, SourceOutcome::TimedOut)
        }
    };
    (value, SourceReport { source, outcome })
}
