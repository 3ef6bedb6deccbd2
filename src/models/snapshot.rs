use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ProviderEt0, RainfallObservation, SoilMoistureReading, WeatherForecast};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    Weather,
    Rainfall,
    Topography,
    Ndvi,
    SoilMoisture,
    Evapotranspiration,
}

impl DataSource {
    #[cfg(test)]
    pub const ALL: [DataSource; 6] = [
        DataSource::Weather,
        DataSource::Rainfall,
        DataSource::Topography,
        DataSource::Ndvi,
        DataSource::SoilMoisture,
        DataSource::Evapotranspiration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Weather => "Weather forecast",
            DataSource::Rainfall => "Rainfall history",
            DataSource::Topography => "Topography",
            DataSource::Ndvi => "NDVI",
            DataSource::SoilMoisture => "Soil moisture (SMI)",
            DataSource::Evapotranspiration => "ETP",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "kebab-case")]
pub enum SourceOutcome {
    Loaded,
    Failed(String),
    TimedOut,
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: DataSource,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    pub fn is_loaded(&self) -> bool {
        self.outcome == SourceOutcome::Loaded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topography {
    pub elevation_m: f64,
    pub slope_deg: Option<f64>,
    pub drainage_class: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdviObservation {
    pub date: NaiveDate,
    pub ndvi_mean: f64,
}

/// Whatever subset of the external sources resolved for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDataSnapshot {
    pub field_id: String,
    pub generation: u64,
    pub fetched_at: DateTime<Utc>,
    pub weather: Option<WeatherForecast>,
    pub rainfall: Option<Vec<RainfallObservation>>,
    pub topography: Option<Topography>,
    pub ndvi: Option<Vec<NdviObservation>>,
    pub soil_moisture: Option<SoilMoistureReading>,
    pub provider_et0: Option<Vec<ProviderEt0>>,
    pub sources: Vec<SourceReport>,
}

impl FieldDataSnapshot {
    pub fn empty(field_id: impl Into<String>, generation: u64) -> Self {
        Self {
            field_id: field_id.into(),
            generation,
            fetched_at: Utc::now(),
            weather: None,
            rainfall: None,
            topography: None,
            ndvi: None,
            soil_moisture: None,
            provider_et0: None,
            sources: Vec::new(),
        }
    }

    pub fn failed_sources(&self) -> Vec<&SourceReport> {
        self.sources.iter().filter(|s| !s.is_loaded()).collect()
    }

    pub fn latest_ndvi(&self) -> Option<f64> {
        self.ndvi
            .as_ref()
            .and_then(|series| series.iter().max_by_key(|n| n.date))
            .map(|n| n.ndvi_mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_sources_excludes_loaded() {
        let mut snapshot = FieldDataSnapshot::empty("f1", 1);
        snapshot.sources = vec![
            SourceReport {
                source: DataSource::Weather,
                outcome: SourceOutcome::Loaded,
            },
            SourceReport {
                source: DataSource::SoilMoisture,
                outcome: SourceOutcome::TimedOut,
            },
        ];
        let failed = snapshot.failed_sources();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source, DataSource::SoilMoisture);
    }

    #[test]
    fn latest_ndvi_picks_most_recent_date() {
        let mut snapshot = FieldDataSnapshot::empty("f1", 1);
        let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        snapshot.ndvi = Some(vec![
            NdviObservation { date: d(10), ndvi_mean: 0.61 },
            NdviObservation { date: d(1), ndvi_mean: 0.40 },
        ]);
        assert_eq!(snapshot.latest_ndvi(), Some(0.61));
    }
}
