pub mod backend;
pub mod open_meteo;

pub use backend::BackendClient;
pub use open_meteo::OpenMeteoClient;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Result, SigirError};
use crate::models::{
    DataSource, FieldProfile, NdviObservation, ProviderEt0, RainfallObservation,
    SoilMoistureReading, Topography, WeatherForecast,
};

/// The six per-field feeds the sync service fans out to.
#[async_trait]
pub trait FieldDataSource: Send + Sync {
    /// Sources reported as not configured are skipped without a request.
    fn is_configured(&self, _source: DataSource) -> bool {
        true
    }

    async fn weather(&self, field: &FieldProfile) -> Result<WeatherForecast>;
    async fn rainfall(&self, field: &FieldProfile, days: u32) -> Result<Vec<RainfallObservation>>;
    async fn topography(&self, field: &FieldProfile) -> Result<Topography>;
    async fn ndvi(&self, field: &FieldProfile) -> Result<Vec<NdviObservation>>;
    async fn soil_moisture(&self, field: &FieldProfile) -> Result<SoilMoistureReading>;
    async fn provider_et0(&self, field: &FieldProfile) -> Result<Vec<ProviderEt0>>;
}

/// Backend feeds, with the weather forecast taken straight from Open-Meteo
/// when it is configured and the field has coordinates.
pub struct HttpFieldSources {
    backend: BackendClient,
    open_meteo: Option<OpenMeteoClient>,
    backend_field_id: Option<String>,
}

impl HttpFieldSources {
    pub fn new(backend: BackendClient, open_meteo: Option<OpenMeteoClient>) -> Self {
        Self {
            backend,
            open_meteo,
            backend_field_id: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let open_meteo = config
            .open_meteo
            .clone()
            .map(OpenMeteoClient::new)
            .filter(|c| c.is_enabled());
        Self {
            backend: BackendClient::new(config.backend.clone()),
            open_meteo,
            backend_field_id: config.backend.field_id.clone(),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    fn remote_id<'a>(&'a self, field: &'a FieldProfile) -> &'a str {
        self.backend_field_id.as_deref().unwrap_or(&field.id)
    }
}

#[async_trait]
impl FieldDataSource for HttpFieldSources {
    async fn weather(&self, field: &FieldProfile) -> Result<WeatherForecast> {
        match (&self.open_meteo, field.coordinates()) {
            (Some(client), Some((lat, lon))) => client.fetch_forecast(lat, lon).await,
            (Some(_), None) => {
                tracing::debug!(
                    "Field {} has no coordinates, using backend weather instead of Open-Meteo",
                    field.id
                );
                self.backend.fetch_weather(self.remote_id(field)).await
            }
            (None, _) => self.backend.fetch_weather(self.remote_id(field)).await,
        }
    }

    async fn rainfall(&self, field: &FieldProfile, days: u32) -> Result<Vec<RainfallObservation>> {
        if days == 0 {
            return Err(SigirError::InvalidData(
                "rainfall history needs at least one day".into(),
            ));
        }
        self.backend.fetch_rainfall(self.remote_id(field), days).await
    }

    async fn topography(&self, field: &FieldProfile) -> Result<Topography> {
        self.backend.fetch_topography(self.remote_id(field)).await
    }

    async fn ndvi(&self, field: &FieldProfile) -> Result<Vec<NdviObservation>> {
        self.backend.fetch_ndvi(self.remote_id(field)).await
    }

    async fn soil_moisture(&self, field: &FieldProfile) -> Result<SoilMoistureReading> {
        self.backend.fetch_soil_moisture(self.remote_id(field)).await
    }

    async fn provider_et0(&self, field: &FieldProfile) -> Result<Vec<ProviderEt0>> {
        self.backend.fetch_provider_et0(self.remote_id(field)).await
    }
}
