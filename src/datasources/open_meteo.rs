use crate::config::OpenMeteoConfig;
use crate::error::{Result, SigirError};
use crate::models::{ClimateObservation, CurrentConditions, WeatherForecast, WindSpeed};
use chrono::NaiveDate;
use serde::Deserialize;

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,temperature_2m_mean,\
precipitation_sum,precipitation_probability_max,wind_speed_10m_max,relative_humidity_2m_mean,\
shortwave_radiation_sum,et0_fao_evapotranspiration";

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation";

/// Open-Meteo reports wind in km/h at 10 m unless asked otherwise.
const WIND_HEIGHT_M: f64 = 10.0;

pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

// Open-Meteo returns the daily block as parallel arrays
#[derive(Debug, Deserialize)]
struct OmResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    current: Option<OmCurrent>,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
    #[serde(default)]
    precipitation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
    /// MJ/m²
    #[serde(default)]
    shortwave_radiation_sum: Vec<Option<f64>>,
    #[serde(default)]
    et0_fao_evapotranspiration: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&daily={}&current={}&timezone={}&forecast_days={}",
            self.config.url,
            latitude,
            longitude,
            DAILY_VARIABLES,
            CURRENT_VARIABLES,
            self.config.timezone.replace('/', "%2F"),
            self.config.forecast_days
        )
    }

    /// Daily forecast for a location, today first.
    pub async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherForecast> {
        let url = self.forecast_url(latitude, longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SigirError::DataSourceUnavailable(format!("Open-Meteo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SigirError::DataSourceUnavailable(format!(
                "Open-Meteo returned {}: {}",
                status, body
            )));
        }

        let om: OmResponse = response.json().await.map_err(|e| {
            SigirError::DataSourceUnavailable(format!("Failed to parse Open-Meteo response: {}", e))
        })?;

        convert_forecast(om)
    }
}

fn convert_forecast(om: OmResponse) -> Result<WeatherForecast> {
    let d = &om.daily;
    let mut daily = Vec::with_capacity(d.time.len());

    for (i, raw_date) in d.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            SigirError::InvalidData(format!("Open-Meteo date '{}': {}", raw_date, e))
        })?;
        let (Some(tmax), Some(tmin)) = (at(&d.temperature_2m_max, i), at(&d.temperature_2m_min, i))
        else {
            continue;
        };

        let mut obs = ClimateObservation::new(date, tmax, tmin)
            .with_precipitation(at(&d.precipitation_sum, i).unwrap_or(0.0));
        obs.temperature_mean_c = at(&d.temperature_2m_mean, i);
        obs.precipitation_probability_max = at(&d.precipitation_probability_max, i);
        if let Some(rh) = at(&d.relative_humidity_2m_mean, i) {
            obs = obs.with_humidity(rh);
        }
        if let Some(wind) = at(&d.wind_speed_10m_max, i) {
            obs = obs.with_wind(WindSpeed::kilometers_per_hour(wind, WIND_HEIGHT_M));
        }
        if let Some(rs) = at(&d.shortwave_radiation_sum, i) {
            obs = obs.with_solar_radiation(rs);
        }
        if let Some(et0) = at(&d.et0_fao_evapotranspiration, i) {
            obs = obs.with_provider_et0(et0);
        }
        daily.push(obs);
    }

    let current = om.current.map(|c| CurrentConditions {
        temperature_c: c.temperature_2m,
        relative_humidity: c.relative_humidity_2m,
        wind_speed: c
            .wind_speed_10m
            .map(|w| WindSpeed::kilometers_per_hour(w, WIND_HEIGHT_M)),
        precipitation_mm: c.precipitation,
    });

    Ok(WeatherForecast {
        latitude: Some(om.latitude),
        longitude: Some(om.longitude),
        current,
        daily,
    })
}
