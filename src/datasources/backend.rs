use crate::config::BackendConfig;
use crate::error::{Result, SigirError};
use crate::models::{
    filter_missing_rainfall, ClimateObservation, CurrentConditions, FloodRisk, NdviObservation,
    ProviderEt0, RainfallObservation, ServerRecommendation, SoilMoistureReading, Topography,
    WeatherForecast, WindSpeed,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Height of the wind sensor behind the backend's weather feed, m
const WIND_HEIGHT_M: f64 = 10.0;

/// Client for the SIGIR field-data backend.
pub struct BackendClient {
    client: reqwest::Client,
    config: BackendConfig,
}

// Backend response structures. Field names follow both the backend routes and
// the raw Open-Meteo keys it sometimes passes through.
#[derive(Debug, Deserialize)]
struct WeatherResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    current: Option<CurrentResponse>,
    #[serde(default)]
    daily: Vec<WeatherDay>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(alias = "temperature_2m", default)]
    temperature: Option<f64>,
    #[serde(alias = "relative_humidity_2m", default)]
    humidity: Option<f64>,
    #[serde(alias = "wind_speed_10m", default)]
    wind_speed: Option<f64>,
    #[serde(default)]
    precipitation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WeatherDay {
    date: String,
    temperature_max: Option<f64>,
    temperature_min: Option<f64>,
    #[serde(default)]
    temperature_mean: Option<f64>,
    #[serde(default)]
    precipitation_sum: Option<f64>,
    #[serde(default)]
    precipitation_probability_max: Option<f64>,
    #[serde(default)]
    wind_speed_max: Option<f64>,
    #[serde(default)]
    relative_humidity_mean: Option<f64>,
    #[serde(default)]
    et0_fao_evapotranspiration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainfallPoint {
    date: String,
    precipitation: f64,
}

#[derive(Debug, Deserialize)]
struct TopographyResponse {
    elevation: f64,
    #[serde(default)]
    slope: Option<f64>,
    #[serde(rename = "drainageClass", default)]
    drainage_class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NdviPoint {
    date: String,
    ndvi_mean: f64,
}

#[derive(Debug, Deserialize)]
struct SmiResponse {
    smi: f64,
    #[serde(default)]
    swdi: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    flood_risk: Option<FloodRiskResponse>,
    #[serde(default)]
    recommendation: Option<SmiRecommendationResponse>,
}

#[derive(Debug, Deserialize)]
struct FloodRiskResponse {
    risk_level: String,
    #[serde(default)]
    risk_score: f64,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    days_until_saturation: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SmiRecommendationResponse {
    action: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    volume_mm: f64,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    next_check_hours: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EtpResponse {
    #[serde(alias = "data", default)]
    daily: Vec<EtpDay>,
}

#[derive(Debug, Deserialize)]
struct EtpDay {
    date: String,
    et0: f64,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let mut request = self.client.get(&url);
        if !self.config.token.is_empty() {
            request = request.bearer_auth(&self.config.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SigirError::DataSourceUnavailable(format!("SIGIR backend: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SigirError::DataSourceUnavailable(format!(
                "SIGIR backend returned {} for {}: {}",
                status, path, body
            )));
        }

        response.json().await.map_err(|e| {
            SigirError::DataSourceUnavailable(format!(
                "Failed to parse backend response for {}: {}",
                path, e
            ))
        })
    }

    pub async fn fetch_weather(&self, field_id: &str) -> Result<WeatherForecast> {
        let response: WeatherResponse = self
            .get_json(&format!("/api/weather/weather/{}", field_id))
            .await?;
        convert_weather(response)
    }

    pub async fn fetch_rainfall(&self, field_id: &str, days: u32) -> Result<Vec<RainfallObservation>> {
        let points: Vec<RainfallPoint> = self
            .get_json(&format!("/api/weather/rainfall/{}?days={}", field_id, days))
            .await?;
        convert_rainfall(points)
    }

    pub async fn fetch_topography(&self, field_id: &str) -> Result<Topography> {
        let response: TopographyResponse = self
            .get_json(&format!("/api/weather/topography/{}", field_id))
            .await?;
        Ok(convert_topography(response))
    }

    pub async fn fetch_ndvi(&self, field_id: &str) -> Result<Vec<NdviObservation>> {
        let points: Vec<NdviPoint> = self
            .get_json(&format!("/api/weather/ndvi/{}", field_id))
            .await?;
        convert_ndvi(points)
    }

    pub async fn fetch_soil_moisture(&self, field_id: &str) -> Result<SoilMoistureReading> {
        let response: SmiResponse = self
            .get_json(&format!("/api/weather/smi/{}", field_id))
            .await?;
        Ok(convert_smi(response))
    }

    pub async fn fetch_provider_et0(&self, field_id: &str) -> Result<Vec<ProviderEt0>> {
        let response: EtpResponse = self.get_json(&format!("/api/etp/{}", field_id)).await?;
        convert_etp(response)
    }

    /// Hits the backend health route.
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| SigirError::DataSourceUnavailable(format!("SIGIR backend: {}", e)))?;
        Ok(response.status().is_success())
    }
}

/// Accepts `2025-08-10`, `2025-08-10T00:00:00` and `20250810`.
pub(crate) fn parse_day(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let parsed = if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        NaiveDate::parse_from_str(raw, "%Y%m%d")
    } else {
        NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d")
    };
    parsed.map_err(|e| SigirError::InvalidData(format!("bad date '{}': {}", raw, e)))
}

fn convert_weather(response: WeatherResponse) -> Result<WeatherForecast> {
    let mut daily = Vec::with_capacity(response.daily.len());
    for day in response.daily {
        let date = parse_day(&day.date)?;
        let (Some(tmax), Some(tmin)) = (day.temperature_max, day.temperature_min) else {
            tracing::debug!("Skipping forecast day {} without temperature range", date);
            continue;
        };

        let mut obs = ClimateObservation::new(date, tmax, tmin)
            .with_precipitation(day.precipitation_sum.unwrap_or(0.0));
        obs.temperature_mean_c = day.temperature_mean;
        obs.precipitation_probability_max = day.precipitation_probability_max;
        if let Some(rh) = day.relative_humidity_mean {
            obs = obs.with_humidity(rh);
        }
        if let Some(wind) = day.wind_speed_max {
            obs = obs.with_wind(WindSpeed::kilometers_per_hour(wind, WIND_HEIGHT_M));
        }
        if let Some(et0) = day.et0_fao_evapotranspiration {
            obs = obs.with_provider_et0(et0);
        }
        daily.push(obs);
    }
    daily.sort_by_key(|d| d.date);

    let current = response.current.map(|c| CurrentConditions {
        temperature_c: c.temperature,
        relative_humidity: c.humidity,
        wind_speed: c
            .wind_speed
            .map(|w| WindSpeed::kilometers_per_hour(w, WIND_HEIGHT_M)),
        precipitation_mm: c.precipitation,
    });

    Ok(WeatherForecast {
        latitude: response.latitude,
        longitude: response.longitude,
        current,
        daily,
    })
}

fn convert_rainfall(points: Vec<RainfallPoint>) -> Result<Vec<RainfallObservation>> {
    let mut series = points
        .into_iter()
        .map(|p| {
            Ok(RainfallObservation {
                date: parse_day(&p.date)?,
                precipitation_mm: p.precipitation,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    series.sort_by_key(|r| r.date);
    Ok(filter_missing_rainfall(series))
}

fn convert_topography(response: TopographyResponse) -> Topography {
    Topography {
        elevation_m: response.elevation,
        slope_deg: response.slope,
        drainage_class: response.drainage_class,
    }
}

fn convert_ndvi(points: Vec<NdviPoint>) -> Result<Vec<NdviObservation>> {
    points
        .into_iter()
        .map(|p| {
            Ok(NdviObservation {
                date: parse_day(&p.date)?,
                ndvi_mean: p.ndvi_mean,
            })
        })
        .collect()
}

fn convert_smi(response: SmiResponse) -> SoilMoistureReading {
    let mut reading = SoilMoistureReading::new(response.smi);
    reading.confidence = response.confidence.unwrap_or(1.0).clamp(0.0, 1.0);
    reading.swdi = response.swdi;
    reading.flood_risk = response.flood_risk.map(|f| FloodRisk {
        risk_level: f.risk_level,
        risk_score: f.risk_score,
        warnings: f.warnings,
        days_until_saturation: f.days_until_saturation,
    });
    reading.server_recommendation = response.recommendation.map(|r| ServerRecommendation {
        action: r.action,
        priority: r.priority,
        volume_mm: r.volume_mm,
        reason: r.reason,
        next_check_hours: r.next_check_hours,
    });
    reading
}

fn convert_etp(response: EtpResponse) -> Result<Vec<ProviderEt0>> {
    let mut series = response
        .daily
        .into_iter()
        .map(|d| {
            Ok(ProviderEt0 {
                date: parse_day(&d.date)?,
                et0: d.et0.max(0.0),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    series.sort_by_key(|e| e.date);
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindUnit;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_backend_date_formats() {
        assert_eq!(parse_day("2025-08-10").unwrap(), date(2025, 8, 10));
        assert_eq!(parse_day("2025-08-10T00:00:00").unwrap(), date(2025, 8, 10));
        assert_eq!(parse_day("20250810").unwrap(), date(2025, 8, 10));
        assert!(parse_day("10/08/2025").is_err());
    }

    #[test]
    fn decodes_weather_with_backend_current_keys() {
        let json = r#"{
            "latitude": 5.35, "longitude": -4.02, "timezone": "Africa/Abidjan",
            "current": {"temperature": 29.5, "humidity": 78, "wind_speed": 11.2, "precipitation": 0.0},
            "daily": [
                {"date": "2025-08-11", "temperature_max": 31.0, "temperature_min": 23.0,
                 "temperature_mean": 27.0, "precipitation_sum": 12.4, "precipitation_probability_max": 80,
                 "wind_speed_max": 14.4, "relative_humidity_mean": 82, "et0_fao_evapotranspiration": 3.9},
                {"date": "2025-08-10", "temperature_max": 32.0, "temperature_min": 24.0,
                 "temperature_mean": null, "precipitation_sum": null, "precipitation_probability_max": null,
                 "wind_speed_max": null, "relative_humidity_mean": null, "et0_fao_evapotranspiration": null}
            ]
        }"#;
        let response: WeatherResponse = serde_json::from_str(json).unwrap();
        let forecast = convert_weather(response).unwrap();

        assert_eq!(forecast.daily.len(), 2);
        assert_eq!(forecast.daily[0].date, date(2025, 8, 10));
        assert_eq!(forecast.daily[0].precipitation_sum_mm, 0.0);
        assert!(forecast.daily[0].wind_speed.is_none());

        let wet = &forecast.daily[1];
        assert_eq!(wet.precipitation_sum_mm, 12.4);
        assert_eq!(wet.et0_provider, Some(3.9));
        let wind = wet.wind_speed.unwrap();
        assert_eq!(wind.unit, WindUnit::KilometersPerHour);
        assert_eq!(wind.height_m, 10.0);

        let current = forecast.current.unwrap();
        assert_eq!(current.temperature_c, Some(29.5));
        assert_eq!(current.relative_humidity, Some(78.0));
    }

    #[test]
    fn decodes_weather_with_open_meteo_current_keys() {
        let json = r#"{
            "current": {"temperature_2m": 30.1, "relative_humidity_2m": 70, "wind_speed_10m": 9.0, "precipitation": 1.2},
            "daily": []
        }"#;
        let response: WeatherResponse = serde_json::from_str(json).unwrap();
        let forecast = convert_weather(response).unwrap();
        let current = forecast.current.unwrap();
        assert_eq!(current.temperature_c, Some(30.1));
        assert_eq!(current.precipitation_mm, Some(1.2));
        assert!(forecast.daily.is_empty());
    }

    #[test]
    fn forecast_day_without_temperatures_is_skipped() {
        let json = r#"{"daily": [
            {"date": "2025-08-10", "temperature_max": null, "temperature_min": 22.0},
            {"date": "2025-08-11", "temperature_max": 33.0, "temperature_min": 22.0}
        ]}"#;
        let forecast = convert_weather(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(forecast.daily.len(), 1);
        assert_eq!(forecast.daily[0].date, date(2025, 8, 11));
    }

    #[test]
    fn rainfall_drops_missing_markers_and_sorts() {
        let json = r#"[
            {"date": "2025-08-09", "precipitation": 4.5},
            {"date": "2025-08-08", "precipitation": -999.0},
            {"date": "2025-08-07", "precipitation": 0.0}
        ]"#;
        let points: Vec<RainfallPoint> = serde_json::from_str(json).unwrap();
        let series = convert_rainfall(points).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date(2025, 8, 7));
        assert_eq!(series[1].precipitation_mm, 4.5);
    }

    #[test]
    fn decodes_smi_with_server_recommendation() {
        let json = r#"{
            "smi": 0.22, "smi_class": "Sec", "swdi": -3.1, "swdi_class": "Déficit",
            "components": {}, "confidence": 0.7,
            "flood_risk": {"risk_level": "low", "risk_score": 0.1, "warnings": [], "days_until_saturation": null},
            "recommendation": {"action": "irrigate_soon", "priority": "high", "volume_mm": 25,
                "reason": "Sol sec", "details": [], "next_actions": [], "next_check_hours": 24, "confidence": 0.7},
            "field_info": {}, "timestamp": "2025-08-10T06:00:00"
        }"#;
        let reading = convert_smi(serde_json::from_str(json).unwrap());
        assert_eq!(reading.smi, 0.22);
        assert_eq!(reading.confidence, 0.7);
        assert_eq!(reading.swdi, Some(-3.1));
        assert_eq!(reading.flood_risk.unwrap().risk_level, "low");
        let server = reading.server_recommendation.unwrap();
        assert_eq!(server.action, "irrigate_soon");
        assert_eq!(server.volume_mm, 25.0);
        assert_eq!(server.next_check_hours, Some(24));
    }

    #[test]
    fn smi_without_extras_defaults_to_full_confidence() {
        let reading = convert_smi(serde_json::from_str(r#"{"smi": 0.5}"#).unwrap());
        assert_eq!(reading.confidence, 1.0);
        assert!(reading.server_recommendation.is_none());
    }

    #[test]
    fn etp_accepts_daily_or_data_lists() {
        let frontend = r#"{"daily": [{"date": "2025-08-10", "et0": 4.2, "temperature_mean": 27}], "average_et0": 4.2}"#;
        let backend = r#"{"field_id": "12", "data": [
            {"date": "2025-08-11T00:00:00", "et0": 4.0, "kc": 1.2, "etc": 4.8, "recommended_irrigation": 6.4},
            {"date": "2025-08-10T00:00:00", "et0": -0.2, "kc": 1.2, "etc": 0.0, "recommended_irrigation": 0.0}
        ]}"#;

        let first = convert_etp(serde_json::from_str(frontend).unwrap()).unwrap();
        assert_eq!(first, vec![ProviderEt0 { date: date(2025, 8, 10), et0: 4.2 }]);

        let second = convert_etp(serde_json::from_str(backend).unwrap()).unwrap();
        assert_eq!(second[0].date, date(2025, 8, 10));
        assert_eq!(second[0].et0, 0.0);
        assert_eq!(second[1].et0, 4.0);
    }

    #[test]
    fn topography_keeps_drainage_class() {
        let json = r#"{"elevation": 12.5, "slope": 0.8, "aspect": 180, "drainageClass": "Mauvais", "floodRisk": "Élevé"}"#;
        let topo = convert_topography(serde_json::from_str(json).unwrap());
        assert_eq!(topo.elevation_m, 12.5);
        assert_eq!(topo.drainage_class.as_deref(), Some("Mauvais"));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = BackendClient::new(BackendConfig {
            url: "http://localhost:8000/".into(),
            token: String::new(),
            field_id: None,
        });
        assert_eq!(
            client.url("/api/weather/smi/12"),
            "http://localhost:8000/api/weather/smi/12"
        );
    }
}
