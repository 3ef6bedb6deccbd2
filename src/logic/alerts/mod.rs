pub mod crop_stage;
pub mod engine;
pub mod heat;
pub mod rain;
pub mod soil_water;

pub use engine::AlertGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Alert, PhenologyState, SoilMoistureReading, WeatherForecast};

/// Forecast window the weather rules look at, days
pub const FORECAST_WINDOW_DAYS: usize = 3;

/// Cut-offs for every alert rule. SMI values are percentages, rain in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub severe_deficit_smi: f64,
    pub deficit_smi: f64,
    pub saturation_smi: f64,
    pub heat_c: f64,
    /// Below this SMI, heat turns into compound heat and water stress
    pub heat_stress_smi: f64,
    pub drought_rain_mm: f64,
    pub drought_temp_c: f64,
    pub flood_daily_mm: f64,
    pub heavy_daily_mm: f64,
    pub heavy_total_mm: f64,
    pub beneficial_total_mm: f64,
    pub beneficial_max_smi: f64,
    pub harvest_notice_days: u32,
}

impl AlertThresholds {
    pub const STANDARD: Self = Self {
        severe_deficit_smi: 20.0,
        deficit_smi: 35.0,
        saturation_smi: 85.0,
        heat_c: 35.0,
        heat_stress_smi: 40.0,
        drought_rain_mm: 5.0,
        drought_temp_c: 32.0,
        flood_daily_mm: 80.0,
        heavy_daily_mm: 50.0,
        heavy_total_mm: 100.0,
        beneficial_total_mm: 30.0,
        beneficial_max_smi: 35.0,
        harvest_notice_days: 7,
    };
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Everything an alert rule may look at. Rules never mutate it.
#[derive(Debug, Clone, Copy)]
pub struct AlertContext<'a> {
    pub phenology: Option<&'a PhenologyState>,
    pub soil_moisture: Option<&'a SoilMoistureReading>,
    pub weather: Option<&'a WeatherForecast>,
    pub thresholds: &'a AlertThresholds,
    pub now: DateTime<Utc>,
}

impl<'a> AlertContext<'a> {
    pub fn smi_percent(&self) -> Option<f64> {
        self.soil_moisture.map(|r| r.smi_percent())
    }
}

/// Trait for field alert rules
pub trait AlertRule: Send + Sync {
    /// Stable identifier. Every alert the rule raises carries it.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Zero or one alert for the given inputs
    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_thresholds_keep_standard_values() {
        let t: AlertThresholds = serde_yaml::from_str("deficit_smi: 25\nheat_c: 38\n").unwrap();
        assert_eq!(t.deficit_smi, 25.0);
        assert_eq!(t.heat_c, 38.0);
        assert_eq!(t.severe_deficit_smi, 20.0);
        assert_eq!(t.harvest_notice_days, 7);
    }
}
