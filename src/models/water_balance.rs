use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldStatus, IrrigationAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Et0Method {
    PenmanMonteith,
    Hargreaves,
    /// Precomputed by the upstream weather provider
    Provider,
}

impl Et0Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Et0Method::PenmanMonteith => "Penman-Monteith FAO-56",
            Et0Method::Hargreaves => "Hargreaves",
            Et0Method::Provider => "Provider",
        }
    }
}

impl std::fmt::Display for Et0Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference and crop evapotranspiration for one day, mm/day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Et0Estimate {
    pub date: NaiveDate,
    pub et0: f64,
    pub method: Et0Method,
    /// Absent when the growth stage is unknown
    pub kc: Option<f64>,
    pub etc: Option<f64>,
}

/// Water budget terms for a single day, mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBalance {
    pub effective_rainfall_mm: f64,
    pub daily_net_need_mm: f64,
    /// Rain left over after ETc and infiltration are covered
    pub surplus_mm: f64,
    pub recommended_volume_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBalanceState {
    pub daily_net_need_mm: f64,
    pub effective_rainfall_mm: f64,
    pub cumulative_deficit_mm: f64,
    pub recommended_volume_mm: f64,
    /// Start of the accounting window: last irrigation or planting
    pub accounting_since: Option<NaiveDate>,
}

/// Which signal produced the daily need figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NeedSource {
    WaterBalance,
    SoilMoistureBand,
    StaticDefault,
}

impl NeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedSource::WaterBalance => "ET0 water balance",
            NeedSource::SoilMoistureBand => "SMI band",
            NeedSource::StaticDefault => "static default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationStatus {
    pub needs_irrigation: bool,
    pub daily_need_mm: f64,
    /// Over the next 7 days
    pub total_need_mm: f64,
    pub status: FieldStatus,
    pub status_text: String,
    pub recommendation: String,
    pub need_source: NeedSource,
}

/// Water balance view consumed by presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBalanceData {
    pub et0: f64,
    pub kc: f64,
    pub etc: f64,
    pub effective_rain_7d: f64,
    pub cumulative_deficit: f64,
    pub irrigation_recommendation: IrrigationAction,
    pub next_check_date: DateTime<Utc>,
    /// SMI in percent, when a reading was available
    pub soil_moisture: Option<f64>,
}
