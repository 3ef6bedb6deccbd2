use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{IrrigationAction, RecommendationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    /// SMI % below which irrigation is urgent whatever the forecast
    #[serde(default = "default_critical_smi")]
    pub critical_smi: f64,
    #[serde(default = "default_low_smi")]
    pub low_smi: f64,
    /// 3-day rain below which a low SMI will not be relieved, mm
    #[serde(default = "default_dry_forecast")]
    pub dry_forecast_mm: f64,
    /// 3-day rain above which irrigation is postponed, mm
    #[serde(default = "default_wet_forecast")]
    pub wet_forecast_mm: f64,
}

fn default_critical_smi() -> f64 {
    15.0
}

fn default_low_smi() -> f64 {
    35.0
}

fn default_dry_forecast() -> f64 {
    10.0
}

fn default_wet_forecast() -> f64 {
    20.0
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            critical_smi: default_critical_smi(),
            low_smi: default_low_smi(),
            dry_forecast_mm: default_dry_forecast(),
            wet_forecast_mm: default_wet_forecast(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationInputs {
    /// Absent when no soil moisture reading resolved
    pub smi_percent: Option<f64>,
    /// Absent when no forecast resolved
    pub rain_forecast_3d_mm: Option<f64>,
    pub cumulative_deficit_mm: Option<f64>,
    pub is_critical_stage: bool,
}

pub struct RecommendationEngine {
    thresholds: RecommendationThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendationThresholds) -> Self {
        Self { thresholds }
    }

    /// First matching row wins; the SMI emergency row outranks any forecast.
    pub fn decide(&self, inputs: &RecommendationInputs) -> IrrigationAction {
        let t = &self.thresholds;
        let rain = inputs.rain_forecast_3d_mm;

        match (inputs.smi_percent, rain) {
            (Some(smi), _) if smi < t.critical_smi => IrrigationAction::IrrigateNow,
            (Some(smi), Some(rain)) if smi < t.low_smi && rain < t.dry_forecast_mm => {
                IrrigationAction::IrrigateSoon
            }
            (_, Some(rain)) if rain > t.wet_forecast_mm => IrrigationAction::DoNotIrrigate,
            _ => IrrigationAction::Monitor,
        }
    }

    /// Pure: the same inputs and `now` always give the same result.
    pub fn recommend(&self, inputs: &RecommendationInputs, now: DateTime<Utc>) -> RecommendationResult {
        let action = self.decide(inputs);

        RecommendationResult {
            action,
            reason: reason_text(action, inputs),
            next_check_date: now + Duration::days(action.recheck_after_days()),
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(RecommendationThresholds::default())
    }
}

fn reason_text(action: IrrigationAction, inputs: &RecommendationInputs) -> String {
    let smi = match inputs.smi_percent {
        Some(smi) => format!("{:.0}%", smi),
        None => "indisponible".to_string(),
    };
    let rain = inputs.rain_forecast_3d_mm.unwrap_or(0.0).round();

    let mut reason = match action {
        IrrigationAction::IrrigateNow => {
            format!("Situation critique, SMI bas ({}). Irrigation urgente requise.", smi)
        }
        IrrigationAction::IrrigateSoon => format!(
            "Sol en déficit (SMI {}), peu de pluie prévue ({:.0}mm sur 3j). Planifier irrigation dans 24-48h.",
            smi, rain
        ),
        IrrigationAction::DoNotIrrigate => format!(
            "Pluie prévue ({:.0}mm sur 3j). SMI {}. Attendre.",
            rain, smi
        ),
        IrrigationAction::Monitor => {
            format!("Situation acceptable. SMI {}. Surveiller l'évolution.", smi)
        }
    };

    if let Some(deficit) = inputs.cumulative_deficit_mm {
        reason.push_str(&format!(" Déficit cumulé {:.0}mm.", deficit));
    }
    if inputs.is_critical_stage {
        reason.push_str(" Stade critique.");
    }
    reason
}
