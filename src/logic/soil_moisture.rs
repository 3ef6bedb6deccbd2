use serde::{Deserialize, Serialize};

use crate::models::{FieldStatus, SmiBand, SoilMoistureAssessment, SoilMoistureReading};

/// Band edges in SMI percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilMoistureThresholds {
    #[serde(default = "default_critical")]
    pub critical_below: f64,
    #[serde(default = "default_high_deficit")]
    pub high_deficit_below: f64,
    #[serde(default = "default_caution")]
    pub caution_below: f64,
    #[serde(default = "default_saturated")]
    pub saturated_above: f64,
}

fn default_critical() -> f64 {
    15.0
}

fn default_high_deficit() -> f64 {
    30.0
}

fn default_caution() -> f64 {
    40.0
}

fn default_saturated() -> f64 {
    80.0
}

impl Default for SoilMoistureThresholds {
    fn default() -> Self {
        Self {
            critical_below: default_critical(),
            high_deficit_below: default_high_deficit(),
            caution_below: default_caution(),
            saturated_above: default_saturated(),
        }
    }
}

/// Default daily need per band, mm/day
pub fn band_daily_need(band: SmiBand) -> f64 {
    match band {
        SmiBand::Critical => 8.0,
        SmiBand::HighDeficit => 6.0,
        SmiBand::Caution | SmiBand::Optimal => 5.0,
        SmiBand::Saturated => 0.0,
    }
}

pub struct SoilMoistureInterpreter {
    thresholds: SoilMoistureThresholds,
}

impl SoilMoistureInterpreter {
    pub fn new(thresholds: SoilMoistureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, smi_percent: f64) -> SmiBand {
        let t = &self.thresholds;
        if smi_percent < t.critical_below {
            SmiBand::Critical
        } else if smi_percent < t.high_deficit_below {
            SmiBand::HighDeficit
        } else if smi_percent < t.caution_below {
            SmiBand::Caution
        } else if smi_percent > t.saturated_above {
            SmiBand::Saturated
        } else {
            SmiBand::Optimal
        }
    }

    pub fn interpret(&self, reading: &SoilMoistureReading) -> SoilMoistureAssessment {
        let smi = reading.smi_percent();
        let band = self.classify(smi);
        let need = band_daily_need(band);

        let (status, status_text, estimated_deficit_mm) = match band {
            SmiBand::Critical => (
                FieldStatus::Critical,
                "CRITIQUE - IRRIGATION URGENTE",
                ((50.0 - smi) * 0.8).round(),
            ),
            SmiBand::HighDeficit => (
                FieldStatus::Warning,
                "ATTENTION - SOL SEC",
                ((45.0 - smi) * 0.7).round(),
            ),
            SmiBand::Caution => (
                FieldStatus::Caution,
                "SURVEILLANCE NÉCESSAIRE",
                ((45.0 - smi) * 0.5).round(),
            ),
            SmiBand::Optimal => (FieldStatus::Healthy, "SITUATION OPTIMALE", 0.0),
            SmiBand::Saturated => (FieldStatus::Warning, "ATTENTION - SOL SATURÉ", 0.0),
        };

        SoilMoistureAssessment {
            band,
            smi_percent: smi,
            default_daily_need_mm: need,
            needs_irrigation: matches!(band, SmiBand::Critical | SmiBand::HighDeficit),
            flood_risk: band == SmiBand::Saturated,
            estimated_deficit_mm: estimated_deficit_mm.max(0.0),
            status,
            status_text: status_text.to_string(),
            confidence: reading.confidence.clamp(0.0, 1.0),
        }
    }

    /// Advice line for the band, in the farmer's language.
    pub fn advice(assessment: &SoilMoistureAssessment) -> String {
        let smi = assessment.smi_percent.round();
        let need = assessment.default_daily_need_mm;
        match assessment.band {
            SmiBand::Critical => format!(
                "SOL TRÈS SEC ({:.0}%). Irriguer immédiatement {:.0}mm/jour",
                smi, need
            ),
            SmiBand::HighDeficit => format!(
                "SMI bas ({:.0}%). Planifier irrigation de {:.0}mm/jour",
                smi, need
            ),
            SmiBand::Caution => {
                format!("SMI acceptable ({:.0}%). Surveiller l'évolution", smi)
            }
            SmiBand::Optimal => format!("SMI optimal ({:.0}%). Maintenir le suivi", smi),
            SmiBand::Saturated => format!(
                "SMI élevé ({:.0}%). Risque d'engorgement - Améliorer drainage",
                smi
            ),
        }
    }
}

impl Default for SoilMoistureInterpreter {
    fn default() -> Self {
        Self::new(SoilMoistureThresholds::default())
    }
}
