use serde::{Deserialize, Serialize};

/// Flood risk descriptor computed by the remote-sensing backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodRisk {
    pub risk_level: String,
    pub risk_score: f64,
    pub warnings: Vec<String>,
    pub days_until_saturation: Option<u32>,
}

/// Recommendation computed server-side alongside the SMI. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecommendation {
    pub action: String,
    pub priority: String,
    pub volume_mm: f64,
    pub reason: String,
    pub next_check_hours: Option<u32>,
}

/// Remotely-sensed soil moisture. A noisy signal, not ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilMoistureReading {
    /// Soil moisture index, fractional 0..1
    pub smi: f64,
    /// 0..1
    pub confidence: f64,
    pub swdi: Option<f64>,
    pub flood_risk: Option<FloodRisk>,
    pub server_recommendation: Option<ServerRecommendation>,
}

impl SoilMoistureReading {
    pub fn new(smi: f64) -> Self {
        Self {
            smi,
            confidence: 1.0,
            swdi: None,
            flood_risk: None,
            server_recommendation: None,
        }
    }

    pub fn smi_percent(&self) -> f64 {
        self.smi.clamp(0.0, 1.0) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmiBand {
    Critical,
    HighDeficit,
    Caution,
    Optimal,
    Saturated,
}

impl SmiBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmiBand::Critical => "critical",
            SmiBand::HighDeficit => "high-deficit",
            SmiBand::Caution => "caution",
            SmiBand::Optimal => "optimal",
            SmiBand::Saturated => "saturated",
        }
    }
}

impl std::fmt::Display for SmiBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Healthy,
    Caution,
    Warning,
    Critical,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Healthy => "healthy",
            FieldStatus::Caution => "caution",
            FieldStatus::Warning => "warning",
            FieldStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilMoistureAssessment {
    pub band: SmiBand,
    pub smi_percent: f64,
    pub default_daily_need_mm: f64,
    pub needs_irrigation: bool,
    pub flood_risk: bool,
    pub estimated_deficit_mm: f64,
    pub status: FieldStatus,
    pub status_text: String,
    pub confidence: f64,
}
