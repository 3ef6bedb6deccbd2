use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rice growth stages in cycle order. The derived ordering is the stage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrowthStage {
    Semis,
    Levee,
    Tallage,
    InitiationPanicule,
    Floraison,
    Maturation,
    Recolte,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Semis => "Semis",
            GrowthStage::Levee => "Levée",
            GrowthStage::Tallage => "Tallage",
            GrowthStage::InitiationPanicule => "Initiation Panicule",
            GrowthStage::Floraison => "Floraison",
            GrowthStage::Maturation => "Maturation",
            GrowthStage::Recolte => "Récolte",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived growth state, recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenologyState {
    pub stage: GrowthStage,
    pub day_index: u32,
    pub progress_pct: u8,
    pub is_critical: bool,
    pub kc: f64,
    pub cycle_length_days: u32,
    pub days_remaining: u32,
    pub harvest_date: NaiveDate,
}
