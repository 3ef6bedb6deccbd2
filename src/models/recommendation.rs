use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IrrigationAction {
    DoNotIrrigate,
    Monitor,
    IrrigateSoon,
    IrrigateNow,
}

impl IrrigationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationAction::DoNotIrrigate => "DO_NOT_IRRIGATE",
            IrrigationAction::Monitor => "MONITOR",
            IrrigationAction::IrrigateSoon => "IRRIGATE_SOON",
            IrrigationAction::IrrigateNow => "IRRIGATE_NOW",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IrrigationAction::DoNotIrrigate => "NE PAS IRRIGUER",
            IrrigationAction::Monitor => "SURVEILLER",
            IrrigationAction::IrrigateSoon => "IRRIGUER BIENTÔT",
            IrrigationAction::IrrigateNow => "IRRIGUER MAINTENANT",
        }
    }

    /// Days until the field should be looked at again
    pub fn recheck_after_days(&self) -> i64 {
        match self {
            IrrigationAction::IrrigateNow => 1,
            IrrigationAction::IrrigateSoon => 2,
            IrrigationAction::Monitor | IrrigationAction::DoNotIrrigate => 3,
        }
    }

    /// Best-effort mapping of the backend's French action codes
    pub fn from_server_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "NE_PAS_IRRIGUER" | "DO_NOT_IRRIGATE" => Some(IrrigationAction::DoNotIrrigate),
            "SURVEILLER" | "MONITOR" => Some(IrrigationAction::Monitor),
            "IRRIGUER_BIENTÔT" | "IRRIGUER_BIENTOT" | "IRRIGUER_SOUS_24H" | "IRRIGATE_SOON" => {
                Some(IrrigationAction::IrrigateSoon)
            }
            "IRRIGUER_IMMÉDIATEMENT" | "IRRIGUER_IMMEDIATEMENT" | "IRRIGATE_NOW" => {
                Some(IrrigationAction::IrrigateNow)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for IrrigationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub action: IrrigationAction,
    pub reason: String,
    pub next_check_date: DateTime<Utc>,
}
