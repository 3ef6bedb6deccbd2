use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrigationSource {
    Manual,
    Rain,
    Auto,
}

impl IrrigationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationSource::Manual => "manual",
            IrrigationSource::Rain => "rain",
            IrrigationSource::Auto => "auto",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" | "manuel" => Some(IrrigationSource::Manual),
            "rain" | "pluie" => Some(IrrigationSource::Rain),
            "auto" => Some(IrrigationSource::Auto),
            _ => None,
        }
    }
}

impl std::fmt::Display for IrrigationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded water application that offsets the running deficit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationEvent {
    pub id: Option<i64>,
    pub field_id: String,
    pub event_date: NaiveDate,
    /// Net depth applied to the field
    pub amount_mm: f64,
    pub source: IrrigationSource,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl IrrigationEvent {
    pub fn new(field_id: impl Into<String>, event_date: NaiveDate, amount_mm: f64) -> Self {
        Self {
            id: None,
            field_id: field_id.into(),
            event_date,
            amount_mm,
            source: IrrigationSource::Manual,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_source(mut self, source: IrrigationSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
