use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 120;

/// Accepts French and English spellings when read from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SoilType {
    ClayLoam,
    Clay,
    Loam,
    Sandy,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::ClayLoam => "Argilo-limoneux",
            SoilType::Clay => "Argileux",
            SoilType::Loam => "Limoneux",
            SoilType::Sandy => "Sableux",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], " ").trim() {
            "clayloam" | "clay loam" | "argilo limoneux" => Some(SoilType::ClayLoam),
            "clay" | "argileux" => Some(SoilType::Clay),
            "loam" | "limoneux" => Some(SoilType::Loam),
            "sandy" | "sand" | "sableux" => Some(SoilType::Sandy),
            _ => None,
        }
    }
}

impl TryFrom<String> for SoilType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown soil type '{}'", value))
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rice field as maintained by field management. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldProfile {
    pub id: String,
    pub name: String,
    #[serde(default = "default_variety")]
    pub variety: String,
    pub planting_date: Option<NaiveDate>,
    #[serde(default = "default_cycle_length")]
    pub cycle_length_days: u32,
    pub soil_type: Option<SoilType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation_m: Option<f64>,
}

fn default_variety() -> String {
    "WITA 9".into()
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH_DAYS
}

impl FieldProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variety: default_variety(),
            planting_date: None,
            cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            soil_type: None,
            latitude: None,
            longitude: None,
            elevation_m: None,
        }
    }

    #[cfg(test)]
    pub fn with_planting_date(mut self, date: NaiveDate) -> Self {
        self.planting_date = Some(date);
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = Some(elevation_m);
        self
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}
