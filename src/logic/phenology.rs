use crate::models::{GrowthStage, PhenologyState, DEFAULT_CYCLE_LENGTH_DAYS};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Crop coefficients (Kc) by development period, FAO-56 rice values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropCoefficients {
    #[serde(default = "default_kc_initial")]
    pub initial: f64,
    #[serde(default = "default_kc_development")]
    pub development: f64,
    #[serde(default = "default_kc_mid")]
    pub mid_season: f64,
    #[serde(default = "default_kc_late")]
    pub late_season: f64,
}

fn default_kc_initial() -> f64 {
    1.05
}

fn default_kc_development() -> f64 {
    1.10
}

fn default_kc_mid() -> f64 {
    1.20
}

fn default_kc_late() -> f64 {
    0.90
}

impl Default for CropCoefficients {
    fn default() -> Self {
        Self {
            initial: default_kc_initial(),
            development: default_kc_development(),
            mid_season: default_kc_mid(),
            late_season: default_kc_late(),
        }
    }
}

impl CropCoefficients {
    pub fn for_stage(&self, stage: GrowthStage) -> f64 {
        match stage {
            GrowthStage::Semis | GrowthStage::Levee => self.initial,
            GrowthStage::Tallage => self.development,
            GrowthStage::InitiationPanicule | GrowthStage::Floraison => self.mid_season,
            GrowthStage::Maturation | GrowthStage::Recolte => self.late_season,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageWindow {
    pub stage: GrowthStage,
    pub day_start: u32,
    /// Exclusive. `None` means open-ended.
    pub day_end: Option<u32>,
    pub kc: f64,
    pub is_critical: bool,
}

impl StageWindow {
    fn contains(&self, day: u32) -> bool {
        day >= self.day_start && self.day_end.map_or(true, |end| day < end)
    }
}

/// Ordered stage table for one rice variety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenologyConfig {
    pub cycle_length_days: u32,
    pub stages: Vec<StageWindow>,
}

impl Default for PhenologyConfig {
    /// WITA 9, 120-day cycle
    fn default() -> Self {
        Self::with_coefficients(&CropCoefficients::default())
    }
}

impl PhenologyConfig {
    pub fn with_coefficients(kc: &CropCoefficients) -> Self {
        let bounds: [(GrowthStage, u32, Option<u32>, bool); 7] = [
            (GrowthStage::Semis, 0, Some(1), false),
            (GrowthStage::Levee, 1, Some(7), false),
            (GrowthStage::Tallage, 7, Some(35), false),
            (GrowthStage::InitiationPanicule, 35, Some(70), true),
            (GrowthStage::Floraison, 70, Some(90), true),
            (GrowthStage::Maturation, 90, Some(120), false),
            (GrowthStage::Recolte, 120, None, true),
        ];

        Self {
            cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            stages: bounds
                .into_iter()
                .map(|(stage, day_start, day_end, is_critical)| StageWindow {
                    stage,
                    day_start,
                    day_end,
                    kc: kc.for_stage(stage),
                    is_critical,
                })
                .collect(),
        }
    }

    /// Rescale stage boundaries proportionally to another cycle length.
    /// The sowing day stays a single day.
    pub fn scaled_to(&self, cycle_length_days: u32) -> Self {
        if cycle_length_days == self.cycle_length_days || self.cycle_length_days == 0 {
            return Self {
                cycle_length_days,
                ..self.clone()
            };
        }

        let ratio = cycle_length_days as f64 / self.cycle_length_days as f64;
        let scale = |day: u32| -> u32 {
            if day <= 1 {
                day
            } else {
                ((day as f64 * ratio).round() as u32).max(2)
            }
        };

        let stages = self
            .stages
            .iter()
            .map(|w| StageWindow {
                day_start: scale(w.day_start),
                day_end: w.day_end.map(scale),
                ..w.clone()
            })
            .collect();

        Self {
            cycle_length_days,
            stages,
        }
    }
}

pub struct PhenologyCalculator {
    config: PhenologyConfig,
}

impl PhenologyCalculator {
    pub fn new(config: PhenologyConfig) -> Self {
        if config.stages.is_empty() {
            tracing::warn!("Empty stage table in configuration, using WITA 9 defaults");
            let cycle = config.cycle_length_days;
            return Self {
                config: PhenologyConfig::default().scaled_to(cycle),
            };
        }
        Self { config }
    }

    /// Days since planting, floored. A planting date in the future gives day 0.
    pub fn day_index(planting_date: NaiveDate, today: NaiveDate) -> u32 {
        (today - planting_date).num_days().max(0) as u32
    }

    pub fn stage_for_day(&self, day_index: u32) -> &StageWindow {
        let cycle = self.config.cycle_length_days;
        let stages = &self.config.stages;

        if day_index >= cycle {
            if let Some(harvest) = stages
                .iter()
                .find(|w| w.stage == GrowthStage::Recolte)
            {
                return harvest;
            }
        }

        match stages.iter().find(|w| w.contains(day_index)) {
            Some(window) => window,
            None if day_index < stages[0].day_start => &stages[0],
            None => &stages[stages.len() - 1],
        }
    }

    pub fn calculate(&self, planting_date: NaiveDate, today: NaiveDate) -> PhenologyState {
        let cycle = self.config.cycle_length_days;
        let day_index = Self::day_index(planting_date, today);
        let window = self.stage_for_day(day_index);

        let progress_pct = if cycle == 0 {
            100
        } else {
            ((day_index as f64 / cycle as f64) * 100.0).round().min(100.0) as u8
        };

        PhenologyState {
            stage: window.stage,
            day_index,
            progress_pct,
            is_critical: window.is_critical,
            kc: window.kc,
            cycle_length_days: cycle,
            days_remaining: cycle.saturating_sub(day_index),
            harvest_date: planting_date + Duration::days(cycle as i64),
        }
    }
}

impl Default for PhenologyCalculator {
    fn default() -> Self {
        Self::new(PhenologyConfig::default())
    }
}
