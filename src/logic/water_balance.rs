use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyBalance, IrrigationEvent, WaterBalanceState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBalanceConfig {
    /// Share of gross precipitation usable by the crop
    #[serde(default = "default_effective_rain_factor")]
    pub effective_rain_factor: f64,
    /// Paddy percolation loss, mm/day
    #[serde(default = "default_infiltration_rate")]
    pub infiltration_rate_mm: f64,
    #[serde(default = "default_irrigation_efficiency")]
    pub irrigation_efficiency: f64,
}

fn default_effective_rain_factor() -> f64 {
    0.8
}

fn default_infiltration_rate() -> f64 {
    5.0
}

fn default_irrigation_efficiency() -> f64 {
    0.75
}

impl Default for WaterBalanceConfig {
    fn default() -> Self {
        Self {
            effective_rain_factor: default_effective_rain_factor(),
            infiltration_rate_mm: default_infiltration_rate(),
            irrigation_efficiency: default_irrigation_efficiency(),
        }
    }
}

/// Crop demand and rain for one day of the accounting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceDay {
    pub date: NaiveDate,
    pub etc_mm: f64,
    pub precipitation_mm: f64,
}

pub struct WaterBalanceAccountant {
    config: WaterBalanceConfig,
}

impl WaterBalanceAccountant {
    pub fn new(config: WaterBalanceConfig) -> Self {
        Self { config }
    }

    pub fn effective_rainfall(&self, precipitation_mm: f64) -> f64 {
        precipitation_mm.max(0.0) * self.config.effective_rain_factor
    }

    /// Gross application depth needed to deliver `net_need_mm` to the field.
    pub fn gross_volume(&self, net_need_mm: f64) -> f64 {
        if self.config.irrigation_efficiency > 0.0 {
            net_need_mm / self.config.irrigation_efficiency
        } else {
            net_need_mm
        }
    }

    pub fn daily(&self, etc_mm: f64, precipitation_mm: f64) -> DailyBalance {
        let effective = self.effective_rainfall(precipitation_mm);
        let demand = etc_mm.max(0.0) + self.config.infiltration_rate_mm;
        let net_need = (demand - effective).max(0.0);

        DailyBalance {
            effective_rainfall_mm: effective,
            daily_net_need_mm: net_need,
            surplus_mm: (effective - demand).max(0.0),
            recommended_volume_mm: self.gross_volume(net_need),
        }
    }

    /// Deficit left after water is added. Never below zero.
    pub fn apply_offset(prior_deficit_mm: f64, offset_mm: f64) -> f64 {
        (prior_deficit_mm - offset_mm.max(0.0)).max(0.0)
    }

    /// Runs the balance over a dated series. Surplus rain and recorded irrigation
    /// offset the running deficit on the day they occur, after that day's need.
    pub fn run(&self, days: &[BalanceDay], events: &[IrrigationEvent]) -> WaterBalanceState {
        let mut days: Vec<&BalanceDay> = days.iter().collect();
        days.sort_by_key(|d| d.date);
        let mut events: Vec<&IrrigationEvent> = events.iter().collect();
        events.sort_by_key(|e| e.event_date);

        let mut deficit = 0.0;
        let mut last = DailyBalance {
            effective_rainfall_mm: 0.0,
            daily_net_need_mm: 0.0,
            surplus_mm: 0.0,
            recommended_volume_mm: 0.0,
        };
        let mut pending = events.iter().peekable();
        let mut last_event_date = None;

        for day in &days {
            last = self.daily(day.etc_mm, day.precipitation_mm);
            deficit += last.daily_net_need_mm;
            deficit = Self::apply_offset(deficit, last.surplus_mm);

            while let Some(event) = pending.next_if(|e| e.event_date <= day.date) {
                deficit = Self::apply_offset(deficit, event.amount_mm);
                last_event_date = Some(event.event_date);
            }
        }

        // Events recorded after the last known day still count
        for event in pending {
            deficit = Self::apply_offset(deficit, event.amount_mm);
            last_event_date = Some(event.event_date);
        }

        WaterBalanceState {
            daily_net_need_mm: last.daily_net_need_mm,
            effective_rainfall_mm: last.effective_rainfall_mm,
            cumulative_deficit_mm: deficit,
            recommended_volume_mm: last.recommended_volume_mm,
            accounting_since: last_event_date.or_else(|| days.first().map(|d| d.date)),
        }
    }

    /// Total net need over a forecast window, mm.
    pub fn project(&self, forecast: &[BalanceDay]) -> f64 {
        forecast
            .iter()
            .map(|d| self.daily(d.etc_mm, d.precipitation_mm).daily_net_need_mm)
            .sum()
    }
}

impl Default for WaterBalanceAccountant {
    fn default() -> Self {
        Self::new(WaterBalanceConfig::default())
    }
}
