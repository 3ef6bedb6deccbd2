use std::collections::HashSet;

use super::{
    crop_stage::{CriticalStageRule, HarvestSoonRule},
    heat::{DroughtForecastRule, HeatStressRule, HighTemperatureRule},
    rain::{BeneficialRainRule, FloodRule, HeavyRainRule},
    soil_water::{SaturationRule, SevereDeficitRule, SoilDeficitRule},
    AlertContext, AlertRule,
};
use crate::models::Alert;

pub struct AlertGenerator {
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertGenerator {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn AlertRule>> = vec![
            Box::new(CriticalStageRule),
            Box::new(SevereDeficitRule),
            Box::new(SoilDeficitRule),
            Box::new(SaturationRule),
            Box::new(HeatStressRule),
            Box::new(HighTemperatureRule),
            Box::new(DroughtForecastRule),
            Box::new(FloodRule),
            Box::new(HeavyRainRule),
            Box::new(BeneficialRainRule),
            Box::new(HarvestSoonRule),
        ];

        Self { rules }
    }

    #[cfg(test)]
    pub fn with_rules(rules: Vec<Box<dyn AlertRule>>) -> Self {
        Self { rules }
    }

    /// Every rule runs; the first alert per id is kept and the list is ordered
    /// most severe first. Equal levels keep registration order.
    pub fn generate(&self, ctx: &AlertContext) -> Vec<Alert> {
        let mut seen = HashSet::new();
        let mut alerts: Vec<Alert> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let alert = rule.evaluate(ctx)?;
                tracing::debug!(
                    rule = rule.name(),
                    id = %alert.id,
                    level = ?alert.level,
                    "Alert raised"
                );
                Some(alert)
            })
            .filter(|alert| seen.insert(alert.id.clone()))
            .collect();

        alerts.sort_by(|a, b| b.level.cmp(&a.level));
        alerts
    }
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::alerts::AlertThresholds;
    use crate::models::{
        AlertLevel, ClimateObservation, CurrentConditions, GrowthStage, PhenologyState,
        SoilMoistureReading, WeatherForecast,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn forecast(current_temp: f64, rain: [f64; 3], tmax: f64) -> WeatherForecast {
        let start = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        WeatherForecast {
            latitude: None,
            longitude: None,
            current: Some(CurrentConditions {
                temperature_c: Some(current_temp),
                relative_humidity: None,
                wind_speed: None,
                precipitation_mm: None,
            }),
            daily: rain
                .iter()
                .enumerate()
                .map(|(i, mm)| {
                    ClimateObservation::new(start + chrono::Duration::days(i as i64), tmax, 22.0)
                        .with_precipitation(*mm)
                })
                .collect(),
        }
    }

    fn ctx<'a>(
        phenology: Option<&'a PhenologyState>,
        smi: Option<&'a SoilMoistureReading>,
        weather: Option<&'a WeatherForecast>,
    ) -> AlertContext<'a> {
        AlertContext {
            phenology,
            soil_moisture: smi,
            weather,
            thresholds: &AlertThresholds::STANDARD,
            now: Utc.with_ymd_and_hms(2025, 8, 10, 6, 0, 0).unwrap(),
        }
    }

    fn flowering() -> PhenologyState {
        PhenologyState {
            stage: GrowthStage::Floraison,
            day_index: 75,
            progress_pct: 63,
            is_critical: true,
            kc: 1.2,
            cycle_length_days: 120,
            days_remaining: 45,
            harvest_date: NaiveDate::from_ymd_opt(2025, 9, 24).unwrap(),
        }
    }

    #[test]
    fn saturated_field_raises_danger() {
        let reading = SoilMoistureReading::new(0.9);
        let alerts = AlertGenerator::new().generate(&ctx(None, Some(&reading), None));
        assert!(alerts
            .iter()
            .any(|a| a.id == "smi-excess" && a.level == AlertLevel::Danger));
    }

    #[test]
    fn all_fired_alerts_are_kept_and_sorted() {
        let phenology = flowering();
        let reading = SoilMoistureReading::new(0.18);
        let weather = forecast(37.0, [1.0, 0.0, 2.0], 36.0);
        let alerts = AlertGenerator::new().generate(&ctx(Some(&phenology), Some(&reading), Some(&weather)));

        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["smi-critical", "heat-stress", "critical-stage", "drought-forecast"]
        );
        assert!(alerts.windows(2).all(|w| w[0].level >= w[1].level));
    }

    #[test]
    fn beneficial_rain_does_not_suppress_deficit_warning() {
        let reading = SoilMoistureReading::new(0.30);
        let weather = forecast(30.0, [15.0, 12.0, 10.0], 30.0);
        let alerts = AlertGenerator::new().generate(&ctx(None, Some(&reading), Some(&weather)));
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["smi-low", "beneficial-rain"]);
    }

    #[test]
    fn deficit_warning_follows_configured_cut_off() {
        let reading = SoilMoistureReading::new(0.30);
        let thresholds = AlertThresholds {
            deficit_smi: 25.0,
            ..AlertThresholds::STANDARD
        };
        let c = AlertContext {
            thresholds: &thresholds,
            ..ctx(None, Some(&reading), None)
        };
        assert!(AlertGenerator::new().generate(&c).is_empty());
    }

    #[test]
    fn no_inputs_no_alerts() {
        assert!(AlertGenerator::new().generate(&ctx(None, None, None)).is_empty());
    }

    #[test]
    fn generation_is_reproducible() {
        let phenology = flowering();
        let reading = SoilMoistureReading::new(0.5);
        let weather = forecast(36.0, [90.0, 20.0, 5.0], 33.0);
        let generator = AlertGenerator::new();
        let c = ctx(Some(&phenology), Some(&reading), Some(&weather));
        assert_eq!(generator.generate(&c), generator.generate(&c));
    }

    struct Duplicate;

    impl AlertRule for Duplicate {
        fn id(&self) -> &'static str {
            "critical-stage"
        }

        fn name(&self) -> &'static str {
            "Duplicate"
        }

        fn evaluate(&self, ctx: &AlertContext) -> Option<crate::models::Alert> {
            Some(crate::models::Alert::new(
                "critical-stage",
                AlertLevel::Critical,
                "dup",
                "dup",
                ctx.now,
            ))
        }
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let phenology = flowering();
        let generator = AlertGenerator::with_rules(vec![Box::new(CriticalStageRule), Box::new(Duplicate)]);
        let alerts = generator.generate(&ctx(Some(&phenology), None, None));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }
}
