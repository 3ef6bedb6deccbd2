use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::alerts::{AlertContext, AlertGenerator, AlertThresholds, FORECAST_WINDOW_DAYS};
use super::evapotranspiration::{round1, Et0Config, Et0Model, Site};
use super::phenology::{CropCoefficients, PhenologyCalculator, PhenologyConfig};
use super::recommendation::{RecommendationEngine, RecommendationInputs, RecommendationThresholds};
use super::soil_moisture::{SoilMoistureInterpreter, SoilMoistureThresholds};
use super::water_balance::{BalanceDay, WaterBalanceAccountant, WaterBalanceConfig};
use crate::models::{
    Alert, ClimateObservation, Et0Estimate, Et0Method, FieldDataSnapshot, FieldProfile,
    FieldStatus, IrrigationAction, IrrigationEvent, IrrigationStatus, NeedSource,
    PhenologyState, RecommendationResult, ServerRecommendation, SoilMoistureAssessment,
    SourceReport, WaterBalanceData, WaterBalanceState,
};

const PROJECTION_DAYS: usize = 7;

/// Numeric tables and thresholds for every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub crop_coefficients: CropCoefficients,
    /// Custom stage table; the WITA 9 table scaled to the field's cycle otherwise
    #[serde(default)]
    pub stages: Option<PhenologyConfig>,
    #[serde(default)]
    pub et0: Et0Config,
    #[serde(default)]
    pub water_balance: WaterBalanceConfig,
    #[serde(default)]
    pub soil_moisture: SoilMoistureThresholds,
    #[serde(default)]
    pub recommendation: RecommendationThresholds,
    #[serde(default)]
    pub alerts: AlertThresholds,
    /// Used when neither a water balance nor an SMI reading is available, mm/day
    #[serde(default = "default_static_need")]
    pub static_daily_need_mm: f64,
    /// Longest stretch of history fed into the running deficit
    #[serde(default = "default_balance_window")]
    pub balance_window_days: u32,
}

fn default_static_need() -> f64 {
    5.0
}

fn default_balance_window() -> u32 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crop_coefficients: CropCoefficients::default(),
            stages: None,
            et0: Et0Config::default(),
            water_balance: WaterBalanceConfig::default(),
            soil_moisture: SoilMoistureThresholds::default(),
            recommendation: RecommendationThresholds::default(),
            alerts: AlertThresholds::default(),
            static_daily_need_mm: default_static_need(),
            balance_window_days: default_balance_window(),
        }
    }
}

/// Everything one evaluation produced, for presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub field_id: String,
    pub generation: u64,
    pub evaluated_at: DateTime<Utc>,
    pub phenology: Option<PhenologyState>,
    pub et0: Option<Et0Estimate>,
    pub water_balance: Option<WaterBalanceState>,
    pub water_balance_view: Option<WaterBalanceData>,
    pub soil_moisture: Option<SoilMoistureAssessment>,
    /// Most recent field-mean NDVI
    pub ndvi: Option<f64>,
    pub irrigation_status: IrrigationStatus,
    pub recommendation: RecommendationResult,
    pub alerts: Vec<Alert>,
    /// Backend's own recommendation, shown for reference only
    pub server_recommendation: Option<ServerRecommendation>,
    pub sources: Vec<SourceReport>,
    /// Phenology, ET0 or SMI could not be derived
    pub incomplete: bool,
}

pub struct IrrigationEngine {
    config: EngineConfig,
    et0: Et0Model,
    balance: WaterBalanceAccountant,
    soil: SoilMoistureInterpreter,
    recommender: RecommendationEngine,
    alerts: AlertGenerator,
}

impl IrrigationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            et0: Et0Model::new(config.et0.clone()),
            balance: WaterBalanceAccountant::new(config.water_balance.clone()),
            soil: SoilMoistureInterpreter::new(config.soil_moisture.clone()),
            recommender: RecommendationEngine::new(config.recommendation.clone()),
            alerts: AlertGenerator::new(),
            config,
        }
    }

    pub fn phenology_for(&self, profile: &FieldProfile) -> PhenologyCalculator {
        let table = match &self.config.stages {
            Some(custom) => custom.scaled_to(profile.cycle_length_days),
            None => PhenologyConfig::with_coefficients(&self.config.crop_coefficients)
                .scaled_to(profile.cycle_length_days),
        };
        PhenologyCalculator::new(table)
    }

    /// Runs phenology, ET0, water balance, SMI, recommendation and alerts in that
    /// order over whatever the snapshot holds. Never fails; missing inputs show up
    /// as absent outputs and the `incomplete` flag.
    pub fn evaluate(
        &self,
        snapshot: &FieldDataSnapshot,
        profile: &FieldProfile,
        events: &[IrrigationEvent],
        now: DateTime<Utc>,
    ) -> EvaluationReport {
        let today = now.date_naive();

        let phenology = match profile.planting_date {
            Some(planted) => Some(self.phenology_for(profile).calculate(planted, today)),
            None => {
                tracing::debug!(field = %profile.id, "No planting date, phenology skipped");
                None
            }
        };
        let kc = phenology.as_ref().map(|p| p.kc);

        let site = Site::for_field(profile, snapshot.topography.as_ref().map(|t| t.elevation_m));
        let et0 = self.estimate_today(snapshot, &site, kc, today);

        let (water_balance, balance_days) = match (&et0, kc) {
            (Some(today_et0), Some(kc)) => {
                let days = self.balance_days(snapshot, profile, today_et0, kc, today);
                let window_start = days.first().map(|d| d.date).unwrap_or(today);
                let relevant: Vec<IrrigationEvent> = events
                    .iter()
                    .filter(|e| e.event_date >= window_start && e.event_date <= today)
                    .cloned()
                    .collect();
                (Some(self.balance.run(&days, &relevant)), days)
            }
            _ => (None, Vec::new()),
        };

        let soil_moisture = snapshot.soil_moisture.as_ref().map(|r| self.soil.interpret(r));

        let rain_3d = snapshot
            .weather
            .as_ref()
            .map(|w| w.rain_next_days(FORECAST_WINDOW_DAYS));

        let forecast_etc = self.forecast_demand(snapshot, &site, kc);
        let irrigation_status = self.irrigation_status(
            water_balance.as_ref(),
            &forecast_etc,
            soil_moisture.as_ref(),
            rain_3d,
        );

        let recommendation = self.recommender.recommend(
            &RecommendationInputs {
                smi_percent: soil_moisture.as_ref().map(|s| s.smi_percent),
                rain_forecast_3d_mm: rain_3d,
                cumulative_deficit_mm: water_balance.as_ref().map(|w| w.cumulative_deficit_mm),
                is_critical_stage: phenology.as_ref().map_or(false, |p| p.is_critical),
            },
            now,
        );

        let alerts = self.alerts.generate(&AlertContext {
            phenology: phenology.as_ref(),
            soil_moisture: snapshot.soil_moisture.as_ref(),
            weather: snapshot.weather.as_ref(),
            thresholds: &self.config.alerts,
            now,
        });

        let server_recommendation = snapshot
            .soil_moisture
            .as_ref()
            .and_then(|r| r.server_recommendation.clone());
        if let Some(server) = &server_recommendation {
            log_disagreement(server, recommendation.action);
        }

        // Display view, one decimal
        let water_balance_view = match (&et0, &water_balance) {
            (Some(et0), Some(balance)) => Some(WaterBalanceData {
                et0: round1(et0.et0),
                kc: et0.kc.unwrap_or_default(),
                etc: round1(et0.etc.unwrap_or_default()),
                effective_rain_7d: round1(
                    balance_days
                        .iter()
                        .rev()
                        .take(PROJECTION_DAYS)
                        .map(|d| self.balance.effective_rainfall(d.precipitation_mm))
                        .sum(),
                ),
                cumulative_deficit: round1(balance.cumulative_deficit_mm),
                irrigation_recommendation: recommendation.action,
                next_check_date: recommendation.next_check_date,
                soil_moisture: soil_moisture.as_ref().map(|s| round1(s.smi_percent)),
            }),
            _ => None,
        };

        let incomplete = phenology.is_none() || et0.is_none() || soil_moisture.is_none();

        EvaluationReport {
            field_id: profile.id.clone(),
            generation: snapshot.generation,
            evaluated_at: now,
            phenology,
            et0,
            water_balance,
            water_balance_view,
            soil_moisture,
            ndvi: snapshot.latest_ndvi(),
            irrigation_status,
            recommendation,
            alerts,
            server_recommendation,
            sources: snapshot.sources.clone(),
            incomplete,
        }
    }

    /// ET0 for today from the forecast, or the provider series when there is no
    /// forecast to compute from.
    fn estimate_today(
        &self,
        snapshot: &FieldDataSnapshot,
        site: &Site,
        kc: Option<f64>,
        today: NaiveDate,
    ) -> Option<Et0Estimate> {
        let provided = provider_et0_on(snapshot, today);

        if let Some(observation) = snapshot.weather.as_ref().and_then(|w| w.today()) {
            let mut observation = observation.clone();
            observation.et0_provider = observation.et0_provider.or(provided);
            return self.et0.estimate(&observation, site, kc);
        }

        let et0 = provided?.max(0.0);
        Some(Et0Estimate {
            date: today,
            et0,
            method: Et0Method::Provider,
            kc,
            etc: kc.map(|kc| et0 * kc),
        })
    }

    /// Dated demand and rain from the start of the accounting window up to today.
    ///
    /// Past days use the provider ET0 when it has that date and today's ET0
    /// otherwise. Without rainfall history the window is today alone.
    fn balance_days(
        &self,
        snapshot: &FieldDataSnapshot,
        profile: &FieldProfile,
        today_et0: &Et0Estimate,
        kc: f64,
        today: NaiveDate,
    ) -> Vec<BalanceDay> {
        let today_etc = today_et0.etc.unwrap_or(today_et0.et0 * kc);
        let today_rain = snapshot
            .weather
            .as_ref()
            .and_then(|w| w.today())
            .map(|d| d.precipitation_sum_mm)
            .unwrap_or(0.0);

        let mut days = Vec::new();

        if let Some(rainfall) = &snapshot.rainfall {
            let mut start = today - Duration::days(self.config.balance_window_days as i64);
            if let Some(planted) = profile.planting_date {
                start = start.max(planted);
            }

            let mut date = start;
            while date < today {
                let precipitation = rainfall
                    .iter()
                    .filter(|r| r.date == date && !r.is_missing())
                    .map(|r| r.precipitation_mm)
                    .sum();
                let etc = provider_et0_on(snapshot, date)
                    .map(|et0| et0.max(0.0) * kc)
                    .unwrap_or(today_etc);
                days.push(BalanceDay {
                    date,
                    etc_mm: etc,
                    precipitation_mm: precipitation,
                });
                date += Duration::days(1);
            }
        } else {
            tracing::debug!("No rainfall history, water balance limited to today");
        }

        days.push(BalanceDay {
            date: today,
            etc_mm: today_etc,
            precipitation_mm: today_rain,
        });
        days
    }

    /// Forecast ETc and rain for the projection window. Empty without a crop coefficient.
    fn forecast_demand(
        &self,
        snapshot: &FieldDataSnapshot,
        site: &Site,
        kc: Option<f64>,
    ) -> Vec<BalanceDay> {
        let Some(weather) = snapshot.weather.as_ref() else {
            return Vec::new();
        };
        if kc.is_none() {
            return Vec::new();
        }

        weather
            .next_days(PROJECTION_DAYS)
            .iter()
            .filter_map(|day| {
                let mut day: ClimateObservation = day.clone();
                day.et0_provider = day.et0_provider.or(provider_et0_on(snapshot, day.date));
                let estimate = self.et0.estimate(&day, site, kc)?;
                Some(BalanceDay {
                    date: day.date,
                    etc_mm: estimate.etc?,
                    precipitation_mm: day.precipitation_sum_mm,
                })
            })
            .collect()
    }

    /// Daily need with the fallback order water balance, SMI band, static default.
    fn irrigation_status(
        &self,
        balance: Option<&WaterBalanceState>,
        forecast: &[BalanceDay],
        soil: Option<&SoilMoistureAssessment>,
        rain_3d: Option<f64>,
    ) -> IrrigationStatus {
        let (daily_need, total_need, need_source) = match (balance, soil) {
            (Some(balance), _) => {
                let total = if forecast.is_empty() {
                    balance.daily_net_need_mm * PROJECTION_DAYS as f64
                } else {
                    self.balance.project(forecast)
                };
                (balance.daily_net_need_mm, total, NeedSource::WaterBalance)
            }
            (None, Some(soil)) => {
                tracing::debug!("No water balance, using SMI band need");
                (
                    soil.default_daily_need_mm,
                    soil.default_daily_need_mm * PROJECTION_DAYS as f64,
                    NeedSource::SoilMoistureBand,
                )
            }
            (None, None) => {
                tracing::debug!("No water balance or SMI, using static daily need");
                let need = self.config.static_daily_need_mm;
                (need, need * PROJECTION_DAYS as f64, NeedSource::StaticDefault)
            }
        };

        let mut needs_irrigation = match soil {
            Some(soil) => soil.needs_irrigation,
            None => need_source == NeedSource::WaterBalance && daily_need > 0.0,
        };

        let (status, status_text) = match soil {
            Some(soil) => (soil.status, soil.status_text.clone()),
            None if need_source == NeedSource::StaticDefault => {
                (FieldStatus::Caution, "DONNÉES INCOMPLÈTES".to_string())
            }
            None if needs_irrigation => {
                (FieldStatus::Caution, "SURVEILLANCE NÉCESSAIRE".to_string())
            }
            None => (FieldStatus::Healthy, "SITUATION SAINE".to_string()),
        };

        let wet_forecast = self.config.recommendation.wet_forecast_mm;
        let recommendation = match rain_3d {
            Some(rain) if rain > wet_forecast => {
                needs_irrigation = false;
                format!("Pluie attendue ({:.0}mm). Reporter l'irrigation.", rain)
            }
            _ if needs_irrigation && need_source == NeedSource::WaterBalance => format!(
                "Irriguer {:.0}mm/jour. Total 7j: {:.0}mm",
                daily_need, total_need
            ),
            _ => match (soil, need_source) {
                (Some(soil), _) => SoilMoistureInterpreter::advice(soil),
                (None, NeedSource::StaticDefault) => {
                    format!("Estimation: Irriguer ~{:.0}mm/jour", daily_need)
                }
                (None, _) => "Aucune action nécessaire".to_string(),
            },
        };

        IrrigationStatus {
            needs_irrigation,
            daily_need_mm: daily_need,
            total_need_mm: total_need,
            status,
            status_text,
            recommendation,
            need_source,
        }
    }
}

impl Default for IrrigationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn provider_et0_on(snapshot: &FieldDataSnapshot, date: NaiveDate) -> Option<f64> {
    snapshot
        .provider_et0
        .as_ref()?
        .iter()
        .find(|p| p.date == date)
        .map(|p| p.et0)
}

/// The local decision is authoritative; a differing backend opinion is only logged.
fn log_disagreement(server: &ServerRecommendation, local: IrrigationAction) {
    match IrrigationAction::from_server_code(&server.action) {
        Some(remote) if remote != local => tracing::info!(
            local = %local,
            server = %server.action,
            "Backend recommendation disagrees with local decision"
        ),
        None => tracing::debug!(action = %server.action, "Unrecognised backend action code"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AlertLevel, CurrentConditions, GrowthStage, ProviderEt0, RainfallObservation,
        SoilMoistureReading, Topography, WeatherForecast, WindSpeed,
    };
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 8, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    fn profile() -> FieldProfile {
        FieldProfile::new("parcelle-1", "Bas-fond nord")
            .with_planting_date(today() - Duration::days(80))
            .with_location(7.7, -5.0)
            .with_elevation(370.0)
    }

    fn forecast(rain: [f64; 7], current_temp: f64) -> WeatherForecast {
        WeatherForecast {
            latitude: Some(7.7),
            longitude: Some(-5.0),
            current: Some(CurrentConditions {
                temperature_c: Some(current_temp),
                relative_humidity: Some(70.0),
                wind_speed: None,
                precipitation_mm: None,
            }),
            daily: rain
                .iter()
                .enumerate()
                .map(|(i, mm)| {
                    ClimateObservation::new(today() + Duration::days(i as i64), 32.0, 22.0)
                        .with_humidity(70.0)
                        .with_wind(WindSpeed::kilometers_per_hour(7.2, 10.0))
                        .with_precipitation(*mm)
                })
                .collect(),
        }
    }

    fn full_snapshot(smi: f64, rain: [f64; 7]) -> FieldDataSnapshot {
        let mut snapshot = FieldDataSnapshot::empty("parcelle-1", 3);
        snapshot.weather = Some(forecast(rain, 30.0));
        snapshot.soil_moisture = Some(SoilMoistureReading::new(smi));
        snapshot.rainfall = Some(
            (1..=10)
                .map(|i| RainfallObservation {
                    date: today() - Duration::days(i),
                    precipitation_mm: if i == 4 { -999.0 } else { 0.0 },
                })
                .collect(),
        );
        snapshot.topography = Some(Topography {
            elevation_m: 365.0,
            slope_deg: None,
            drainage_class: None,
        });
        snapshot
    }

    #[test]
    fn full_data_uses_water_balance() {
        let engine = IrrigationEngine::default();
        let report = engine.evaluate(&full_snapshot(0.25, [0.0; 7]), &profile(), &[], now());

        let phenology = report.phenology.as_ref().unwrap();
        assert_eq!(phenology.stage, GrowthStage::Floraison);

        let et0 = report.et0.as_ref().unwrap();
        assert_eq!(et0.method, Et0Method::PenmanMonteith);
        assert!(et0.etc.unwrap() > et0.et0);

        let balance = report.water_balance.as_ref().unwrap();
        assert!(balance.cumulative_deficit_mm > 0.0);
        assert_eq!(report.irrigation_status.need_source, NeedSource::WaterBalance);
        assert!(report.irrigation_status.needs_irrigation);
        assert_eq!(report.recommendation.action, IrrigationAction::IrrigateSoon);
        assert!(!report.incomplete);

        let view = report.water_balance_view.as_ref().unwrap();
        assert_eq!(view.cumulative_deficit, round1(balance.cumulative_deficit_mm));
        assert_eq!(view.et0, round1(et0.et0));
        assert_eq!(view.et0, (view.et0 * 10.0).round() / 10.0);
    }

    #[test]
    fn deficit_window_starts_no_earlier_than_balance_window() {
        let engine = IrrigationEngine::default();
        let report = engine.evaluate(&full_snapshot(0.5, [0.0; 7]), &profile(), &[], now());
        let balance = report.water_balance.unwrap();
        assert_eq!(balance.accounting_since, Some(today() - Duration::days(30)));
    }

    #[test]
    fn recorded_irrigation_reduces_deficit() {
        let engine = IrrigationEngine::default();
        let snapshot = full_snapshot(0.5, [0.0; 7]);
        let without = engine.evaluate(&snapshot, &profile(), &[], now());
        let events = vec![IrrigationEvent::new("parcelle-1", today() - Duration::days(1), 40.0)];
        let with = engine.evaluate(&snapshot, &profile(), &events, now());

        let before = without.water_balance.unwrap().cumulative_deficit_mm;
        let after = with.water_balance.unwrap().cumulative_deficit_mm;
        assert!(after < before);
        assert!(after >= 0.0);
    }

    #[test]
    fn missing_planting_date_falls_back_to_smi_band() {
        let engine = IrrigationEngine::default();
        let mut field = profile();
        field.planting_date = None;

        let report = engine.evaluate(&full_snapshot(0.12, [0.0; 7]), &field, &[], now());
        assert!(report.phenology.is_none());
        assert!(report.water_balance.is_none());
        assert!(report.et0.as_ref().unwrap().etc.is_none());
        assert_eq!(report.irrigation_status.need_source, NeedSource::SoilMoistureBand);
        assert_eq!(report.irrigation_status.daily_need_mm, 8.0);
        assert_eq!(report.recommendation.action, IrrigationAction::IrrigateNow);
        assert!(report.incomplete);
        assert!(!report.alerts.iter().any(|a| a.id == "critical-stage"));
    }

    #[test]
    fn nothing_resolved_uses_static_default() {
        let engine = IrrigationEngine::default();
        let mut field = profile();
        field.planting_date = None;

        let snapshot = FieldDataSnapshot::empty("parcelle-1", 1);
        let report = engine.evaluate(&snapshot, &field, &[], now());
        assert_eq!(report.irrigation_status.need_source, NeedSource::StaticDefault);
        assert_eq!(report.irrigation_status.daily_need_mm, 5.0);
        assert_eq!(report.irrigation_status.total_need_mm, 35.0);
        assert_eq!(report.recommendation.action, IrrigationAction::Monitor);
        assert!(report.incomplete);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn provider_et0_used_without_coordinates() {
        let engine = IrrigationEngine::default();
        let mut field = profile();
        field.latitude = None;
        field.longitude = None;

        let mut snapshot = full_snapshot(0.5, [0.0; 7]);
        snapshot.provider_et0 = Some(vec![ProviderEt0 {
            date: today(),
            et0: 4.5,
        }]);
        let report = engine.evaluate(&snapshot, &field, &[], now());
        let et0 = report.et0.unwrap();
        assert_eq!(et0.method, Et0Method::Provider);
        assert_eq!(et0.et0, 4.5);
    }

    #[test]
    fn no_coordinates_and_no_provider_means_no_et0() {
        let engine = IrrigationEngine::default();
        let mut field = profile();
        field.latitude = None;

        let report = engine.evaluate(&full_snapshot(0.5, [0.0; 7]), &field, &[], now());
        assert!(report.et0.is_none());
        assert!(report.water_balance.is_none());
        assert_eq!(report.irrigation_status.need_source, NeedSource::SoilMoistureBand);
        assert!(report.incomplete);
    }

    #[test]
    fn wet_forecast_postpones_irrigation() {
        let engine = IrrigationEngine::default();
        let report = engine.evaluate(
            &full_snapshot(0.3, [15.0, 10.0, 5.0, 0.0, 0.0, 0.0, 0.0]),
            &profile(),
            &[],
            now(),
        );
        assert!(!report.irrigation_status.needs_irrigation);
        assert!(report.irrigation_status.recommendation.starts_with("Pluie attendue (30mm)"));
        assert_eq!(report.recommendation.action, IrrigationAction::DoNotIrrigate);
    }

    #[test]
    fn saturated_field_raises_danger_and_zero_band_need() {
        let engine = IrrigationEngine::default();
        let report = engine.evaluate(&full_snapshot(0.9, [0.0; 7]), &profile(), &[], now());
        assert_eq!(report.soil_moisture.as_ref().unwrap().default_daily_need_mm, 0.0);
        assert!(report
            .alerts
            .iter()
            .any(|a| a.id == "smi-excess" && a.level == AlertLevel::Danger));
    }

    #[test]
    fn alert_thresholds_come_from_engine_config() {
        let snapshot = full_snapshot(0.30, [0.0; 7]);
        let standard = IrrigationEngine::default().evaluate(&snapshot, &profile(), &[], now());
        assert!(standard.alerts.iter().any(|a| a.id == "smi-low"));

        let mut config = EngineConfig::default();
        config.recommendation.low_smi = 25.0;
        config.soil_moisture.high_deficit_below = 25.0;
        config.alerts.deficit_smi = 25.0;
        let report = IrrigationEngine::new(config).evaluate(&snapshot, &profile(), &[], now());
        assert!(!report.alerts.iter().any(|a| a.id == "smi-low"));
    }

    #[test]
    fn server_recommendation_is_surfaced_not_applied() {
        let engine = IrrigationEngine::default();
        let mut snapshot = full_snapshot(0.6, [0.0; 7]);
        if let Some(reading) = snapshot.soil_moisture.as_mut() {
            reading.server_recommendation = Some(ServerRecommendation {
                action: "IRRIGUER_IMMEDIATEMENT".to_string(),
                priority: "haute".to_string(),
                volume_mm: 40.0,
                reason: "test".to_string(),
                next_check_hours: Some(24),
            });
        }
        let report = engine.evaluate(&snapshot, &profile(), &[], now());
        assert_eq!(report.recommendation.action, IrrigationAction::Monitor);
        assert_eq!(report.server_recommendation.unwrap().volume_mm, 40.0);
    }

    #[test]
    fn evaluation_is_reproducible() {
        let engine = IrrigationEngine::default();
        let snapshot = full_snapshot(0.22, [2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let first = engine.evaluate(&snapshot, &profile(), &[], now());
        let second = engine.evaluate(&snapshot, &profile(), &[], now());
        assert_eq!(first, second);
    }

    #[test]
    fn shorter_cycle_shifts_stage() {
        let engine = IrrigationEngine::default();
        let mut field = profile();
        field.cycle_length_days = 100;
        field.planting_date = Some(today() - Duration::days(80));
        let report = engine.evaluate(&full_snapshot(0.5, [0.0; 7]), &field, &[], now());
        assert_eq!(report.phenology.unwrap().stage, GrowthStage::Maturation);
    }
}
