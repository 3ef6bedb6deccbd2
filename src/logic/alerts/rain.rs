use super::{AlertContext, AlertRule, FORECAST_WINDOW_DAYS};
use crate::models::{Alert, AlertLevel};

/// A single forecast day above the flood threshold.
pub struct FloodRule;

impl AlertRule for FloodRule {
    fn id(&self) -> &'static str {
        "flood-critical"
    }

    fn name(&self) -> &'static str {
        "Flood risk"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let max_daily = ctx.weather?.max_daily_rain_next_days(FORECAST_WINDOW_DAYS)?;
        if max_daily <= ctx.thresholds.flood_daily_mm {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Critical,
            "Alerte inondation majeure",
            format!(
                "{:.0}mm attendus en 24h - Risque submersion. Vérifier évacuation eau. \
                 Reporter traitements et fertilisation.",
                max_daily
            ),
            ctx.now,
        ))
    }
}

/// Evaluated independently of the flood rule, so a very wet window can raise both.
pub struct HeavyRainRule;

impl AlertRule for HeavyRainRule {
    fn id(&self) -> &'static str {
        "heavy-rain"
    }

    fn name(&self) -> &'static str {
        "Heavy rain"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let weather = ctx.weather?;
        let max_daily = weather.max_daily_rain_next_days(FORECAST_WINDOW_DAYS)?;
        let total = weather.rain_next_days(FORECAST_WINDOW_DAYS);
        let t = ctx.thresholds;

        let heavy_day = max_daily > t.heavy_daily_mm && max_daily <= t.flood_daily_mm;
        let expected = if heavy_day {
            format!("{:.0}mm attendus en 24h", max_daily)
        } else if total > t.heavy_total_mm {
            format!("{:.0}mm attendus sur 3 jours", total)
        } else {
            return None;
        };

        Some(Alert::new(
            self.id(),
            AlertLevel::Warning,
            "Fortes pluies prévues",
            format!(
                "{} - Risque d'excès d'eau. Arrêter irrigation. \
                 Surveiller drainage et risque maladies.",
                expected
            ),
            ctx.now,
        ))
    }
}

/// Significant rain on a dry field. Informational, alongside any deficit alert.
pub struct BeneficialRainRule;

impl AlertRule for BeneficialRainRule {
    fn id(&self) -> &'static str {
        "beneficial-rain"
    }

    fn name(&self) -> &'static str {
        "Beneficial rain"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let total = ctx.weather?.rain_next_days(FORECAST_WINDOW_DAYS);
        let smi = ctx.smi_percent()?;

        let t = ctx.thresholds;
        if total <= t.beneficial_total_mm || smi >= t.beneficial_max_smi {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Info,
            "Pluie bénéfique attendue",
            format!(
                "{:.0}mm prévus sur 3 jours - Excellente nouvelle pour le sol sec. \
                 Reporter irrigation prévue.",
                total
            ),
            ctx.now,
        ))
    }
}
