use super::{AlertContext, AlertRule, FORECAST_WINDOW_DAYS};
use crate::models::{Alert, AlertLevel};

/// Current temperature above the heat threshold, when the soil is also dry.
pub struct HeatStressRule;

impl AlertRule for HeatStressRule {
    fn id(&self) -> &'static str {
        "heat-stress"
    }

    fn name(&self) -> &'static str {
        "Heat and water stress"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let temp = hot_now(ctx)?;
        let smi = ctx.smi_percent()?;
        if smi >= ctx.thresholds.heat_stress_smi {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Critical,
            "Risque stress thermique élevé",
            format!(
                "{:.0}°C + SMI {:.0}% - Combiner irrigation et ombrage si possible. \
                 Éviter traitements phyto.",
                temp, smi
            ),
            ctx.now,
        ))
    }
}

/// Heat on a field that is not known to be dry. Without an SMI reading this is
/// the only heat alert that can fire.
pub struct HighTemperatureRule;

impl AlertRule for HighTemperatureRule {
    fn id(&self) -> &'static str {
        "high-temp"
    }

    fn name(&self) -> &'static str {
        "High temperature"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let temp = hot_now(ctx)?;
        if ctx
            .smi_percent()
            .is_some_and(|smi| smi < ctx.thresholds.heat_stress_smi)
        {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Warning,
            "Forte chaleur",
            format!(
                "{:.0}°C - Surveiller SMI. Augmenter fréquence contrôle. \
                 Irrigation le soir recommandée.",
                temp
            ),
            ctx.now,
        ))
    }
}

fn hot_now(ctx: &AlertContext) -> Option<f64> {
    let temp = ctx.weather?.current_temperature()?;
    (temp > ctx.thresholds.heat_c).then_some(temp)
}

/// Dry and hot days ahead
pub struct DroughtForecastRule;

impl AlertRule for DroughtForecastRule {
    fn id(&self) -> &'static str {
        "drought-forecast"
    }

    fn name(&self) -> &'static str {
        "Dry spell forecast"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let weather = ctx.weather?;
        let rain = weather.rain_next_days(FORECAST_WINDOW_DAYS);
        let max_temp = weather.max_temp_next_days(FORECAST_WINDOW_DAYS)?;
        let t = ctx.thresholds;

        if rain >= t.drought_rain_mm || max_temp <= t.drought_temp_c {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Warning,
            "Période sèche prévue",
            format!(
                "Moins de {:.0}mm attendus sur 3 jours avec T°>{:.0}°C. Prévoir irrigation. \
                 Besoin estimé: 15-20mm.",
                t.drought_rain_mm, max_temp
            ),
            ctx.now,
        ))
    }
}
