use super::{AlertContext, AlertRule};
use crate::models::{Alert, AlertLevel};

/// Root zone close to wilting.
pub struct SevereDeficitRule;

impl AlertRule for SevereDeficitRule {
    fn id(&self) -> &'static str {
        "smi-critical"
    }

    fn name(&self) -> &'static str {
        "Severe soil water deficit"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let smi = ctx.smi_percent()?;
        if smi >= ctx.thresholds.severe_deficit_smi {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Critical,
            "Déficit hydrique sévère",
            format!(
                "SMI à {:.0}% - Irrigation immédiate requise pour éviter stress hydrique. \
                 Apporter 40-50mm d'eau rapidement.",
                smi
            ),
            ctx.now,
        ))
    }
}

/// Deficit that can still wait a day or two. Gives way to the severe rule.
pub struct SoilDeficitRule;

impl AlertRule for SoilDeficitRule {
    fn id(&self) -> &'static str {
        "smi-low"
    }

    fn name(&self) -> &'static str {
        "Soil water deficit"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let smi = ctx.smi_percent()?;
        let t = ctx.thresholds;
        if smi < t.severe_deficit_smi || smi >= t.deficit_smi {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Warning,
            "Sol en déficit hydrique",
            format!(
                "SMI à {:.0}% - Planifier irrigation dans les 24-48h. Besoin estimé: 30-40mm",
                smi
            ),
            ctx.now,
        ))
    }
}

pub struct SaturationRule;

impl AlertRule for SaturationRule {
    fn id(&self) -> &'static str {
        "smi-excess"
    }

    fn name(&self) -> &'static str {
        "Soil saturation"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let smi = ctx.smi_percent()?;
        if smi <= ctx.thresholds.saturation_smi {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Danger,
            "Excès d'eau détecté",
            format!(
                "SMI à {:.0}% - Sol saturé. Vérifier drainage et éviter irrigation. \
                 Risque asphyxie racinaire.",
                smi
            ),
            ctx.now,
        ))
    }
}
