use super::{AlertContext, AlertRule};
use crate::models::{Alert, AlertLevel};

/// Water stress during panicle initiation, flowering or harvest costs yield.
pub struct CriticalStageRule;

impl AlertRule for CriticalStageRule {
    fn id(&self) -> &'static str {
        "critical-stage"
    }

    fn name(&self) -> &'static str {
        "Critical growth stage"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let phenology = ctx.phenology?;
        if !phenology.is_critical {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Warning,
            "Stade critique",
            format!("{} : surveillance accrue nécessaire", phenology.stage),
            ctx.now,
        ))
    }
}

pub struct HarvestSoonRule;

impl AlertRule for HarvestSoonRule {
    fn id(&self) -> &'static str {
        "harvest-soon"
    }

    fn name(&self) -> &'static str {
        "Harvest approaching"
    }

    fn evaluate(&self, ctx: &AlertContext) -> Option<Alert> {
        let remaining = ctx.phenology?.days_remaining;
        if remaining == 0 || remaining > ctx.thresholds.harvest_notice_days {
            return None;
        }

        Some(Alert::new(
            self.id(),
            AlertLevel::Info,
            "Récolte imminente",
            format!("Plus que {} jours - Préparer le matériel", remaining),
            ctx.now,
        ))
    }
}
