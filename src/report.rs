use std::fmt::Write;

use crate::error::Result;
use crate::logic::EvaluationReport;
use crate::models::{FieldProfile, SourceOutcome};

/// Plain-text rendering of one evaluation, section by section.
pub struct TextReport<'a> {
    report: &'a EvaluationReport,
    profile: &'a FieldProfile,
}

impl<'a> TextReport<'a> {
    pub fn new(report: &'a EvaluationReport, profile: &'a FieldProfile) -> Self {
        Self { report, profile }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_header(&mut out);
        self.render_phenology(&mut out);
        self.render_water(&mut out);
        self.render_soil_moisture(&mut out);
        self.render_decision(&mut out);
        self.render_alerts(&mut out);
        self.render_sources(&mut out);
        out
    }

    fn render_header(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "{} ({}) - {}",
            self.profile.name,
            self.profile.variety,
            self.report.evaluated_at.format("%Y-%m-%d %H:%M UTC")
        );
        if self.report.incomplete {
            let _ = writeln!(out, "!! Données incomplètes, résultat indicatif");
        }
        out.push('\n');
    }

    fn render_phenology(&self, out: &mut String) {
        let _ = writeln!(out, "Phénologie");
        match &self.report.phenology {
            Some(p) => {
                let _ = writeln!(
                    out,
                    "  {} - jour {} / {} ({}%), Kc {:.2}{}",
                    p.stage,
                    p.day_index,
                    p.cycle_length_days,
                    p.progress_pct,
                    p.kc,
                    if p.is_critical { ", stade critique" } else { "" }
                );
                let _ = writeln!(
                    out,
                    "  Récolte prévue le {} ({} jours)",
                    p.harvest_date, p.days_remaining
                );
            }
            None => {
                let _ = writeln!(out, "  Date de semis inconnue");
            }
        }
    }

    fn render_water(&self, out: &mut String) {
        let _ = writeln!(out, "Bilan hydrique");
        if let Some(et0) = &self.report.et0 {
            let _ = write!(out, "  ET0 {:.1} mm/j ({})", et0.et0, et0.method);
            if let Some(etc) = et0.etc {
                let _ = write!(out, ", ETc {:.1} mm/j", etc);
            }
            out.push('\n');
        }
        if let Some(balance) = &self.report.water_balance {
            let _ = writeln!(
                out,
                "  Pluie efficace {:.1} mm, déficit cumulé {:.1} mm, volume conseillé {:.1} mm",
                balance.effective_rainfall_mm,
                balance.cumulative_deficit_mm,
                balance.recommended_volume_mm
            );
        }

        let status = &self.report.irrigation_status;
        let _ = writeln!(
            out,
            "  Besoin {:.1} mm/j, {:.1} mm sur 7 jours ({})",
            status.daily_need_mm,
            status.total_need_mm,
            status.need_source.as_str()
        );
        let _ = writeln!(out, "  {} - {}", status.status_text, status.recommendation);
    }

    fn render_soil_moisture(&self, out: &mut String) {
        let _ = writeln!(out, "Humidité du sol");
        match &self.report.soil_moisture {
            Some(smi) => {
                let _ = writeln!(
                    out,
                    "  SMI {:.0}% ({}), confiance {:.0}%",
                    smi.smi_percent,
                    smi.band,
                    smi.confidence * 100.0
                );
            }
            None => {
                let _ = writeln!(out, "  SMI indisponible");
            }
        }
        if let Some(ndvi) = self.report.ndvi {
            let _ = writeln!(out, "  NDVI {:.2}", ndvi);
        }
    }

    fn render_decision(&self, out: &mut String) {
        let rec = &self.report.recommendation;
        let _ = writeln!(out, "Recommandation: {}", rec.action.label());
        let _ = writeln!(out, "  {}", rec.reason);
        let _ = writeln!(
            out,
            "  Prochain contrôle: {}",
            rec.next_check_date.format("%Y-%m-%d")
        );
        if let Some(server) = &self.report.server_recommendation {
            let _ = writeln!(
                out,
                "  Serveur: {} ({}, {:.0} mm)",
                server.action, server.priority, server.volume_mm
            );
        }
    }

    fn render_alerts(&self, out: &mut String) {
        if self.report.alerts.is_empty() {
            let _ = writeln!(out, "Aucune alerte");
            return;
        }
        let _ = writeln!(out, "Alertes");
        for alert in &self.report.alerts {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                alert.level.symbol(),
                alert.title,
                alert.message
            );
        }
    }

    fn render_sources(&self, out: &mut String) {
        let failed: Vec<String> = self
            .report
            .sources
            .iter()
            .filter(|s| !s.is_loaded())
            .map(|s| match &s.outcome {
                SourceOutcome::Failed(msg) => format!("{}: {}", s.source, msg),
                SourceOutcome::TimedOut => format!("{}: délai dépassé", s.source),
                SourceOutcome::NotConfigured => format!("{}: non configuré", s.source),
                SourceOutcome::Loaded => s.source.to_string(),
            })
            .collect();
        if !failed.is_empty() {
            let _ = writeln!(out, "Sources indisponibles");
            for line in failed {
                let _ = writeln!(out, "  {}", line);
            }
        }
    }
}

pub fn render_json(report: &EvaluationReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{EngineConfig, IrrigationEngine};
    use crate::models::{
        DataSource, FieldDataSnapshot, NdviObservation, SoilMoistureReading, SourceReport,
    };
    use chrono::NaiveDate;
    use chrono::{TimeZone, Utc};

    fn profile() -> FieldProfile {
        serde_yaml::from_str(
            "id: parcelle-1\nname: Rizière Nord\nplanting_date: 2025-06-01\nlatitude: 5.3\n",
        )
        .unwrap()
    }

    fn evaluate(snapshot: &FieldDataSnapshot) -> EvaluationReport {
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 7, 0, 0).unwrap();
        IrrigationEngine::new(EngineConfig::default()).evaluate(snapshot, &profile(), &[], now)
    }

    #[test]
    fn empty_snapshot_renders_incomplete_report() {
        let mut snapshot = FieldDataSnapshot::empty("parcelle-1", 1);
        snapshot.sources = vec![SourceReport {
            source: DataSource::SoilMoisture,
            outcome: SourceOutcome::TimedOut,
        }];
        let report = evaluate(&snapshot);
        let text = TextReport::new(&report, &profile()).render();

        assert!(text.starts_with("Rizière Nord (WITA 9)"));
        assert!(text.contains("Données incomplètes"));
        assert!(text.contains("SMI indisponible"));
        assert!(text.contains("Soil moisture (SMI): délai dépassé"));
    }

    #[test]
    fn soil_moisture_line_shows_percent() {
        let mut snapshot = FieldDataSnapshot::empty("parcelle-1", 1);
        snapshot.soil_moisture = Some(SoilMoistureReading::new(0.12));
        let report = evaluate(&snapshot);
        let text = TextReport::new(&report, &profile()).render();
        assert!(text.contains("SMI 12%"));
        assert!(text.contains("Phénologie"));
        assert!(!text.contains("NDVI"));
    }

    #[test]
    fn latest_ndvi_is_shown() {
        let mut snapshot = FieldDataSnapshot::empty("parcelle-1", 1);
        snapshot.ndvi = Some(vec![
            NdviObservation {
                date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                ndvi_mean: 0.58,
            },
            NdviObservation {
                date: NaiveDate::from_ymd_opt(2025, 8, 6).unwrap(),
                ndvi_mean: 0.64,
            },
        ]);
        let report = evaluate(&snapshot);
        assert_eq!(report.ndvi, Some(0.64));
        assert!(TextReport::new(&report, &profile()).render().contains("NDVI 0.64"));
    }

    #[test]
    fn json_output_is_parseable() {
        let report = evaluate(&FieldDataSnapshot::empty("parcelle-1", 3));
        let json = render_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["field_id"], "parcelle-1");
        assert_eq!(value["generation"], 3);
    }
}
