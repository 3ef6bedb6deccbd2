use crate::db::Database;
use crate::error::{Result, SigirError};
use crate::models::{IrrigationEvent, IrrigationSource};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

// Irrigation journal queries

impl Database {
    pub fn insert_irrigation_event(&self, event: &IrrigationEvent) -> Result<i64> {
        if !event.amount_mm.is_finite() || event.amount_mm < 0.0 {
            return Err(SigirError::InvalidData(format!(
                "irrigation amount must be a non-negative depth, got {}",
                event.amount_mm
            )));
        }

        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO irrigation_events
                    (field_id, event_date, amount_mm, source, notes, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    event.field_id,
                    event.event_date.format(DATE_FORMAT).to_string(),
                    event.amount_mm,
                    event.source.as_str(),
                    event.notes,
                    event.created_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Events for a field, oldest first, optionally from `since` onwards.
    pub fn list_irrigation_events(
        &self,
        field_id: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<IrrigationEvent>> {
        let since = since
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM irrigation_events
                WHERE field_id = ?1 AND event_date >= ?2
                ORDER BY event_date, id
                "#,
            )?;
            let events = stmt
                .query_map(params![field_id, since], row_to_irrigation_event)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }

    pub fn get_irrigation_event(&self, id: i64) -> Result<Option<IrrigationEvent>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM irrigation_events WHERE id = ?1",
                [id],
                row_to_irrigation_event,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn last_irrigation_event(&self, field_id: &str) -> Result<Option<IrrigationEvent>> {
        self.with_conn(|conn| {
            conn.query_row(
                r#"
                SELECT * FROM irrigation_events
                WHERE field_id = ?1
                ORDER BY event_date DESC, id DESC
                LIMIT 1
                "#,
                [field_id],
                row_to_irrigation_event,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn delete_irrigation_event(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM irrigation_events WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(SigirError::NotFound(format!("irrigation event {}", id)));
            }
            Ok(())
        })
    }
}

fn row_to_irrigation_event(row: &Row) -> rusqlite::Result<IrrigationEvent> {
    let date_str: String = row.get("event_date")?;
    let source_str: String = row.get("source")?;
    let created_at_str: String = row.get("created_at")?;

    let event_date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let source = IrrigationSource::from_str(&source_str).unwrap_or_else(|| {
        warn!(source = %source_str, "Unknown irrigation source in journal, treating as manual");
        IrrigationSource::Manual
    });

    Ok(IrrigationEvent {
        id: Some(row.get("id")?),
        field_id: row.get("field_id")?,
        event_date,
        amount_mm: row.get("amount_mm")?,
        source,
        notes: row.get("notes")?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn insert_and_list_in_date_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_irrigation_event(&IrrigationEvent::new("f1", date(9), 20.0))
            .unwrap();
        db.insert_irrigation_event(
            &IrrigationEvent::new("f1", date(3), 15.0)
                .with_source(IrrigationSource::Rain)
                .with_notes("orage"),
        )
        .unwrap();
        db.insert_irrigation_event(&IrrigationEvent::new("f2", date(5), 10.0))
            .unwrap();

        let events = db.list_irrigation_events("f1", None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_date, date(3));
        assert_eq!(events[0].source, IrrigationSource::Rain);
        assert_eq!(events[0].notes.as_deref(), Some("orage"));
        assert_eq!(events[1].amount_mm, 20.0);
        assert!(events.iter().all(|e| e.id.is_some()));
    }

    #[test]
    fn list_since_is_inclusive() {
        let db = Database::open_in_memory().unwrap();
        for d in [1, 5, 10] {
            db.insert_irrigation_event(&IrrigationEvent::new("f1", date(d), 10.0))
                .unwrap();
        }
        let events = db.list_irrigation_events("f1", Some(date(5))).unwrap();
        let dates: Vec<_> = events.iter().map(|e| e.event_date).collect();
        assert_eq!(dates, vec![date(5), date(10)]);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_irrigation_event(&IrrigationEvent::new("f1", date(1), -5.0));
        assert!(matches!(result, Err(SigirError::InvalidData(_))));
    }

    #[test]
    fn last_event_and_delete() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.last_irrigation_event("f1").unwrap().is_none());

        db.insert_irrigation_event(&IrrigationEvent::new("f1", date(2), 10.0))
            .unwrap();
        let id = db
            .insert_irrigation_event(&IrrigationEvent::new("f1", date(8), 25.0))
            .unwrap();

        let last = db.last_irrigation_event("f1").unwrap().unwrap();
        assert_eq!(last.id, Some(id));

        db.delete_irrigation_event(id).unwrap();
        assert!(db.get_irrigation_event(id).unwrap().is_none());
        assert_eq!(
            db.last_irrigation_event("f1").unwrap().unwrap().event_date,
            date(2)
        );
        assert!(matches!(
            db.delete_irrigation_event(id),
            Err(SigirError::NotFound(_))
        ));
    }
}
