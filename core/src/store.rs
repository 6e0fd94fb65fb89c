//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods — it never executes SQL directly.

use rusqlite::{params, Connection};
use crate::{
    dataset::SimulationDataset,
    error::SimResult,
    event::EventLogEntry,
    types::{SimDate, Tick},
};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        self.conn.execute_batch(include_str!("../../migrations/002_dataset.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        start_date: SimDate,
        end_date: SimDate,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                seed as i64,
                version,
                start_date.to_string(),
                end_date.to_string()
            ],
        )?;
        Ok(())
    }

    pub fn run_exists(&self, run_id: &str) -> SimResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM run WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, tick, subsystem, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.tick as i64,
                entry.subsystem,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, tick, subsystem, event_type, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC"
        )?;
        let entries = stmt.query_map(params![run_id, tick as i64], |row| {
            Ok(EventLogEntry {
                id:         Some(row.get(0)?),
                run_id:     row.get(1)?,
                tick:       row.get::<_, i64>(2)? as u64,
                subsystem:  row.get(3)?,
                event_type: row.get(4)?,
                payload:    row.get(5)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, event_type: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Dataset ────────────────────────────────────────────────

    /// Write rows, aggregates and monthly counts in one transaction.
    pub fn save_dataset(&self, run_id: &str, dataset: &SimulationDataset) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut insert_row = tx.prepare(
                "INSERT INTO observation (
                    run_id, consumer_id, age, gender, income, informative_perception,
                    mailing_frequency, timespan, product_purchase, prior_email_opening,
                    device, email_id, subject_length, information_value, personalization,
                    sending_day, sim_date, opened
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            )?;
            for r in &dataset.rows {
                insert_row.execute(params![
                    run_id,
                    r.consumer_id,
                    r.age,
                    enum_label(&r.gender)?,
                    r.income,
                    r.informative_perception,
                    r.mailing_frequency,
                    r.timespan,
                    r.product_purchase,
                    r.prior_email_opening,
                    enum_label(&r.device)?,
                    r.email_id,
                    r.subject_length,
                    r.information_value,
                    r.personalization.label(),
                    &r.sending_day,
                    r.date.to_string(),
                    r.opened,
                ])?;
            }

            let mut insert_daily = tx.prepare(
                "INSERT INTO daily_aggregate (run_id, sim_date, average_open_rate, average_timespan)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for d in &dataset.daily_aggregates {
                insert_daily.execute(params![
                    run_id,
                    d.date.to_string(),
                    d.average_open_rate,
                    d.average_timespan
                ])?;
            }

            let mut insert_month = tx.prepare(
                "INSERT INTO monthly_count (run_id, year_month, mailings, purchases)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (month, mailings) in &dataset.mailings_per_month {
                let purchases = dataset.purchases_per_month.get(month).copied().unwrap_or(0);
                insert_month.execute(params![run_id, month, mailings, purchases])?;
            }
        }
        tx.commit()?;
        log::info!(
            "store: saved {} observations for run {run_id}",
            dataset.rows.len()
        );
        Ok(())
    }

    pub fn observation_count(&self, run_id: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM observation WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn open_count(&self, run_id: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM observation WHERE run_id = ?1 AND opened = 1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// (year_month, mailings, purchases) in month order.
    pub fn monthly_counts(&self, run_id: &str) -> SimResult<Vec<(String, u32, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT year_month, mailings, purchases FROM monthly_count
             WHERE run_id = ?1 ORDER BY year_month ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// snake_case label of a unit enum, as serde writes it.
fn enum_label<T: serde::Serialize>(value: &T) -> SimResult<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}
