//! SQLite roster provider.
//!
//! RULE: Only store.rs talks to the database.
//! Rows are handed out as read-only snapshots; dates stay TEXT exactly as
//! received so malformed values reach the engine and get reported there.
//! Computed status is never written back.

use crate::{
    config::EngineConfig,
    error::{BillingError, BillingResult},
    subscriber::{DateField, RosterRecord, Subscriber, ISO_DATE},
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SUBSCRIBER_COLUMNS: &str =
    "subscriber_id, tenant_id, name, status, enrollment_date, last_payment_date,
     monthly_fee, program, instructor";

pub struct RosterStore {
    conn: Connection,
}

impl RosterStore {
    /// Open (or create) the roster database at `path`.
    pub fn open(path: &str) -> BillingResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> BillingResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> BillingResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_roster.sql"))?;
        Ok(())
    }

    // ── Writes ─────────────────────────────────────────────────

    pub fn insert_subscriber(&self, s: &Subscriber) -> BillingResult<()> {
        let status = if s.active { "active" } else { "withdrawn" };
        let enrollment: Option<String> = s.enrollment_date.clone().into();
        let last_payment: Option<String> = s.last_payment_date.clone().into();
        self.insert_row(
            &s.tenant_id, &s.id, s.name.as_deref(), status,
            enrollment.as_deref(), last_payment.as_deref(),
            s.monthly_fee, s.program.as_deref(), s.instructor.as_deref(),
        )
    }

    /// Insert a provider row verbatim, keeping its status string.
    pub fn insert_record(&self, r: &RosterRecord) -> BillingResult<()> {
        self.insert_row(
            &r.tenant_id, &r.id, r.name.as_deref(), &r.status,
            r.enrollment_date.as_deref(), r.last_payment_date.as_deref(),
            r.monthly_fee, r.program.as_deref(), r.instructor.as_deref(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_row(
        &self,
        tenant_id: &str,
        subscriber_id: &str,
        name: Option<&str>,
        status: &str,
        enrollment_date: Option<&str>,
        last_payment_date: Option<&str>,
        monthly_fee: f64,
        program: Option<&str>,
        instructor: Option<&str>,
    ) -> BillingResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO tenant (tenant_id) VALUES (?1)",
            params![tenant_id],
        )?;
        self.conn.execute(
            "INSERT INTO subscriber (
                tenant_id, subscriber_id, name, status, enrollment_date,
                last_payment_date, monthly_fee, program, instructor
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                tenant_id,
                subscriber_id,
                name,
                status,
                enrollment_date,
                last_payment_date,
                monthly_fee,
                program,
                instructor,
            ],
        )?;
        Ok(())
    }

    /// Record a payment. The stored last-payment date only moves forward;
    /// a missing or unparseable stored value is always replaced.
    /// Returns whether the stored date changed.
    pub fn record_payment(
        &self,
        tenant_id: &str,
        subscriber_id: &str,
        paid_on: NaiveDate,
    ) -> BillingResult<bool> {
        let stored: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT last_payment_date FROM subscriber
                 WHERE tenant_id = ?1 AND subscriber_id = ?2",
                params![tenant_id, subscriber_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            return Err(BillingError::SubscriberNotFound {
                tenant_id:     tenant_id.to_string(),
                subscriber_id: subscriber_id.to_string(),
            });
        };
        if let DateField::Valid(previous) = DateField::from(stored) {
            if previous >= paid_on {
                log::debug!("Ignoring payment {paid_on} for {subscriber_id}: already paid {previous}");
                return Ok(false);
            }
        }
        self.conn.execute(
            "UPDATE subscriber SET last_payment_date = ?3
             WHERE tenant_id = ?1 AND subscriber_id = ?2",
            params![tenant_id, subscriber_id, paid_on.format(ISO_DATE).to_string()],
        )?;
        Ok(true)
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn tenants(&self) -> BillingResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tenant_id FROM tenant ORDER BY tenant_id ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn subscribers_for_tenant(
        &self,
        tenant_id: &str,
        config: &EngineConfig,
    ) -> BillingResult<Vec<Subscriber>> {
        let sql = format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscriber
             WHERE tenant_id = ?1 ORDER BY subscriber_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![tenant_id], record_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records.into_iter().map(|r| r.into_subscriber(config)).collect())
    }

    pub fn subscriber(
        &self,
        tenant_id: &str,
        subscriber_id: &str,
        config: &EngineConfig,
    ) -> BillingResult<Subscriber> {
        let sql = format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscriber
             WHERE tenant_id = ?1 AND subscriber_id = ?2"
        );
        let record = self
            .conn
            .query_row(&sql, params![tenant_id, subscriber_id], record_from_row)
            .optional()?
            .ok_or_else(|| BillingError::SubscriberNotFound {
                tenant_id:     tenant_id.to_string(),
                subscriber_id: subscriber_id.to_string(),
            })?;
        Ok(record.into_subscriber(config))
    }

    pub fn subscriber_count(&self, tenant_id: &str) -> BillingResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM subscriber WHERE tenant_id = ?1",
            params![tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<RosterRecord> {
    Ok(RosterRecord {
        id:                row.get(0)?,
        tenant_id:         row.get(1)?,
        name:              row.get(2)?,
        status:            row.get(3)?,
        enrollment_date:   row.get(4)?,
        last_payment_date: row.get(5)?,
        monthly_fee:       row.get(6)?,
        program:           row.get(7)?,
        instructor:        row.get(8)?,
    })
}
