use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension as _, Row, params};

use super::{Frequency, RecurringPayment};
use crate::assets::AssetId;
use crate::payment::ExecutionOutcome;

const SELECT_PAYMENT: &str = r#"
SELECT
  id,
  recipient,
  amount,
  origin_asset,
  destination_asset,
  token,
  chain,
  frequency,
  anchor_at,
  next_due_at,
  active,
  last_outcome,
  last_run_at,
  created_at
FROM recurring_payments
"#;

/// Recurring payment records. Rows are never deleted; cancellation only
/// clears `active`.
#[derive(Debug)]
pub struct SqliteScheduleStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteScheduleStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create schedule store dir {}", dir.display()))?;
        }

        let conn =
            Connection::open(&path).with_context(|| format!("open sqlite {}", path.display()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .context("set sqlite busy_timeout")?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .context("configure sqlite pragmas")?;

        migrate(&conn).context("migrate sqlite schema")?;

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite")?;
        migrate(&conn).context("migrate sqlite schema")?;
        Ok(Self { conn, path: None })
    }

    /// `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn insert_payment(&mut self, record: &RecurringPayment) -> Result<()> {
        let last_outcome = record
            .last_outcome
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("encode last_outcome")?;

        self.conn
            .execute(
                r#"
INSERT INTO recurring_payments (
  id,
  recipient,
  amount,
  origin_asset,
  destination_asset,
  token,
  chain,
  frequency,
  anchor_at,
  next_due_at,
  active,
  last_outcome,
  last_run_at,
  created_at
) VALUES (
  ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14
)
"#,
                params![
                    &record.id,
                    &record.recipient,
                    record.amount.to_string(),
                    record.origin_asset.as_str(),
                    record.destination_asset.as_str(),
                    &record.token,
                    &record.chain,
                    record.frequency.as_str(),
                    time_to_str(record.anchor_at),
                    time_to_str(record.next_due_at),
                    record.active,
                    last_outcome,
                    record.last_run_at.map(time_to_str),
                    time_to_str(record.created_at),
                ],
            )
            .with_context(|| format!("insert payment {}", record.id))?;
        Ok(())
    }

    pub fn get_payment(&self, id: &str) -> Result<Option<RecurringPayment>> {
        self.conn
            .query_row(
                &format!("{SELECT_PAYMENT} WHERE id = ?1"),
                params![id],
                payment_from_row,
            )
            .optional()
            .with_context(|| format!("get payment {id}"))
    }

    pub fn list_payments(&self) -> Result<Vec<RecurringPayment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_PAYMENT} ORDER BY created_at, id"))
            .context("prepare list payments")?;

        let rows = stmt
            .query_map([], payment_from_row)
            .context("query list payments")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read payment row")?);
        }
        Ok(out)
    }

    /// Active payments with `next_due_at <= now`, earliest first.
    pub fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<RecurringPayment>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{SELECT_PAYMENT} WHERE active = 1 AND next_due_at <= ?1 ORDER BY next_due_at, id"
            ))
            .context("prepare list due payments")?;

        let rows = stmt
            .query_map(params![time_to_str(now)], payment_from_row)
            .context("query list due payments")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read payment row")?);
        }
        Ok(out)
    }

    /// Stores the outcome of a run. `next_due_at` is left untouched when
    /// `None`.
    pub fn record_run(
        &mut self,
        id: &str,
        outcome: &ExecutionOutcome,
        run_at: DateTime<Utc>,
        next_due_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let outcome = serde_json::to_string(outcome).context("encode outcome")?;
        let rows = self
            .conn
            .execute(
                r#"
UPDATE recurring_payments
SET last_outcome = ?2,
    last_run_at = ?3,
    next_due_at = COALESCE(?4, next_due_at)
WHERE id = ?1
"#,
                params![id, outcome, time_to_str(run_at), next_due_at.map(time_to_str)],
            )
            .with_context(|| format!("record run {id}"))?;
        anyhow::ensure!(rows == 1, "payment not found: {id}");
        Ok(())
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE recurring_payments SET active = ?2 WHERE id = ?1",
                params![id, active],
            )
            .with_context(|| format!("update payment active {id}"))?;
        anyhow::ensure!(rows == 1, "payment not found: {id}");
        Ok(())
    }

    pub fn update_schedule(
        &mut self,
        id: &str,
        frequency: Frequency,
        anchor_at: DateTime<Utc>,
        next_due_at: DateTime<Utc>,
    ) -> Result<()> {
        let rows = self
            .conn
            .execute(
                r#"
UPDATE recurring_payments
SET frequency = ?2,
    anchor_at = ?3,
    next_due_at = ?4
WHERE id = ?1
"#,
                params![
                    id,
                    frequency.as_str(),
                    time_to_str(anchor_at),
                    time_to_str(next_due_at)
                ],
            )
            .with_context(|| format!("update payment schedule {id}"))?;
        anyhow::ensure!(rows == 1, "payment not found: {id}");
        Ok(())
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS recurring_payments (
  id TEXT PRIMARY KEY,
  recipient TEXT NOT NULL,
  amount TEXT NOT NULL,
  origin_asset TEXT NOT NULL,
  destination_asset TEXT NOT NULL,
  token TEXT NOT NULL,
  chain TEXT NOT NULL,
  frequency TEXT NOT NULL,
  anchor_at TEXT NOT NULL,
  next_due_at TEXT NOT NULL,
  active INTEGER NOT NULL,
  last_outcome TEXT,
  last_run_at TEXT,
  created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS recurring_payments_due_idx
  ON recurring_payments(active, next_due_at);
"#,
    )
    .context("create tables")?;
    Ok(())
}

fn payment_from_row(row: &Row<'_>) -> rusqlite::Result<RecurringPayment> {
    let amount: String = row.get(2)?;
    let frequency: String = row.get(7)?;
    let last_outcome: Option<String> = row.get(11)?;
    let last_run_at: Option<String> = row.get(12)?;

    Ok(RecurringPayment {
        id: row.get(0)?,
        recipient: row.get(1)?,
        amount: amount.parse::<u128>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("invalid amount {amount}").into(),
            )
        })?,
        origin_asset: AssetId::new(row.get::<_, String>(3)?),
        destination_asset: AssetId::new(row.get::<_, String>(4)?),
        token: row.get(5)?,
        chain: row.get(6)?,
        frequency: frequency_from_str(&frequency, 7)?,
        anchor_at: time_from_str(&row.get::<_, String>(8)?, 8)?,
        next_due_at: time_from_str(&row.get::<_, String>(9)?, 9)?,
        active: row.get(10)?,
        last_outcome: last_outcome
            .map(|s| {
                serde_json::from_str::<ExecutionOutcome>(&s).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        11,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?,
        last_run_at: last_run_at.map(|s| time_from_str(&s, 12)).transpose()?,
        created_at: time_from_str(&row.get::<_, String>(13)?, 13)?,
    })
}

// Fixed-width UTC text keeps lexical order equal to time order, which the
// due query relies on.
fn time_to_str(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn time_from_str(s: &str, col: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn frequency_from_str(s: &str, col: usize) -> rusqlite::Result<Frequency> {
    match s {
        "every_five_minutes" => Ok(Frequency::EveryFiveMinutes),
        "weekly" => Ok(Frequency::Weekly),
        "monthly" => Ok(Frequency::Monthly),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            col,
            rusqlite::types::Type::Text,
            format!("unknown frequency: {other}").into(),
        )),
    }
}
