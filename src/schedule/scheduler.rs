use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::store::SqliteScheduleStore;
use super::{Frequency, NewRecurringPayment, RecurringPayment, ScheduleError};
use crate::assets::AssetRegistry;
use crate::payment::ExecutionOutcome;
use crate::payment::orchestrator::PaymentRunner;

/// Result of one executed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRun {
    pub payment_id: String,
    pub outcome: ExecutionOutcome,
    pub next_due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub runs: Vec<PaymentRun>,
    /// Due records left alone because a previous run is still in flight.
    pub skipped: Vec<String>,
    /// Records whose run could not be loaded or recorded.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub account_id: String,
    pub total_payments: u32,
    pub active_payments: u32,
    pub in_flight: u32,
    pub last_tick_at: Option<DateTime<Utc>>,
}

/// Owns every recurring payment and runs the due ones through a
/// [`PaymentRunner`].
///
/// Ticks never overlap, and within a tick due payments run one at a time. A
/// record already in flight, for example through [`Scheduler::execute_now`],
/// is skipped by the tick rather than waited on.
pub struct Scheduler {
    store: Mutex<SqliteScheduleStore>,
    runner: Arc<dyn PaymentRunner>,
    registry: Arc<AssetRegistry>,
    in_flight: Mutex<HashSet<String>>,
    last_tick_at: Mutex<Option<DateTime<Utc>>>,
    tick_lock: tokio::sync::Mutex<()>,
}

impl Scheduler {
    /// Scheduler backed by an in-memory store.
    pub fn new(runner: Arc<dyn PaymentRunner>, registry: Arc<AssetRegistry>) -> Result<Self> {
        Ok(Self::with_store(
            SqliteScheduleStore::open_in_memory()?,
            runner,
            registry,
        ))
    }

    pub fn open(
        path: PathBuf,
        runner: Arc<dyn PaymentRunner>,
        registry: Arc<AssetRegistry>,
    ) -> Result<Self> {
        Ok(Self::with_store(
            SqliteScheduleStore::open(path)?,
            runner,
            registry,
        ))
    }

    pub fn with_store(
        store: SqliteScheduleStore,
        runner: Arc<dyn PaymentRunner>,
        registry: Arc<AssetRegistry>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            runner,
            registry,
            in_flight: Mutex::new(HashSet::new()),
            last_tick_at: Mutex::new(None),
            tick_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn add(
        &self,
        def: NewRecurringPayment,
        now: DateTime<Utc>,
    ) -> Result<RecurringPayment, ScheduleError> {
        if def.amount == 0 {
            return Err(ScheduleError::InvalidDefinition(
                "amount must be greater than zero".to_string(),
            ));
        }
        if def.recipient.trim().is_empty() {
            return Err(ScheduleError::InvalidDefinition(
                "recipient is required".to_string(),
            ));
        }
        let destination_asset = self
            .registry
            .resolve_route(&def.token, &def.chain)?
            .clone();
        self.registry.lookup(&def.origin_asset)?;

        let record = RecurringPayment {
            id: uuid::Uuid::new_v4().to_string(),
            recipient: def.recipient.trim().to_string(),
            amount: def.amount,
            origin_asset: def.origin_asset,
            destination_asset,
            token: def.token,
            chain: def.chain,
            frequency: def.frequency,
            anchor_at: now,
            next_due_at: def.frequency.first_due(now),
            active: true,
            last_outcome: None,
            last_run_at: None,
            created_at: now,
        };

        self.store
            .lock()
            .expect("store mutex poisoned")
            .insert_payment(&record)?;

        tracing::info!(
            payment_id = %record.id,
            frequency = record.frequency.as_str(),
            next_due_at = %record.next_due_at,
            "recurring payment added"
        );
        Ok(record)
    }

    /// Deactivates a payment. Cancelling an inactive payment is a no-op. A run
    /// already in flight is left to finish.
    pub fn cancel(&self, id: &str) -> Result<RecurringPayment, ScheduleError> {
        let mut store = self.store.lock().expect("store mutex poisoned");
        let mut record = store
            .get_payment(id)?
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        if record.active {
            store.set_active(id, false)?;
            record.active = false;
            tracing::info!(payment_id = id, "recurring payment cancelled");
        }
        Ok(record)
    }

    /// Switches an active payment to a new frequency, anchored at `now`.
    pub fn update_frequency(
        &self,
        id: &str,
        frequency: Frequency,
        now: DateTime<Utc>,
    ) -> Result<RecurringPayment, ScheduleError> {
        let mut store = self.store.lock().expect("store mutex poisoned");
        let mut record = store
            .get_payment(id)?
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        if !record.active {
            return Err(ScheduleError::Inactive(id.to_string()));
        }

        let next_due_at = frequency.first_due(now);
        store.update_schedule(id, frequency, now, next_due_at)?;
        record.frequency = frequency;
        record.anchor_at = now;
        record.next_due_at = next_due_at;

        tracing::info!(
            payment_id = id,
            frequency = frequency.as_str(),
            next_due_at = %next_due_at,
            "recurring payment frequency updated"
        );
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<RecurringPayment, ScheduleError> {
        self.store
            .lock()
            .expect("store mutex poisoned")
            .get_payment(id)?
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<RecurringPayment>, ScheduleError> {
        let mut records = self
            .store
            .lock()
            .expect("store mutex poisoned")
            .list_payments()?;
        if active_only {
            records.retain(|r| r.active);
        }
        Ok(records)
    }

    /// Runs every active payment due at `now`, one after another. A failing
    /// record never stops the remaining ones from running.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let _tick = self.tick_lock.lock().await;
        *self.last_tick_at.lock().expect("tick mutex poisoned") = Some(now);

        let mut report = TickReport::default();
        let due = match self.store.lock().expect("store mutex poisoned").list_due(now) {
            Ok(due) => due,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "list due payments failed");
                return report;
            }
        };

        for candidate in due {
            let id = candidate.id;

            // Re-read: a cancel may have landed while earlier records ran.
            let record = match self.store.lock().expect("store mutex poisoned").get_payment(&id) {
                Ok(Some(record)) if record.is_due(now) => record,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(payment_id = %id, error = %format!("{err:#}"), "load payment failed");
                    report.errors.push(id);
                    continue;
                }
            };

            if !self.begin(&id) {
                tracing::debug!(payment_id = %id, "payment still in flight; skipping");
                report.skipped.push(id);
                continue;
            }
            let outcome = self.run_isolated(&record).await;
            self.finish(&id);

            let next_due_at = match self.advance(&record, &outcome, now) {
                Ok(next_due_at) => next_due_at,
                Err(err) => {
                    tracing::warn!(payment_id = %id, error = %format!("{err:#}"), "record run failed");
                    report.errors.push(id);
                    continue;
                }
            };

            tracing::info!(
                payment_id = %id,
                outcome = outcome.kind(),
                next_due_at = %next_due_at,
                "scheduled payment run finished"
            );
            report.runs.push(PaymentRun {
                payment_id: id,
                outcome,
                next_due_at,
            });
        }
        report
    }

    /// Runs one payment immediately, outside its schedule. `next_due_at` is
    /// left as it was.
    pub async fn execute_now(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<(RecurringPayment, ExecutionOutcome), ScheduleError> {
        let record = self.get(id)?;
        if !record.active {
            return Err(ScheduleError::Inactive(id.to_string()));
        }
        if !self.begin(id) {
            return Err(ScheduleError::AlreadyRunning(id.to_string()));
        }

        let outcome = self.run_isolated(&record).await;
        self.finish(id);

        self.store
            .lock()
            .expect("store mutex poisoned")
            .record_run(id, &outcome, now, None)?;
        tracing::info!(payment_id = id, outcome = outcome.kind(), "manual payment run finished");

        let record = self.get(id)?;
        Ok((record, outcome))
    }

    pub fn status(&self) -> Result<SchedulerStatus, ScheduleError> {
        let records = self.list(false)?;
        let active = records.iter().filter(|r| r.active).count();
        let in_flight = self.in_flight.lock().expect("in-flight mutex poisoned").len();

        Ok(SchedulerStatus {
            account_id: self.runner.account_id().to_string(),
            total_payments: u32::try_from(records.len()).unwrap_or(u32::MAX),
            active_payments: u32::try_from(active).unwrap_or(u32::MAX),
            in_flight: u32::try_from(in_flight).unwrap_or(u32::MAX),
            last_tick_at: *self.last_tick_at.lock().expect("tick mutex poisoned"),
        })
    }

    /// Ticks every `every` until the returned handle is aborted.
    pub fn spawn_driver(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let report = scheduler.tick(Utc::now()).await;
                if !report.runs.is_empty() || !report.errors.is_empty() {
                    tracing::info!(
                        runs = report.runs.len(),
                        skipped = report.skipped.len(),
                        errors = report.errors.len(),
                        "tick finished"
                    );
                }
                tokio::time::sleep(every).await;
            }
        })
    }

    /// Records a scheduled run and returns the stored `next_due_at`. The row
    /// is re-read under the store lock: when the schedule was changed while
    /// the run was in flight, the new schedule stands.
    fn advance(
        &self,
        before: &RecurringPayment,
        outcome: &ExecutionOutcome,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let mut store = self.store.lock().expect("store mutex poisoned");
        let current = store
            .get_payment(&before.id)?
            .with_context(|| format!("payment not found: {}", before.id))?;

        let unchanged = current.frequency == before.frequency
            && current.anchor_at == before.anchor_at
            && current.next_due_at == before.next_due_at;
        if !unchanged {
            tracing::info!(
                payment_id = %before.id,
                frequency = current.frequency.as_str(),
                "schedule changed during run; keeping updated due time"
            );
            store.record_run(&before.id, outcome, now, None)?;
            return Ok(current.next_due_at);
        }

        let next_due_at = before
            .frequency
            .next_due(before.anchor_at, before.next_due_at, now);
        store.record_run(&before.id, outcome, now, Some(next_due_at))?;
        Ok(next_due_at)
    }

    fn begin(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .insert(id.to_string())
    }

    fn finish(&self, id: &str) {
        self.in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .remove(id);
    }

    // The run gets its own task so a panic inside the runner turns into a
    // Failed outcome for this record only.
    async fn run_isolated(&self, record: &RecurringPayment) -> ExecutionOutcome {
        let runner = Arc::clone(&self.runner);
        let request = record.payment_request();
        let handle = tokio::spawn(async move { runner.run(&request).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => {
                tracing::error!(payment_id = %record.id, "payment run panicked");
                ExecutionOutcome::failed("payment run panicked")
            }
            Err(err) => ExecutionOutcome::failed(format!("payment run aborted: {err}")),
        }
    }
}
