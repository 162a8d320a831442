//! Incremental merge engine and the per-entity worker loops.
//!
//! Every entity kind follows the same cycle: load the persisted ledger,
//! compute the resume point from its last row, fetch and normalize the
//! delta, dedup-merge old-before-new, and atomically replace the file.
//! Workers run the cycle on a fixed interval and are isolated from each
//! other: one terminating never takes a sibling down.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::watch;

use chargepoint_client::api::{ApiError, ChargePointApi};
use chargepoint_client::domain::{AlarmRow, SessionRow};

use crate::anomaly;
use crate::config::WorkerConfig;
use crate::correlate;
use crate::sinks::CsvLedger;
use crate::sources::{fetch_alarms, fetch_sessions, fetch_stations};
use crate::transform;

#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// The remote call failed; the cycle can be retried as-is.
    #[error("api error: {0}")]
    Api(String),
    /// Upstream or stored data did not have the expected shape; retrying
    /// the same cycle would fail the same way.
    #[error("normalize error: {0}")]
    Normalize(String),
    /// The ledger could not be read or atomically replaced.
    #[error("persist error: {0}")]
    Persist(String),
}

impl From<ApiError> for SyncError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Transport(msg) => SyncError::Api(msg),
            ApiError::Decode(msg) => SyncError::Normalize(msg),
        }
    }
}

/// Worker cadence and retry policy, lifted out of the config section.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl From<&WorkerConfig> for Schedule {
    fn from(cfg: &WorkerConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(cfg.update_freq_secs),
            max_retries: cfg.max_retries,
            retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
        }
    }
}

/// Concatenate old rows before fresh rows and keep the first occurrence of
/// every key: a re-fetched duplicate never displaces the persisted row.
pub fn merge_rows<T, K, F>(old: Vec<T>, fresh: Vec<T>, mut key: F) -> Vec<T>
where
    F: FnMut(&T) -> K,
    K: Hash + Eq,
{
    let mut seen = HashSet::new();
    old.into_iter()
        .chain(fresh)
        .filter(|row| seen.insert(key(row)))
        .collect()
}

/// Where the next session fetch starts: one second past the last persisted
/// session's end. `None` means the ledger is empty and the caller should
/// query the full epoch range.
pub fn session_resume(rows: &[SessionRow]) -> Result<Option<DateTime<Utc>>, SyncError> {
    let Some(last) = rows.last() else {
        return Ok(None);
    };

    let end = last.end_secs().ok_or_else(|| {
        SyncError::Normalize(format!(
            "session ledger end_ts '{}' is not epoch seconds",
            last.end_ts
        ))
    })?;

    Utc.timestamp_opt(end + 1, 0)
        .single()
        .map(Some)
        .ok_or_else(|| SyncError::Normalize(format!("session resume point {end} out of range")))
}

/// Where the next alarm fetch starts: the last persisted alarm's own
/// timestamp. The boundary row comes back in the delta and the merge drops
/// it again, so greater-or-equal semantics lose nothing.
pub fn alarm_resume(rows: &[AlarmRow]) -> Result<Option<DateTime<Utc>>, SyncError> {
    let Some(last) = rows.last() else {
        return Ok(None);
    };

    Utc.timestamp_opt(last.alarm_ts, 0)
        .single()
        .map(Some)
        .ok_or_else(|| {
            SyncError::Normalize(format!("alarm resume point {} out of range", last.alarm_ts))
        })
}

/// One entity worker's cycle body. Implementations must be safe to re-run
/// verbatim after a failure: a cycle re-loads all state it needs.
#[async_trait]
pub trait SyncTask: Send + Sync {
    fn entity(&self) -> &'static str;

    async fn run_cycle(&self) -> Result<(), SyncError>;
}

pub struct SessionSync {
    api: Arc<dyn ChargePointApi>,
    ledger: CsvLedger,
    report: CsvLedger,
}

impl SessionSync {
    pub fn new(api: Arc<dyn ChargePointApi>, ledger: CsvLedger, report: CsvLedger) -> Self {
        Self { api, ledger, report }
    }
}

#[async_trait]
impl SyncTask for SessionSync {
    fn entity(&self) -> &'static str {
        "session"
    }

    async fn run_cycle(&self) -> Result<(), SyncError> {
        let now = Utc::now();
        let old = self.ledger.load::<SessionRow>()?;
        let old_len = old.len();

        let raw = match session_resume(&old)? {
            Some(from) => {
                tracing::info!(
                    path = %self.ledger.path().display(),
                    resume = %from,
                    "historical session data found"
                );
                fetch_sessions(self.api.as_ref(), from, None).await?
            }
            None => {
                tracing::info!(until = %now, "session ledger missing, querying from epoch");
                fetch_sessions(self.api.as_ref(), DateTime::<Utc>::UNIX_EPOCH, Some(now)).await?
            }
        };

        let fresh = transform::normalize_sessions(&raw);
        let merged = merge_rows(old, fresh, |r| r.session_id.clone());

        self.ledger.replace(&merged)?;
        if merged.len() == old_len {
            tracing::info!("no new session data");
        } else {
            metrics::counter!("sync_rows_merged_total", "entity" => "session")
                .increment((merged.len() - old_len) as u64);
            tracing::info!(old_size = old_len, new_size = merged.len(), "session ledger merged");
        }

        let report = anomaly::scan(&merged)?;
        self.report.replace(&report)?;
        tracing::info!(flags = report.len(), "anomaly report rewritten");

        Ok(())
    }
}

pub struct StationSync {
    api: Arc<dyn ChargePointApi>,
    ledger: CsvLedger,
}

impl StationSync {
    pub fn new(api: Arc<dyn ChargePointApi>, ledger: CsvLedger) -> Self {
        Self { api, ledger }
    }
}

#[async_trait]
impl SyncTask for StationSync {
    fn entity(&self) -> &'static str {
        "station"
    }

    /// The station listing is a full snapshot with no cursor, so the cycle
    /// overwrites rather than merges.
    async fn run_cycle(&self) -> Result<(), SyncError> {
        let raw = fetch_stations(self.api.as_ref()).await?;
        let rows = transform::normalize_stations(&raw)?;

        self.ledger.replace(&rows)?;
        tracing::info!(rows = rows.len(), "station snapshot written");
        Ok(())
    }
}

pub struct AlarmSync {
    api: Arc<dyn ChargePointApi>,
    ledger: CsvLedger,
    session_ledger: CsvLedger,
}

impl AlarmSync {
    pub fn new(api: Arc<dyn ChargePointApi>, ledger: CsvLedger, session_ledger: CsvLedger) -> Self {
        Self {
            api,
            ledger,
            session_ledger,
        }
    }
}

#[async_trait]
impl SyncTask for AlarmSync {
    fn entity(&self) -> &'static str {
        "alarm"
    }

    async fn run_cycle(&self) -> Result<(), SyncError> {
        let now = Utc::now();
        let old = self.ledger.load::<AlarmRow>()?;
        let old_len = old.len();

        let start = match alarm_resume(&old)? {
            Some(ts) => {
                tracing::info!(
                    path = %self.ledger.path().display(),
                    resume = %ts,
                    "historical alarm data found"
                );
                ts
            }
            None => {
                tracing::info!(until = %now, "alarm ledger missing, querying from epoch");
                DateTime::<Utc>::UNIX_EPOCH
            }
        };

        let raw = fetch_alarms(self.api.as_ref(), start, now).await?;
        let fresh = transform::normalize_alarms(&raw);

        // Only the delta is correlated; rows already in the ledger keep the
        // session id they were assigned when first seen.
        let sessions = self.session_ledger.load::<SessionRow>()?;
        let fresh = correlate::attach_session_ids(fresh, &sessions);

        // The ledger's historical identity for an alarm is its timestamp
        // alone; two stations alarming in the same second would collide.
        // TODO: widening the key to (station_id, port_no, alarm_ts) needs a
        // one-off migration of existing ledgers first.
        let mut merged = merge_rows(old, fresh, |r| r.alarm_ts);
        merged.sort_by_key(|r| r.alarm_ts);

        self.ledger.replace(&merged)?;
        if merged.len() == old_len {
            tracing::info!("no new alarm data");
        } else {
            metrics::counter!("sync_rows_merged_total", "entity" => "alarm")
                .increment((merged.len() - old_len) as u64);
            tracing::info!(old_size = old_len, new_size = merged.len(), "alarm ledger merged");
        }

        Ok(())
    }
}

async fn cycle_with_retry(
    task: &dyn SyncTask,
    entity: &'static str,
    schedule: &Schedule,
) -> Result<(), SyncError> {
    let mut attempt: u32 = 0;
    loop {
        match task.run_cycle().await {
            Ok(()) => return Ok(()),
            // Data-shape failures repeat identically; never retried.
            Err(e @ SyncError::Normalize(_)) => return Err(e),
            Err(e) if attempt < schedule.max_retries => {
                attempt += 1;
                let sleep_for = schedule.retry_backoff * attempt;
                tracing::warn!(entity, error = %e, attempt, "cycle failed, retrying with backoff");
                tokio::time::sleep(sleep_for).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Drive one entity worker until shutdown or a fatal error.
///
/// Error policy by category: data-shape failures abort only the current
/// cycle (the prior ledger stays in place and the schedule continues);
/// transport and persistence failures are retried with linear backoff and
/// then terminate this worker only.
pub async fn run_worker(
    task: Arc<dyn SyncTask>,
    schedule: Schedule,
    mut shutdown: watch::Receiver<bool>,
) {
    let entity = task.entity();
    tracing::info!(
        entity,
        interval_secs = schedule.poll_interval.as_secs(),
        "sync worker started"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        match cycle_with_retry(task.as_ref(), entity, &schedule).await {
            Ok(()) => {}
            Err(e @ SyncError::Normalize(_)) => {
                metrics::counter!("sync_cycle_failures_total", "entity" => entity).increment(1);
                tracing::error!(entity, error = %e, "cycle aborted, ledger preserved");
            }
            Err(e) => {
                metrics::counter!("sync_worker_terminations_total", "entity" => entity)
                    .increment(1);
                tracing::error!(entity, error = %e, "sync worker terminating");
                return;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(schedule.poll_interval) => {}
            _ = shutdown.changed() => {}
        }
    }

    tracing::info!(entity, "sync worker stopped");
}
