use serde::{Deserialize, Serialize};

/// One charging session, as persisted in the session ledger.
///
/// Field order is the ledger column order. `session_id` is the natural key
/// and is globally unique within a ledger. `user_id`, `credential_id` and
/// `station_id` are privacy digests, not raw identifiers. `start_ts` /
/// `end_ts` hold integer UTC epoch seconds rendered as strings, with
/// `start_ts < end_ts`; `start_dt` / `end_dt` hold the same instants
/// formatted in the configured local timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub session_id: String,
    pub user_id: String,
    pub credential_id: String,
    pub station_id: String,
    pub port_no: f32,
    pub start_ts: String,
    pub end_ts: String,
    pub start_dt: String,
    pub end_dt: String,
    pub energy: f64,
    pub total_charging_duration: String,
    pub total_session_duration: String,
    pub address: String,
}

impl SessionRow {
    /// Session start as epoch seconds, if the stored string is well formed.
    pub fn start_secs(&self) -> Option<i64> {
        self.start_ts.trim().parse().ok()
    }

    /// Session end as epoch seconds, if the stored string is well formed.
    pub fn end_secs(&self) -> Option<i64> {
        self.end_ts.trim().parse().ok()
    }
}
