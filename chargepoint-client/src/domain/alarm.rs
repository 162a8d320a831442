use serde::{Deserialize, Serialize};

/// One station alarm, as persisted in the alarm ledger.
///
/// Field order is the ledger column order. The ledger is kept sorted
/// ascending by `alarm_ts`, which also serves as the dedup key.
/// `session_id` is attached by correlation after fetch; it stays an empty
/// string when no session was active at the alarm instant. Older ledgers
/// written before correlation existed lack the column, so it is defaulted
/// on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRow {
    pub station_id: String,
    pub station_name: String,
    pub model: String,
    pub org_id: String,
    pub port_no: f32,
    pub alarm_type: String,
    pub alarm_ts: i64,
    pub alarm_dt: String,
    #[serde(default)]
    pub session_id: String,
}
