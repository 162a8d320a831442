use serde::{Deserialize, Serialize};

/// One anomaly flag in the scan report.
///
/// The report is derived from the session ledger and fully rewritten on
/// every scan, so rows carry no identity beyond the most recent pass.
/// `value` is a string because the rules emit mixed payloads (a duration
/// for the time-based rules, a number for the power rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRow {
    pub session_id: String,
    pub anomaly_description: String,
    pub value: String,
    pub unit: String,
}
