//! Alarm-to-session correlation.
//!
//! An alarm is attributed to the session that was active on the same
//! station and port when it fired. "Active" means the alarm instant falls
//! strictly inside the session interval: `start_ts < alarm_ts < end_ts`.
//! An alarm raised exactly at a session boundary matches neither side.

use chargepoint_client::domain::{AlarmRow, SessionRow};

/// Attach `session_id` to each alarm in the batch. Alarms with no active
/// session keep an empty id; this is expected, never an error. When either
/// input is empty the batch passes through untouched.
///
/// Should more than one session contain the alarm instant (not expected
/// from well-formed upstream data), the first match in session-ledger
/// order wins.
pub fn attach_session_ids(alarms: Vec<AlarmRow>, sessions: &[SessionRow]) -> Vec<AlarmRow> {
    if alarms.is_empty() || sessions.is_empty() {
        return alarms;
    }

    alarms
        .into_iter()
        .map(|mut alarm| {
            alarm.session_id = active_session(&alarm, sessions)
                .map(|s| s.session_id.clone())
                .unwrap_or_default();
            alarm
        })
        .collect()
}

fn active_session<'a>(alarm: &AlarmRow, sessions: &'a [SessionRow]) -> Option<&'a SessionRow> {
    sessions.iter().find(|s| {
        if s.station_id != alarm.station_id || s.port_no != alarm.port_no {
            return false;
        }
        match (s.start_secs(), s.end_secs()) {
            (Some(start), Some(end)) => start < alarm.alarm_ts && alarm.alarm_ts < end,
            // rows with unparseable bounds cannot contain anything
            _ => false,
        }
    })
}
