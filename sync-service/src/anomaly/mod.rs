//! Threshold anomaly rules over the session ledger.
//!
//! Stateless: every scan re-evaluates the full ledger and the report is
//! rewritten from scratch, so a rule change retroactively applies to all
//! history. A session can trigger several rules and then appears once per
//! rule.

use chargepoint_client::domain::{AnomalyRow, SessionRow};

use crate::pipeline::SyncError;

/// Plugged-in longer than a day.
const PLUGGED_IN_LIMIT_HOURS: f64 = 24.0;
/// Sustained average power beyond what an L2 port delivers.
const POWER_LIMIT_KW: f64 = 7.0;
/// Actively charging longer than half a day.
const CHARGING_LIMIT_HOURS: f64 = 12.0;
/// Below this the session is effectively instantaneous and average power
/// is meaningless, so the power rule is suppressed.
const MIN_DURATION_HOURS: f64 = 0.01;

pub fn scan(sessions: &[SessionRow]) -> Result<Vec<AnomalyRow>, SyncError> {
    let mut report = Vec::new();

    for row in sessions {
        let plugged_in_hours = duration_hours(&row.total_session_duration)?;
        if plugged_in_hours >= PLUGGED_IN_LIMIT_HOURS {
            report.push(AnomalyRow {
                session_id: row.session_id.clone(),
                anomaly_description: "User plugged in for longer than 24 hours".to_string(),
                value: row.total_session_duration.clone(),
                unit: "hh:mm:ss".to_string(),
            });
        }

        let power = average_power_kw(row)?;
        if power > POWER_LIMIT_KW {
            report.push(AnomalyRow {
                session_id: row.session_id.clone(),
                anomaly_description: "Charging power exceeds 7 kW".to_string(),
                value: power.to_string(),
                unit: "kW".to_string(),
            });
        }

        let charging_hours = duration_hours(&row.total_charging_duration)?;
        if charging_hours >= CHARGING_LIMIT_HOURS {
            report.push(AnomalyRow {
                session_id: row.session_id.clone(),
                anomaly_description: "User actively charging for longer than 12 hours".to_string(),
                value: row.total_charging_duration.clone(),
                unit: "hh:mm:ss".to_string(),
            });
        }
    }

    Ok(report)
}

/// Average power over the wall-clock session interval, from the epoch
/// bounds rather than the duration strings. Near-zero intervals report
/// zero power so a division blow-up can never fire the rule.
fn average_power_kw(row: &SessionRow) -> Result<f64, SyncError> {
    let (start, end) = match (row.start_secs(), row.end_secs()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(SyncError::Normalize(format!(
                "session {}: non-integer interval bounds '{}'..'{}'",
                row.session_id, row.start_ts, row.end_ts
            )))
        }
    };

    let hours = (end - start) as f64 / 3600.0;
    if hours < MIN_DURATION_HOURS {
        return Ok(0.0);
    }
    Ok(row.energy / hours)
}

/// Parse a `hh:mm:ss` duration into fractional hours. The hour field is a
/// running total and may exceed 24.
fn duration_hours(raw: &str) -> Result<f64, SyncError> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(SyncError::Normalize(format!("malformed duration '{raw}'")));
    }

    let field = |s: &str| -> Result<u64, SyncError> {
        s.parse()
            .map_err(|_| SyncError::Normalize(format!("malformed duration '{raw}'")))
    };

    let hours = field(parts[0])?;
    let minutes = field(parts[1])?;
    let seconds = field(parts[2])?;

    Ok(hours as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, start: i64, end: i64, energy: f64, charging: &str, plugged: &str) -> SessionRow {
        SessionRow {
            session_id: id.to_string(),
            user_id: "u".to_string(),
            credential_id: "c".to_string(),
            station_id: "s".to_string(),
            port_no: 1.0,
            start_ts: start.to_string(),
            end_ts: end.to_string(),
            start_dt: String::new(),
            end_dt: String::new(),
            energy,
            total_charging_duration: charging.to_string(),
            total_session_duration: plugged.to_string(),
            address: String::new(),
        }
    }

    #[test]
    fn plugged_in_rule_fires_at_exactly_24_hours() {
        let rows = vec![
            session("on-limit", 0, 86_400, 1.0, "00:30:00", "24:00:00"),
            session("under-limit", 0, 86_399, 1.0, "00:30:00", "23:59:59"),
        ];
        let report = scan(&rows).expect("scan should succeed");

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].session_id, "on-limit");
        assert_eq!(report[0].value, "24:00:00");
        assert_eq!(report[0].unit, "hh:mm:ss");
    }

    #[test]
    fn power_rule_uses_interval_bounds() {
        // 15 kWh over two hours: 7.5 kW average.
        let rows = vec![session("fast", 0, 7_200, 15.0, "01:30:00", "02:00:00")];
        let report = scan(&rows).expect("scan should succeed");

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].anomaly_description, "Charging power exceeds 7 kW");
        assert_eq!(report[0].value, "7.5");
        assert_eq!(report[0].unit, "kW");
    }

    #[test]
    fn near_zero_interval_suppresses_the_power_rule() {
        // 32 seconds is 0.0089 hours; huge energy must still read as 0 kW.
        let rows = vec![session("blip", 1_000, 1_032, 500.0, "00:00:30", "00:00:32")];
        let report = scan(&rows).expect("scan should succeed");
        assert!(report.is_empty());
    }

    #[test]
    fn charging_rule_fires_at_exactly_12_hours() {
        let rows = vec![
            session("long-charge", 0, 50_000, 1.0, "12:00:00", "13:53:20"),
            session("short-charge", 0, 50_000, 1.0, "11:59:59", "13:53:20"),
        ];
        let report = scan(&rows).expect("scan should succeed");

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].session_id, "long-charge");
        assert_eq!(
            report[0].anomaly_description,
            "User actively charging for longer than 12 hours"
        );
    }

    #[test]
    fn one_session_can_trigger_several_rules() {
        // 26 hours plugged in, 13 charging, 208 kWh over 26 h = 8 kW.
        let rows = vec![session("bad", 0, 93_600, 208.0, "13:00:00", "26:00:00")];
        let report = scan(&rows).expect("scan should succeed");

        let descriptions: Vec<_> = report.iter().map(|r| r.anomaly_description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "User plugged in for longer than 24 hours",
                "Charging power exceeds 7 kW",
                "User actively charging for longer than 12 hours",
            ]
        );
    }

    #[test]
    fn malformed_duration_is_a_data_error() {
        let rows = vec![session("broken", 0, 3_600, 1.0, "90 minutes", "01:00:00")];
        let err = scan(&rows).unwrap_err();
        assert!(matches!(err, SyncError::Normalize(_)));
    }
}
