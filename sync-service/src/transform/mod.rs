//! Field normalization: raw listing records to ledger rows.
//!
//! Three concerns live here: de-identification (raw ids through the privacy
//! digest), timestamp dual-encoding (UTC epoch seconds as a string plus the
//! same instant rendered in the local reporting timezone), and reshaping
//! (per-port expansion of station records, list folding, numeric
//! narrowing). Output field order is the ledger column order, so any change
//! here is a downstream schema change.

use chrono::{DateTime, Utc};
use chrono_tz::America::Vancouver;

use chargepoint_client::api::{RawAlarm, RawSession, RawStation};
use chargepoint_client::domain::{AlarmRow, SessionRow, StationRow};
use chargepoint_client::hash_id;

use crate::pipeline::SyncError;

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// UTC epoch seconds, rendered as the ledgers store them.
fn epoch_s(ts: &DateTime<Utc>) -> String {
    ts.timestamp().to_string()
}

/// The same instant in the local reporting timezone.
fn local_dt(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Vancouver).format(DT_FORMAT).to_string()
}

pub fn normalize_sessions(raw: &[RawSession]) -> Vec<SessionRow> {
    raw.iter()
        .map(|r| SessionRow {
            session_id: r.session_id.clone(),
            user_id: hash_id(&r.user_id),
            credential_id: hash_id(&r.credential_id),
            station_id: hash_id(&r.station_id),
            port_no: r.port_number,
            start_ts: epoch_s(&r.start_time),
            end_ts: epoch_s(&r.end_time),
            start_dt: local_dt(&r.start_time),
            end_dt: local_dt(&r.end_time),
            energy: r.energy,
            total_charging_duration: r.total_charging_duration.clone(),
            total_session_duration: r.total_session_duration.clone(),
            address: r.address.clone(),
        })
        .collect()
}

/// Expand each station into one row per physical port. Rows for the same
/// station share every non-port field; the per-connector breakdown on a
/// port is dropped. A station reporting no ports is malformed upstream
/// data and aborts the cycle.
pub fn normalize_stations(raw: &[RawStation]) -> Result<Vec<StationRow>, SyncError> {
    let mut rows = Vec::new();

    for station in raw {
        if station.ports.is_empty() {
            return Err(SyncError::Normalize(format!(
                "station {} has no port descriptors",
                station.station_id
            )));
        }

        let station_id = hash_id(&station.station_id);
        let org_id = hash_id(&station.org_id);
        let station_group = station.station_groups.join(";");
        let activation_dt = local_dt(&station.activation_date);

        for port in &station.ports {
            rows.push(StationRow {
                station_id: station_id.clone(),
                org_id: org_id.clone(),
                station_group: station_group.clone(),
                model: station.station_model.clone(),
                activation_dt: activation_dt.clone(),
                timezone_offset: station.timezone_offset.clone(),
                address: station.address.clone(),
                manufacturer: station.manufacturer.clone(),
                station_name: station.station_name.clone(),
                description: station.description.clone(),
                port_no: port.port_number,
                reservable: port.reservable,
                status: port.status.clone(),
                level: port.level.clone(),
                time_stamp: port.time_stamp.clone(),
                mode: port.mode.clone(),
                connector: port.connector.clone(),
                voltage: port.voltage,
                current: port.current,
                power: port.power,
                estimated_cost: port.estimated_cost,
                location_lat: port.geo.lat,
                location_long: port.geo.long,
            });
        }
    }

    Ok(rows)
}

/// Normalize alarms and return them sorted ascending by `alarm_ts`.
/// `session_id` stays empty here; correlation fills it in afterwards.
pub fn normalize_alarms(raw: &[RawAlarm]) -> Vec<AlarmRow> {
    let mut rows: Vec<AlarmRow> = raw
        .iter()
        .map(|r| AlarmRow {
            station_id: hash_id(&r.station_id),
            station_name: r.station_name.clone(),
            model: r.station_model.clone(),
            org_id: hash_id(&r.org_id),
            port_no: r.port_number,
            alarm_type: r.alarm_type.clone(),
            alarm_ts: r.alarm_time.timestamp(),
            alarm_dt: local_dt(&r.alarm_time),
            session_id: String::new(),
        })
        .collect();

    rows.sort_by_key(|r| r.alarm_ts);
    rows
}
