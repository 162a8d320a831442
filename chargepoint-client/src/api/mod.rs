//! Remote billing/telemetry API surface.
//!
//! Raw record shapes mirror the remote field names; normalization into the
//! ledger schemas happens in the sync service. Pagination is driven by the
//! caller: each listing call covers one page (`start_record` window) and
//! reports whether more pages remain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote call itself failed (connectivity, auth, non-success status).
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote answered but the payload did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Raw charging session record as returned by the remote listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSession {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(rename = "portNumber")]
    pub port_number: f32,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "Energy")]
    pub energy: f64,
    #[serde(rename = "totalChargingDuration")]
    pub total_charging_duration: String,
    #[serde(rename = "totalSessionDuration")]
    pub total_session_duration: String,
    #[serde(rename = "Address")]
    pub address: String,
}

/// Raw station alarm record as returned by the remote listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAlarm {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(rename = "stationName")]
    pub station_name: String,
    #[serde(rename = "stationModel")]
    pub station_model: String,
    #[serde(rename = "orgID")]
    pub org_id: String,
    #[serde(rename = "portNumber")]
    pub port_number: f32,
    #[serde(rename = "alarmType")]
    pub alarm_type: String,
    #[serde(rename = "alarmTime")]
    pub alarm_time: DateTime<Utc>,
}

/// Raw station record. Carries one descriptor per physical port; the
/// connector sub-list inside each port is not persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStation {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(rename = "orgID")]
    pub org_id: String,
    #[serde(rename = "sgID")]
    pub station_groups: Vec<String>,
    #[serde(rename = "stationModel")]
    pub station_model: String,
    #[serde(rename = "stationActivationDate")]
    pub activation_date: DateTime<Utc>,
    #[serde(rename = "timezoneOffset")]
    pub timezone_offset: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "stationManufacturer")]
    pub manufacturer: String,
    #[serde(rename = "stationName")]
    pub station_name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Port")]
    pub ports: Vec<RawPort>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPort {
    #[serde(rename = "portNumber")]
    pub port_number: f32,
    #[serde(rename = "reservable")]
    pub reservable: bool,
    #[serde(rename = "status")]
    pub status: String,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    #[serde(rename = "mode")]
    pub mode: String,
    #[serde(rename = "Connector")]
    pub connector: String,
    #[serde(rename = "Voltage")]
    pub voltage: f64,
    #[serde(rename = "Current")]
    pub current: f64,
    #[serde(rename = "Power")]
    pub power: f64,
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: f64,
    #[serde(rename = "Geo")]
    pub geo: RawGeo,
    /// Per-connector breakdown; dropped during normalization.
    #[serde(default, rename = "Connectors")]
    pub connectors: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGeo {
    #[serde(rename = "Lat")]
    pub lat: f64,
    #[serde(rename = "Long")]
    pub long: f64,
}

/// One page of a session listing query.
#[derive(Debug, Clone, Serialize)]
pub struct SessionQuery {
    #[serde(rename = "fromTimeStamp")]
    pub from_ts: DateTime<Utc>,
    #[serde(rename = "toTimeStamp", skip_serializing_if = "Option::is_none")]
    pub to_ts: Option<DateTime<Utc>>,
    #[serde(rename = "startRecord")]
    pub start_record: u32,
}

/// One page of an alarm listing query.
#[derive(Debug, Clone, Serialize)]
pub struct AlarmQuery {
    #[serde(rename = "startTime")]
    pub start_ts: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_ts: DateTime<Utc>,
    #[serde(rename = "startRecord")]
    pub start_record: u32,
}

/// Station listing filter. The listing is single-shot (no pagination).
#[derive(Debug, Clone, Default, Serialize)]
pub struct StationQuery {
    #[serde(rename = "stationID", skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    #[serde(rename = "orgID", skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionPage {
    pub records: Vec<RawSession>,
    /// Continuation flag: true while further pages remain.
    pub more: bool,
}

#[derive(Debug, Clone)]
pub struct AlarmPage {
    pub records: Vec<RawAlarm>,
    pub more: bool,
}

#[derive(Debug, Clone)]
pub struct StationList {
    pub records: Vec<RawStation>,
}

/// The remote API capability the sync engine is written against.
///
/// Transport and authentication are implementation details of the impl;
/// see [`crate::http::HttpChargePointApi`] for the production client.
#[async_trait]
pub trait ChargePointApi: Send + Sync {
    async fn charging_sessions(&self, query: &SessionQuery) -> Result<SessionPage, ApiError>;

    async fn alarms(&self, query: &AlarmQuery) -> Result<AlarmPage, ApiError>;

    async fn stations(&self, query: &StationQuery) -> Result<StationList, ApiError>;
}
