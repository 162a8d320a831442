use serde::{Deserialize, Serialize};

/// One station port, as persisted in the station ledger.
///
/// The upstream listing returns one record per station carrying an array of
/// port descriptors; the normalizer expands that into one row per physical
/// port, so rows for the same station share every non-port field. Field
/// order is the ledger column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRow {
    pub station_id: String,
    pub org_id: String,
    pub station_group: String,
    pub model: String,
    pub activation_dt: String,
    pub timezone_offset: String,
    pub address: String,
    pub manufacturer: String,
    pub station_name: String,
    pub description: String,
    pub port_no: f32,
    pub reservable: bool,
    pub status: String,
    pub level: String,
    pub time_stamp: String,
    pub mode: String,
    pub connector: String,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub estimated_cost: f64,
    pub location_lat: f64,
    pub location_long: f64,
}
