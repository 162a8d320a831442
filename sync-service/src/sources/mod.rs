pub mod chargepoint;

pub use chargepoint::{fetch_alarms, fetch_sessions, fetch_stations, PAGE_SIZE};
