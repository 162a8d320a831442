pub mod anomaly;
pub mod config;
pub mod correlate;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use pipeline::SyncError;
pub use sinks::CsvLedger;
