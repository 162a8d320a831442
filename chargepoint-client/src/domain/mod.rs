pub mod alarm;
pub mod anomaly;
pub mod session;
pub mod station;

pub use alarm::AlarmRow;
pub use anomaly::AnomalyRow;
pub use session::SessionRow;
pub use station::StationRow;
