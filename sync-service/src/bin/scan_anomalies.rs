use anyhow::Result;
use chargepoint_client::domain::SessionRow;
use sync_service::{anomaly, config::AppConfig, observability, sinks::CsvLedger};

/// One-off anomaly scan over the existing session ledger, outside the
/// session worker's schedule (point SYNC_CONFIG at the usual config).
fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    let sessions: Vec<SessionRow> = CsvLedger::new(&cfg.session.data_path).load()?;
    let report = anomaly::scan(&sessions)?;
    CsvLedger::new(&cfg.anomaly.data_path).replace(&report)?;

    tracing::info!(
        sessions = sessions.len(),
        flags = report.len(),
        "anomaly report rewritten"
    );

    Ok(())
}
