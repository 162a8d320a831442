use std::sync::Arc;

use anyhow::Result;
use chargepoint_client::http::HttpChargePointApi;
use chargepoint_client::ChargePointApi;
use sync_service::{
    config::AppConfig,
    observability,
    pipeline::{self, AlarmSync, Schedule, SessionSync, StationSync},
    sinks::CsvLedger,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics endpoint if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        observability::init_metrics(&metrics_cfg.bind_addr);
    }

    let api: Arc<dyn ChargePointApi> = Arc::new(HttpChargePointApi::new(
        &cfg.api.base_url,
        &cfg.api.key,
        &cfg.api.secret,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let session = Arc::new(SessionSync::new(
        api.clone(),
        CsvLedger::new(&cfg.session.data_path),
        CsvLedger::new(&cfg.anomaly.data_path),
    ));
    let station = Arc::new(StationSync::new(
        api.clone(),
        CsvLedger::new(&cfg.station.data_path),
    ));
    // The alarm worker reads the session ledger but never writes it; the
    // atomic replace in the ledger store is what makes that safe.
    let alarm = Arc::new(AlarmSync::new(
        api,
        CsvLedger::new(&cfg.alarm.data_path),
        CsvLedger::new(&cfg.session.data_path),
    ));

    // One independent worker per entity kind; a failure in one must not
    // take the others down, so they are joined, not try-joined.
    let handles = vec![
        tokio::spawn(pipeline::run_worker(
            session,
            Schedule::from(&cfg.session),
            shutdown_rx.clone(),
        )),
        tokio::spawn(pipeline::run_worker(
            station,
            Schedule::from(&cfg.station),
            shutdown_rx.clone(),
        )),
        tokio::spawn(pipeline::run_worker(
            alarm,
            Schedule::from(&cfg.alarm),
            shutdown_rx,
        )),
    ];

    let mut workers = std::pin::pin!(futures::future::join_all(handles));

    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, letting in-flight cycles finish");
            let _ = shutdown_tx.send(true);
            workers.as_mut().await;
        }
        _ = workers.as_mut() => {
            tracing::warn!("all sync workers terminated");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
