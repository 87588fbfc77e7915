use anyhow::{Context, Result};
use maritime_exporter::api::{create_router, AppState};
use maritime_exporter::config::ExporterConfig;
use maritime_exporter::metrics::MetricsRegistry;
use maritime_exporter::sim::{command_channel, SimulationEngine};
use maritime_exporter::snapshot::FleetStore;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Queued engine commands before callers wait
const COMMAND_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match ExporterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("maritime_exporter=info".to_string());
            error!(error = %e, "Invalid configuration");
            return Err(e).context("Failed to load configuration");
        }
    };
    init_tracing(config.log.filter_directive());

    info!(
        vessels = config.fleet.vessel_count,
        seed = config.fleet.seed,
        tick_interval_secs = config.simulation.tick_interval_secs,
        tick_duration_secs = config.simulation.tick_duration_secs,
        anomalies = config.anomalies.enabled,
        series = MetricsRegistry::expected_series(config.fleet.vessel_count),
        "Maritime exporter starting"
    );
    if !config.fleet.id_scheme.is_stable() {
        warn!("Random vessel ids change on every restart; every series will churn");
    }

    // Fleet and engine
    let store = FleetStore::new();
    let engine = SimulationEngine::new(&config, store.clone())
        .context("Failed to generate fleet")?;
    let (engine_handle, commands) = command_channel(COMMAND_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine.run(commands, shutdown_rx.clone()));

    // HTTP server
    let state = AppState {
        registry: MetricsRegistry::new(store.clone(), &config.registry),
        store,
        engine: engine_handle,
        admin_token: config.server.admin_token.clone(),
    };
    let router = create_router(state, &config.server);
    let addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        addr = %addr,
        metrics_path = %config.server.metrics_path,
        "Exporter listening"
    );

    let mut server_shutdown = shutdown_rx;
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = server_shutdown.wait_for(|stop| *stop).await;
    });
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.await {
            error!(error = %e, "HTTP server error");
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await?;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    if let Err(e) = engine_task.await {
        error!(error = %e, "Simulation engine task failed");
    }
    if let Err(e) = server_task.await {
        error!(error = %e, "HTTP server task failed");
    }
    info!("Maritime exporter stopped");

    Ok(())
}

fn init_tracing(default_directive: String) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .init();
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("Failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("Failed to listen for ctrl_c signal")?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;

    Ok(())
}
