use anyhow::{Context, Result};
use axum::serve;
use panel_sidecar::api::gateway::GatewayClient;
use panel_sidecar::api::panel::PanelClient;
use panel_sidecar::core::config::Config;
use panel_sidecar::core::routes::build_router;
use panel_sidecar::core::state::AppState;
use panel_sidecar::core::tracing_init::init_tracing;
use panel_sidecar::stores::directory::DirectoryCache;
use panel_sidecar::sync::scheduler::TrafficSync;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        If this is your first time running the sidecar, copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;

    // Initialize tracing/logging
    init_tracing(&config.logging);

    // Build Tokio runtime with configured number of threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        host = %config.server.host,
        port = config.server.port,
        sync_enabled = config.sync.enabled,
        sync_interval = config.sync.interval_seconds,
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "Panel sidecar starting"
    );

    let panel = Arc::new(
        PanelClient::new(
            config.panel.base_url.clone(),
            config.panel.traffic_url.clone(),
            config.panel.api_key.clone(),
        )
        .context("Failed to create panel client")?,
    );

    let directory = DirectoryCache::new(Arc::clone(&panel));

    // Eager refresh so the first auth request does not start from an empty
    // snapshot. A panel outage here is tolerated; refresh falls back.
    let snapshot = directory.refresh().await;
    info!(users = snapshot.len(), "Initial directory snapshot loaded");

    // Reconciliation scheduler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sync_handle = if config.sync.enabled {
        let gateway = GatewayClient::new(config.gateway.base_url.clone())
            .context("Failed to create gateway client")?;
        let sync = TrafficSync::new(
            Arc::clone(&panel),
            gateway,
            config.gateway.config_file.clone(),
            Duration::from_secs(config.sync.interval_seconds),
        );
        Some(tokio::spawn(sync.run(shutdown_rx)))
    } else {
        info!("Traffic sync disabled by configuration");
        None
    };

    // Build the router with middleware
    let state = Arc::new(AppState::new(config.clone(), directory));
    let app = build_router(state).layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        ),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting TCP listener");

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "Authentication service listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    // Stop the scheduler after the HTTP surface drains
    if let Some(handle) = sync_handle {
        let _ = shutdown_tx.send(true);
        if let Err(e) = handle.await {
            error!(error = %e, "Traffic sync task failed during shutdown");
        }
    }

    info!("Shutting down gracefully");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
