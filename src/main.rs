//! ICM Bridge API server
//!
//! Exposes the ICMBridge contract over HTTP and logs bridge events as they
//! are emitted on chain.

use std::sync::Arc;

use eyre::WrapErr;
use icm_bridge_api::api::{self, AppState};
use icm_bridge_api::bridge::{BridgeContract, EvmBridge};
use icm_bridge_api::config::Config;
use icm_bridge_api::metrics;
use icm_bridge_api::units::parse_bytes32_string;
use icm_bridge_api::watcher::EventWatcher;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting ICM Bridge API");

    let config = Config::load()?;
    info!(
        rpc_url = %config.rpc_url,
        contract = %config.contract_address,
        port = config.port,
        "Configuration loaded"
    );

    let bridge = EvmBridge::new(&config)?;

    // Fail fast when the RPC or contract is unreachable
    let chain_id = bridge
        .chain_id()
        .await
        .wrap_err("Failed to connect to bridge contract")?;
    info!(
        chain_id = %chain_id,
        chain = %parse_bytes32_string(&chain_id).unwrap_or_default(),
        "Connected to bridge contract"
    );

    let (shutdown_tx, _) = watch::channel(false);

    let watcher_handle = if config.watcher.enabled {
        let mut watcher = EventWatcher::new(
            bridge.provider().clone(),
            config.contract_address,
            config.watcher.clone(),
        );
        let (watcher_tx, watcher_rx) = mpsc::channel::<()>(1);
        let mut shutdown_rx = shutdown_tx.subscribe();

        tokio::spawn(async move {
            let _ = shutdown_rx.changed().await;
            let _ = watcher_tx.send(()).await;
        });

        Some(tokio::spawn(async move {
            if let Err(e) = watcher.run(watcher_rx).await {
                error!(error = %e, "Event watcher failed");
            }
        }))
    } else {
        info!("Event watcher disabled");
        None
    };

    let listener = tokio::net::TcpListener::bind(config.socket_addr()?)
        .await
        .wrap_err("Failed to bind HTTP listener")?;

    let mut server_shutdown = shutdown_tx.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    metrics::UP.set(1);
    let state = AppState::new(Arc::new(bridge));
    api::start_server(listener, state, async move {
        let _ = server_shutdown.changed().await;
    })
    .await?;
    metrics::UP.set(0);

    if let Some(handle) = watcher_handle {
        let _ = handle.await;
    }

    info!("ICM Bridge API stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,icm_bridge_api=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
