use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entropy_ledger::api;
use entropy_ledger::config::AppConfig;
use entropy_ledger::crypto::KeyVault;
use entropy_ledger::ledger::Ledger;
use entropy_ledger::rotation::{watch_key_file, KeyRotationWatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entropy_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting entropy ledger");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded");

    let mut ledger = Ledger::new();
    if let Some(limit) = config.ledger.capacity_limit() {
        ledger = ledger.with_capacity_limit(limit);
    }

    // Key rotation: initial load, then follow changes to the key file
    let mut rotation = None;
    if let Some(vault_config) = &config.vault {
        let vault: Arc<dyn KeyVault> = Arc::new(vault_config.open()?);
        let watcher = KeyRotationWatcher::new(ledger.clone(), vault, config.rotation.policy);

        if vault_config.key_path.exists() {
            match watcher.refresh(&vault_config.key_path).await {
                Ok(root) => info!("Initial entropy key loaded, root {:?}", root),
                Err(e) => warn!("Initial key load failed: {}", e),
            }
        } else {
            warn!("Key file {:?} does not exist yet", vault_config.key_path);
        }

        let (tx, rx) = mpsc::channel(config.rotation.channel_capacity);
        let fs_watcher = watch_key_file(&vault_config.key_path, tx)?;
        let handle = watcher.spawn(rx);
        rotation = Some((fs_watcher, handle));
        info!("Key rotation watcher started");
    } else {
        info!("No vault configured; key rotation disabled");
    }

    let app = api::router(ledger);

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some((fs_watcher, handle)) = rotation {
        drop(fs_watcher);
        handle.stop().await;
    }

    if let Err(e) = &served {
        error!("Server error: {}", e);
    }
    served?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
