use std::{env, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::items::seed::load_seed_file;
use service::{InMemoryItemStore, ItemStore};
use tracing::info;

use crate::errors::StartupError;
use crate::observability::{encode_metrics, ITEMS};
use crate::routes::{self, AppState};

/// Load configuration: `CONFIG_PATH` (default `config.toml`) when the file
/// exists, otherwise `SERVER_HOST`/`SERVER_PORT` over built-in defaults.
pub fn load_config() -> anyhow::Result<AppConfig> {
    if Path::new(&configs::config_path()).exists() {
        return AppConfig::load_and_validate();
    }

    let mut cfg = AppConfig::default();
    if let Ok(host) = env::var("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    cfg.normalize_and_validate()?;
    Ok(cfg)
}

/// Build the shared item store, seeded from `store.seed_path` when set.
pub async fn build_store(cfg: &AppConfig) -> Result<Arc<dyn ItemStore>, StartupError> {
    let store = match &cfg.store.seed_path {
        Some(path) => InMemoryItemStore::with_items(load_seed_file(path).await?)?,
        None => InMemoryItemStore::new(),
    };
    ITEMS.set(store.len().await as i64);
    Ok(Arc::new(store))
}

/// Build the application router together with its store, and start the
/// admin side server when configured.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = build_store(cfg).await?;
    if let Some(addr) = &cfg.server.admin_addr {
        common::admin_http::spawn_admin_server(addr, encode_metrics);
    }
    Ok(routes::build_router(AppState::new(store)))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {raw}: {e}")))
}

/// Public entry: build the app and run the HTTP server until shutdown.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;

    info!(%addr, "starting item store server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("item store server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
