//! Lightweight admin HTTP server spawner
//!
//! Exposes `/healthz` and `/metrics` endpoints, with metrics provided by caller.

use std::thread;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tracing::{error, info};

use crate::types::Health;

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_handler(f: fn() -> (StatusCode, String)) -> (StatusCode, String) {
    f()
}

/// Build the admin router. Split out so it can be exercised without binding.
pub fn admin_router(metrics_fn: fn() -> (StatusCode, String)) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || metrics_handler(metrics_fn)))
}

/// Spawn an admin HTTP server exposing healthz and metrics endpoints on its
/// own thread and runtime, so it keeps answering even if the main runtime
/// is saturated. Failures are logged; the item service keeps running.
pub fn spawn_admin_server(addr: &str, metrics_fn: fn() -> (StatusCode, String)) {
    let addr = addr.to_string();
    thread::spawn(move || {
        let rt = match Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = %e, "failed to build admin runtime");
                return;
            }
        };
        rt.block_on(async move {
            let listener = match TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    error!(%addr, error = %e, "failed to bind admin server");
                    return;
                }
            };
            info!(%addr, "admin server listening");
            if let Err(e) = axum::serve(listener, admin_router(metrics_fn)).await {
                error!(error = %e, "admin server stopped");
            }
        });
    });
}
