//! Serve the item routes as a plugin of an orchestration host.
//!
//! The host starts this process with a magic cookie in the environment and
//! reads one handshake line from stdout telling it where to connect:
//! `CORE|APP|tcp|ADDR|http`. Everything after the handshake is plain HTTP
//! against the routing table; the host's own RPC framing is not spoken here.

use std::future::Future;
use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use configs::PluginConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::startup::shutdown_signal;

/// Version of the handshake line format itself.
pub const CORE_PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("not launched by a plugin host: {key} is missing or does not match")]
    NotLaunchedByHost { key: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Check the cookie value found in the environment against the configured one.
pub fn verify_cookie(cfg: &PluginConfig, found: Option<&str>) -> Result<(), PluginError> {
    match found {
        Some(v) if v == cfg.magic_cookie_value => Ok(()),
        _ => Err(PluginError::NotLaunchedByHost { key: cfg.magic_cookie_key.clone() }),
    }
}

pub fn handshake_line(cfg: &PluginConfig, addr: SocketAddr) -> String {
    format!("{CORE_PROTOCOL_VERSION}|{}|tcp|{addr}|http", cfg.protocol_version)
}

/// Write the handshake line and flush it so the host sees it immediately.
pub fn announce<W: Write>(out: &mut W, cfg: &PluginConfig, addr: SocketAddr) -> io::Result<()> {
    writeln!(out, "{}", handshake_line(cfg, addr))?;
    out.flush()
}

/// Serve `app` on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), PluginError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Full plugin entry: verify the cookie, bind an ephemeral loopback port,
/// announce it on stdout and serve until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, cfg: &PluginConfig) -> Result<(), PluginError> {
    let found = std::env::var(&cfg.magic_cookie_key).ok();
    verify_cookie(cfg, found.as_deref())?;

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    announce(&mut io::stdout().lock(), cfg, addr)?;
    info!(%addr, protocol_version = cfg.protocol_version, "plugin serving");

    serve_on(listener, app, shutdown_signal()).await
}
