use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post, put, MethodRouter};
use axum::{middleware, Router};
use service::ItemStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::middleware::{log_request, require_authorization};

pub mod items;

/// Shared handler state: a handle to the one item store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }
}

/// One row of the routing table.
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub handler: MethodRouter<AppState>,
}

/// The complete item API as `(method, path, handler)` rows. Any serving
/// shim (standalone server or plugin host) registers exactly these.
pub fn route_table() -> Vec<RouteEntry> {
    vec![
        RouteEntry { method: Method::POST, path: "/item", handler: post(items::create_item) },
        RouteEntry { method: Method::GET, path: "/item", handler: get(items::list_items) },
        RouteEntry { method: Method::GET, path: "/item/:name", handler: get(items::get_item) },
        RouteEntry { method: Method::PUT, path: "/item/:name", handler: put(items::update_item) },
        RouteEntry { method: Method::DELETE, path: "/item/:name", handler: delete(items::delete_item) },
    ]
}

/// Assemble routes into a router, merging rows that share a path.
pub fn register_routes(entries: Vec<RouteEntry>) -> Router<AppState> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();
    for entry in entries {
        let merged = match by_path.remove(entry.path) {
            Some(existing) => existing.merge(entry.handler),
            None => entry.handler,
        };
        by_path.insert(entry.path, merged);
    }
    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| router.route(path, handler))
}

/// Build the full application router: the routing table behind the
/// request log and Authorization middleware, plus tracing.
pub fn build_router(state: AppState) -> Router {
    register_routes(route_table())
        // route_layer: unmatched paths 404 without passing the chain.
        // Layers added later run first, so the log sees every request.
        .route_layer(middleware::from_fn(require_authorization))
        .route_layer(middleware::from_fn(log_request))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
