//! Request interceptors applied in front of every item route: the request
//! log runs first, then the Authorization gate.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::observability::{REQUESTS_TOTAL, UNAUTHORIZED_TOTAL};

/// Log method and path before the request is dispatched.
pub async fn log_request(req: Request, next: Next) -> Response {
    info!(method = %req.method(), path = %req.uri().path(), "request");
    REQUESTS_TOTAL.inc();
    next.run(req).await
}

/// Reject requests without a non-blank `Authorization` header. The value is
/// not otherwise checked.
pub async fn require_authorization(req: Request, next: Next) -> Result<Response, ApiError> {
    let present = req
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.as_bytes().iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or(false);

    if !present {
        warn!(method = %req.method(), path = %req.uri().path(), "missing Authorization header");
        UNAUTHORIZED_TOTAL.inc();
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(req).await)
}
