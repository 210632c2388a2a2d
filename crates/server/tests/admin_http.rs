use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::Service;

use common::admin_http::admin_router;
use server::observability::{encode_metrics, REQUESTS_TOTAL};

#[tokio::test]
async fn healthz_and_metrics_need_no_authorization() -> anyhow::Result<()> {
    let app = admin_router(encode_metrics);
    REQUESTS_TOTAL.inc();

    let req = Request::builder().uri("/healthz").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&body)?["status"], "ok");

    let req = Request::builder().uri("/metrics").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert!(String::from_utf8(body.to_vec())?.contains("item_store_requests_total"));
    Ok(())
}
