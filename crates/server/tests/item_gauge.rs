//! The item gauge is process-wide, so this file holds a single test.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use service::InMemoryItemStore;
use tower::Service;

use server::observability::ITEMS;
use server::routes::{self, AppState};

fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", "token")
        .body(body)
        .unwrap()
}

async fn status(app: &Router, req: Request<Body>) -> anyhow::Result<StatusCode> {
    Ok(app.clone().call(req).await?.status())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn gauge_tracks_concurrent_creates_and_deletes() -> anyhow::Result<()> {
    let app = routes::build_router(AppState::new(Arc::new(InMemoryItemStore::new())));
    let start = ITEMS.get();

    let mut handles = Vec::new();
    for i in 0..24 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = json!({"name": format!("g-{i}"), "description": "", "tags": []});
            let created = status(&app, request("POST", "/item", Body::from(body.to_string()))).await?;
            let deleted = if i % 3 == 0 {
                Some(status(&app, request("DELETE", &format!("/item/g-{i}"), Body::empty())).await?)
            } else {
                None
            };
            anyhow::Ok((created, deleted))
        }));
    }
    for h in handles {
        let (created, deleted) = h.await??;
        assert_eq!(created, StatusCode::OK);
        if let Some(s) = deleted {
            assert_eq!(s, StatusCode::OK);
        }
    }
    assert_eq!(ITEMS.get(), start + 16);

    // Failed writes leave the gauge alone.
    let dup = json!({"name": "g-1", "description": "", "tags": []});
    assert_eq!(status(&app, request("POST", "/item", Body::from(dup.to_string()))).await?, StatusCode::BAD_REQUEST);
    assert_eq!(status(&app, request("DELETE", "/item/g-0", Body::empty())).await?, StatusCode::NOT_FOUND);
    assert_eq!(ITEMS.get(), start + 16);
    Ok(())
}
