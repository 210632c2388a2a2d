use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use service::{Item, ServiceError};

use super::AppState;
use crate::errors::ApiError;
use crate::observability::{self, ITEMS};

/// Decode an item from a raw body regardless of `Content-Type`, so empty and
/// malformed bodies both surface as 400.
fn decode_item(body: &Bytes) -> Result<Item, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("please send a request body"));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET /item
pub async fn list_items(State(state): State<AppState>) -> Json<BTreeMap<String, Item>> {
    let items = state.store.list().await;
    observability::record("list", &Ok::<_, ServiceError>(()));
    Json(items)
}

/// GET /item/:name
pub async fn get_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let res = state.store.get(&name).await;
    observability::record("get", &res);
    Ok(Json(res?))
}

/// POST /item
pub async fn create_item(State(state): State<AppState>, body: Bytes) -> Result<Json<Item>, ApiError> {
    let item = decode_item(&body)?;
    let res = state.store.create(item).await;
    observability::record("create", &res);
    let created = res?;
    ITEMS.inc();
    Ok(Json(created))
}

/// PUT /item/:name
///
/// A missing item is a 400 here, not a 404.
pub async fn update_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Item>, ApiError> {
    let item = decode_item(&body)?;
    let res = state.store.update(&name, item).await;
    observability::record("update", &res);
    match res {
        Ok(updated) => Ok(Json(updated)),
        Err(e @ ServiceError::NotFound(_)) => Err(ApiError::bad_request(e.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /item/:name
pub async fn delete_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<String, ApiError> {
    let res = state.store.delete(&name).await;
    observability::record("delete", &res);
    let removed = res?;
    ITEMS.dec();
    Ok(format!("Deleted item with name {}", removed.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_rejected() {
        for body in ["", "  \n"] {
            let err = decode_item(&Bytes::from(body)).unwrap_err();
            assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
            assert_eq!(err.message, "please send a request body");
        }
    }

    #[test]
    fn malformed_body_is_rejected() {
        let err = decode_item(&Bytes::from_static(b"{\"name\": 3}")).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn valid_body_decodes() {
        let item = decode_item(&Bytes::from_static(
            br#"{"name":"widget","description":"a widget","tags":["a"]}"#,
        ))
        .unwrap();
        assert_eq!(item, Item::new("widget", "a widget", vec!["a".into()]));
    }
}
