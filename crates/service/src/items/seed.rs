//! Initial store contents loaded from a JSON file.
//!
//! The file uses the same shape as the `GET /item` response: an object
//! mapping each name to its item.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::fs;
use tracing::info;

use super::domain::Item;
use crate::errors::ServiceError;

/// Parse seed JSON. Every key must equal the `name` of its item.
pub fn parse_seed(bytes: &[u8]) -> Result<Vec<Item>, ServiceError> {
    let map: BTreeMap<String, Item> =
        serde_json::from_slice(bytes).map_err(|e| ServiceError::Seed(e.to_string()))?;
    map.into_iter()
        .map(|(key, item)| {
            if key != item.name {
                return Err(ServiceError::Seed(format!(
                    "key {key:?} does not match item name {:?}",
                    item.name
                )));
            }
            Ok(item)
        })
        .collect()
}

pub async fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<Item>, ServiceError> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .await
        .map_err(|e| ServiceError::Seed(format!("cannot read {}: {e}", path.display())))?;
    let items = parse_seed(&bytes)?;
    info!(path = %path.display(), count = items.len(), "loaded seed items");
    Ok(items)
}
