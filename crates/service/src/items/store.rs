use std::collections::BTreeMap;

use async_trait::async_trait;

use super::domain::Item;
use crate::errors::ServiceError;

/// Item store abstraction handed to request handlers.
///
/// Reads (`list`, `get`) permute the tag order of every stored item as a
/// side effect. Writes are linearizable with respect to each other and to
/// reads.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self) -> BTreeMap<String, Item>;
    async fn get(&self, name: &str) -> Result<Item, ServiceError>;
    async fn create(&self, item: Item) -> Result<Item, ServiceError>;
    /// Replace description and tags at `name`; the payload's own name is ignored.
    async fn update(&self, name: &str, item: Item) -> Result<Item, ServiceError>;
    /// Remove `name`, returning the record that was removed.
    async fn delete(&self, name: &str) -> Result<Item, ServiceError>;
    async fn len(&self) -> usize;
}
