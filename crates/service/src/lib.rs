//! Service layer for the item store.
//! - `items`: the record type, the `ItemStore` abstraction, tag shuffle and seeding.
//! - `storage`: the in-memory backend behind the abstraction.
//! - `errors`: the error kinds every operation reports.

pub mod errors;
pub mod items;
pub mod storage;

pub use errors::ServiceError;
pub use items::{Item, ItemStore};
pub use storage::memory_store::InMemoryItemStore;
