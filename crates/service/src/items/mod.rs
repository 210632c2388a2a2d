//! Item domain: the record type, the store abstraction and the read-path
//! tag shuffle.

pub mod domain;
pub mod seed;
pub mod shuffle;
pub mod store;

pub use domain::{validate_name, Item};
pub use store::ItemStore;
