//! Storage backends for the service layer.
//!
//! Only an in-memory backend exists; nothing survives a restart.

pub mod memory_store;
