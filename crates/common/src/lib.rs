//! Shared helpers for the item store workspace: logging setup, the admin
//! side server and small response types.

pub mod admin_http;
pub mod types;
pub mod utils;
