use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A named record held by the item store.
///
/// `name` is the map key and never changes after creation; `description`
/// and `tags` are replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>, tags: Vec<String>) -> Self {
        Self { name: name.into(), description: description.into(), tags }
    }
}

/// Names are map keys and path segments, so any whitespace is rejected.
pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.chars().any(char::is_whitespace) {
        return Err(ServiceError::whitespace_name(name));
    }
    Ok(())
}
