use thiserror::Error;

/// Failures of item store operations. All are terminal: nothing is retried
/// and a failed operation never leaves the store partially mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("item {0} already exists")]
    AlreadyExists(String),
    #[error("item {0} does not exist")]
    NotFound(String),
    #[error("seed error: {0}")]
    Seed(String),
}

impl ServiceError {
    pub fn whitespace_name(name: &str) -> Self {
        Self::InvalidArgument(format!("item names cannot contain whitespace: {name:?}"))
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument(_) => "invalid_argument",
            ServiceError::AlreadyExists(_) => "already_exists",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Seed(_) => "seed",
        }
    }
}
