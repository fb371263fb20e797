use thiserror::Error;

/// Outcome of a rejected store operation. Every variant is recoverable;
/// the caller decides how to surface it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key cannot be empty")]
    EmptyKey,
    #[error("key length {len} exceeds {max} characters")]
    KeyTooLong { len: usize, max: usize },
    #[error("invalid JSON format: {0}")]
    MalformedJson(String),
    #[error("key already exists: {0}")]
    DuplicateKey(String),
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl StoreError {
    pub fn not_found(key: &str) -> Self { Self::KeyNotFound(key.to_string()) }
    pub fn duplicate(key: &str) -> Self { Self::DuplicateKey(key.to_string()) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StoreError::EmptyKey => 1001,
            StoreError::KeyTooLong { .. } => 1002,
            StoreError::MalformedJson(_) => 1003,
            StoreError::DuplicateKey(_) => 2001,
            StoreError::KeyNotFound(_) => 2002,
            StoreError::Io(_) => 3001,
            StoreError::Parse(_) => 3002,
        }
    }

    /// True when the caller supplied bad input, as opposed to a storage failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::Io(_) | StoreError::Parse(_))
    }
}

