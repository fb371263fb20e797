use thiserror::Error;

/// Errors raised while preparing credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("hashing error: {0}")]
    HashError(String),
}
