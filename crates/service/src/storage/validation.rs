//! Key and value checks shared by every validated store operation.
//!
//! All functions are pure and can be called from any thread.

use serde::de::IgnoredAny;

use crate::errors::StoreError;

/// Upper bound on key length, in characters, under the bounded policy.
pub const MAX_KEY_LEN: usize = 256;

/// Reject the empty key.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    Ok(())
}

/// Reject the empty key and keys longer than `max` characters.
pub fn validate_key_length(key: &str, max: usize) -> Result<(), StoreError> {
    validate_key(key)?;
    let len = key.chars().count();
    if len > max {
        return Err(StoreError::KeyTooLong { len, max });
    }
    Ok(())
}

/// Syntax-only check: `text` must hold exactly one JSON value of any kind.
pub fn validate_json(text: &str) -> Result<(), StoreError> {
    serde_json::from_str::<IgnoredAny>(text)
        .map(|_| ())
        .map_err(|e| StoreError::MalformedJson(e.to_string()))
}

/// Key first (bounded), then value.
pub fn validate_entry(key: &str, value: &str) -> Result<(), StoreError> {
    validate_key_length(key, MAX_KEY_LEN)?;
    validate_json(value)
}

/// Which key rule the store enforces on validated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Only the empty key is rejected.
    NonEmpty,
    /// Empty keys and keys longer than the bound are rejected.
    Bounded(usize),
}

impl Default for KeyPolicy {
    fn default() -> Self {
        KeyPolicy::Bounded(MAX_KEY_LEN)
    }
}

impl KeyPolicy {
    /// `0` means no upper bound.
    pub fn from_max_len(max: usize) -> Self {
        if max == 0 { KeyPolicy::NonEmpty } else { KeyPolicy::Bounded(max) }
    }

    pub fn check(&self, key: &str) -> Result<(), StoreError> {
        match *self {
            KeyPolicy::NonEmpty => validate_key(key),
            KeyPolicy::Bounded(max) => validate_key_length(key, max),
        }
    }
}
