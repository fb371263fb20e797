//! Service layer for the JSON key-value store.
//! - `storage`: validated concurrent store engine and its file persistence.
//! - `auth`: pluggable credential verification for the API surfaces.
//! - `errors`: error taxonomy returned to adapters.

pub mod errors;
pub mod auth;
pub mod storage;

pub use errors::StoreError;
pub use storage::JsonStore;
