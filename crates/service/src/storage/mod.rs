//! Store engine and its file persistence.
//!
//! - `validation`: key and JSON checks
//! - `json_store`: the concurrent map with CRUD operations
//! - `persistence`: whole-store save/load

pub mod validation;
pub mod json_store;
pub mod persistence;

pub use json_store::JsonStore;
pub use validation::{KeyPolicy, MAX_KEY_LEN};
