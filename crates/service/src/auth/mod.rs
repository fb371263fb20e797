//! Credential verification for the HTTP surface.
//!
//! The store itself never authenticates; the server holds an
//! `Arc<dyn CredentialVerifier>` and consults it before touching the store.

pub mod errors;
pub mod password;
pub mod verifier;

pub use errors::AuthError;
pub use password::hash_password;
pub use verifier::{AnyOf, Argon2Credentials, CredentialVerifier, StaticCredentials};
