use std::collections::HashMap;

use argon2::{password_hash::PasswordVerifier, Argon2, PasswordHash};
use subtle::ConstantTimeEq;

/// Decides whether a username/password pair may use the store.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single plaintext pair, typically from env or config.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

/// Users with argon2 PHC hashes (see `hash_password`).
#[derive(Clone, Debug, Default)]
pub struct Argon2Credentials {
    users: HashMap<String, String>,
}

impl Argon2Credentials {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn insert(&mut self, username: impl Into<String>, password_hash: impl Into<String>) {
        self.users.insert(username.into(), password_hash.into());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for Argon2Credentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let Some(stored) = self.users.get(username) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(stored) else {
            tracing::warn!(%username, "stored password hash is not a valid PHC string");
            return false;
        };
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

/// Accepts a pair if any of the inner verifiers does.
#[derive(Default)]
pub struct AnyOf {
    verifiers: Vec<Box<dyn CredentialVerifier>>,
}

impl AnyOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, verifier: impl CredentialVerifier + 'static) -> Self {
        self.verifiers.push(Box::new(verifier));
        self
    }
}

impl CredentialVerifier for AnyOf {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.verifiers.iter().any(|v| v.verify(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;

    #[test]
    fn static_pair_matches_exactly() {
        let creds = StaticCredentials::new("admin", "password123");
        assert!(creds.verify("admin", "password123"));
        assert!(!creds.verify("admin", "wrongpassword"));
        assert!(!creds.verify("Admin", "password123"));
        assert!(!creds.verify("admin", "password1234"));
        assert!(!creds.verify("", ""));
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = StaticCredentials::new("admin", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn argon2_users_verify_against_hash() {
        let mut creds = Argon2Credentials::default();
        creds.insert("ops", hash_password("S3curePass!").unwrap());
        assert_eq!(creds.len(), 1);
        assert!(creds.verify("ops", "S3curePass!"));
        assert!(!creds.verify("ops", "s3curepass!"));
        assert!(!creds.verify("nobody", "S3curePass!"));
    }

    #[test]
    fn garbage_hash_fails_closed() {
        let mut users = HashMap::new();
        users.insert("ops".to_string(), "plaintext".to_string());
        assert!(!Argon2Credentials::new(users).verify("ops", "plaintext"));
    }

    #[test]
    fn any_of_accepts_either_source() {
        let verifier = AnyOf::new()
            .with(StaticCredentials::new("admin", "a"))
            .with(StaticCredentials::new("viewer", "b"));
        assert!(verifier.verify("admin", "a"));
        assert!(verifier.verify("viewer", "b"));
        assert!(!verifier.verify("admin", "b"));
        assert!(!AnyOf::new().verify("admin", "a"));
    }
}
