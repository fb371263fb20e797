use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_STORE_PATH: &str = "./data/store.json";
pub const DEFAULT_MAX_KEY_LEN: usize = 256;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub file_path: String,
    /// Maximum key length in characters; `0` only rejects empty keys.
    #[serde(default = "default_max_key_len")]
    pub max_key_len: usize,
    /// Persist the whole store after every successful HTTP mutation.
    #[serde(default)]
    pub autosave: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_path: default_store_path(),
            max_key_len: default_max_key_len(),
            autosave: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// username -> argon2 PHC hash
    #[serde(default)]
    pub users: HashMap<String, String>,
}

fn default_log_format() -> String { "compact".into() }
fn default_store_path() -> String { DEFAULT_STORE_PATH.into() }
fn default_max_key_len() -> usize { DEFAULT_MAX_KEY_LEN }

/// Path from `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `path` (or defaults when the file is missing), apply env
    /// overrides, then normalize and validate.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = if Path::new(path).exists() {
            load_from_file(path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(path) = std::env::var("KV_STORE_PATH") {
            self.store.file_path = path;
        }
        if let Ok(user) = std::env::var("KV_AUTH_USERNAME") {
            self.auth.username = Some(user);
        }
        if let Ok(pass) = std::env::var("KV_AUTH_PASSWORD") {
            self.auth.password = Some(pass);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.file_path.trim().is_empty() {
            return Err(anyhow!("store.file_path must not be empty"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        match (&self.username, &self.password) {
            (Some(u), _) if u.is_empty() => Err(anyhow!("auth.username must not be empty")),
            (Some(_), None) => Err(anyhow!("auth.username is set but auth.password is missing")),
            (None, Some(_)) => Err(anyhow!("auth.password is set but auth.username is missing")),
            _ => Ok(()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || !self.users.is_empty()
    }
}
