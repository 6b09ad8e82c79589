//! # Keystone Identity Config - Configuration Management
//!
//! Loads the identity service configuration from defaults, an optional file
//! and environment variables, in that order of precedence.
//!
//! ## File Format
//!
//! The identity settings live under an `identity:` section so the file can be
//! shared with other services:
//!
//! ```yaml
//! identity:
//!   logging: "info"
//!   namespace: "keystone"
//!   storage:
//!     backend: "memory"
//!     connect_string: "localhost:2181"
//!   password:
//!     rounds: 2
//!     memory_kib: 19456
//!     salt_len: 16
//! ```
//!
//! TOML files with the same shape are accepted too.

pub mod validation;

use std::path::Path;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Root wrapper; sections other than `identity` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RootConfig {
    #[serde(default)]
    pub identity: Config,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_logging")]
    pub logging: String,

    /// Root node under which all identity data is stored
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: default_logging(),
            namespace: default_namespace(),
            storage: StorageConfig::default(),
            password: PasswordConfig::default(),
        }
    }
}

fn default_logging() -> String {
    "info".to_string()
}

fn default_namespace() -> String {
    "keystone".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Address of the coordination service ensemble (`host:port[,host:port]`)
    #[serde(default = "default_connect_string")]
    pub connect_string: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: default_backend(), connect_string: default_connect_string() }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_connect_string() -> String {
    "localhost:2181".to_string()
}

/// Settings for the default Argon2id password hasher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Argon2 time cost (passes over memory)
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Argon2 memory cost in KiB
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Random salt length in bytes
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            memory_kib: default_memory_kib(),
            salt_len: default_salt_len(),
        }
    }
}

fn default_rounds() -> u32 {
    2
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_salt_len() -> usize {
    16
}

/// Load configuration from file and environment.
///
/// 1. Defaults from the `#[serde(default)]` annotations
/// 2. The file at `path`, if it exists
/// 3. Environment variables with the `KEYSTONE__IDENTITY__` prefix, e.g.
///    `KEYSTONE__IDENTITY__NAMESPACE=apps` or
///    `KEYSTONE__IDENTITY__PASSWORD__ROUNDS=20000`
///
/// Each layer only overrides the properties it sets.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let builder = ConfigBuilder::builder()
        .add_source(File::from(path.as_ref()).required(false))
        .add_source(Environment::with_prefix("KEYSTONE").separator("__").try_parsing(true));

    let root: RootConfig = builder.build()?.try_deserialize()?;
    Ok(root.identity)
}

/// Like [`load`], but falls back to defaults (with a warning) when the file
/// cannot be parsed.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
    match load(path.as_ref()) {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully from {:?}", path.as_ref());
            config
        },
        Err(e) => {
            tracing::warn!(
                "Failed to load config from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Config::default()
        },
    }
}
