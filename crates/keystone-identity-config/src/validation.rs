//! Configuration validation

use thiserror::Error;

use crate::{Config, PasswordConfig, StorageConfig};

/// Storage backends this build can construct.
pub const SUPPORTED_BACKENDS: &[&str] = &["memory"];

/// Salt lengths accepted for password hashing, in bytes.
pub const MIN_SALT_LEN: usize = 8;
pub const MAX_SALT_LEN: usize = 48;

/// Smallest Argon2 memory cost, in KiB, for a single lane.
pub const MIN_MEMORY_KIB: u32 = 8;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log level: {0} (must be one of: trace, debug, info, warn, error)")]
    InvalidLogLevel(String),

    #[error("Invalid namespace '{0}': {1}")]
    InvalidNamespace(String, String),

    #[error("Invalid backend: {0} (must be one of: memory)")]
    InvalidBackend(String),

    #[error("Missing connection string for backend: {0}")]
    MissingConnectionString(String),

    #[error("Invalid password rounds: {0} (must be > 0)")]
    InvalidRounds(u32),

    #[error("Invalid password memory cost: {0} KiB (must be >= 8)")]
    InvalidMemoryCost(u32),

    #[error("Invalid salt length: {0} (must be between 8 and 48)")]
    InvalidSaltLength(usize),

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validate complete configuration, collecting every problem found.
pub fn validate(config: &Config) -> Result<()> {
    let mut errors: Vec<ValidationError> = [
        validate_logging(&config.logging),
        validate_namespace(&config.namespace),
        validate_storage(&config.storage),
        validate_password(&config.password),
    ]
    .into_iter()
    .filter_map(|r| r.err())
    .collect();

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

pub fn validate_logging(level: &str) -> Result<()> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::InvalidLogLevel(level.to_string())),
    }
}

/// A namespace is one or more non-empty node names, optionally with a
/// leading `/`.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let trimmed = namespace.strip_prefix('/').unwrap_or(namespace);
    let invalid = |reason: &str| ValidationError::InvalidNamespace(namespace.to_string(), reason.to_string());

    if trimmed.is_empty() {
        return Err(invalid("must not be empty"));
    }
    for component in trimmed.split('/') {
        if component.is_empty() {
            return Err(invalid("contains an empty path component"));
        }
        if component == "." || component == ".." {
            return Err(invalid("contains a relative path component"));
        }
    }
    Ok(())
}

pub fn validate_storage(config: &StorageConfig) -> Result<()> {
    if !SUPPORTED_BACKENDS.contains(&config.backend.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidBackend(config.backend.clone()));
    }
    if config.connect_string.trim().is_empty() {
        return Err(ValidationError::MissingConnectionString(config.backend.clone()));
    }
    Ok(())
}

pub fn validate_password(config: &PasswordConfig) -> Result<()> {
    if config.rounds == 0 {
        return Err(ValidationError::InvalidRounds(config.rounds));
    }
    if config.memory_kib < MIN_MEMORY_KIB {
        return Err(ValidationError::InvalidMemoryCost(config.memory_kib));
    }
    if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&config.salt_len) {
        return Err(ValidationError::InvalidSaltLength(config.salt_len));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_logging() {
        assert!(validate_logging("debug").is_ok());
        assert!(validate_logging("WARN").is_ok());
        assert!(matches!(validate_logging("loud"), Err(ValidationError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_validate_namespace() {
        assert!(validate_namespace("keystone").is_ok());
        assert!(validate_namespace("/apps/keystone").is_ok());
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("/").is_err());
        assert!(validate_namespace("apps//keystone").is_err());
        assert!(validate_namespace("apps/..").is_err());
    }

    #[test]
    fn test_validate_storage() {
        assert!(validate_storage(&StorageConfig::default()).is_ok());

        let config = StorageConfig { backend: "etcd".to_string(), ..Default::default() };
        assert!(matches!(validate_storage(&config), Err(ValidationError::InvalidBackend(_))));

        let config = StorageConfig { connect_string: " ".to_string(), ..Default::default() };
        assert!(matches!(
            validate_storage(&config),
            Err(ValidationError::MissingConnectionString(_))
        ));
    }

    #[test]
    fn test_validate_password() {
        let config = PasswordConfig { rounds: 0, ..Default::default() };
        assert!(matches!(validate_password(&config), Err(ValidationError::InvalidRounds(0))));

        let config = PasswordConfig { salt_len: 4, ..Default::default() };
        assert!(matches!(validate_password(&config), Err(ValidationError::InvalidSaltLength(4))));

        let config = PasswordConfig { salt_len: 64, ..Default::default() };
        assert!(matches!(validate_password(&config), Err(ValidationError::InvalidSaltLength(64))));

        let config = PasswordConfig { memory_kib: 4, ..Default::default() };
        assert!(matches!(validate_password(&config), Err(ValidationError::InvalidMemoryCost(4))));

        let config = PasswordConfig { rounds: 1, memory_kib: MIN_MEMORY_KIB, salt_len: MIN_SALT_LEN };
        assert!(validate_password(&config).is_ok());
        let config = PasswordConfig { salt_len: MAX_SALT_LEN, ..Default::default() };
        assert!(validate_password(&config).is_ok());
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let config = Config {
            logging: "loud".to_string(),
            password: PasswordConfig { rounds: 0, ..Default::default() },
            ..Default::default()
        };

        match validate(&config) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {:?}", other),
        }
    }
}
