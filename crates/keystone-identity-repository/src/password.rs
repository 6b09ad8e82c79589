//! Password hashing hook.
//!
//! Repositories hash passwords through the [`PasswordHasher`] trait so the
//! algorithm can be swapped without touching storage code. The default,
//! [`Argon2Hasher`], stores Argon2id PHC strings:
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1${salt}${hash}
//! ```
//!
//! Verification reads the cost parameters from the stored string, so hashes
//! written under one configuration keep verifying after it changes. Strings
//! declaring a cost above [`MAX_VERIFY_M_COST_KIB`] or [`MAX_VERIFY_T_COST`]
//! are rejected without being evaluated.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand_core::{OsRng, RngCore};

use crate::error::{RepositoryError, RepositoryResult};

/// Argon2 memory cost in KiB when nothing is configured.
pub const DEFAULT_M_COST_KIB: u32 = Params::DEFAULT_M_COST;
/// Argon2 passes over memory when nothing is configured.
pub const DEFAULT_T_COST: u32 = Params::DEFAULT_T_COST;
pub const DEFAULT_SALT_LEN: usize = 16;

/// Salt length bounds in bytes. The upper bound keeps the encoded salt within
/// the 64 characters a PHC string allows.
pub const MIN_SALT_LEN: usize = 8;
pub const MAX_SALT_LEN: usize = 48;

pub const MAX_VERIFY_M_COST_KIB: u32 = 1 << 20;
pub const MAX_VERIFY_T_COST: u32 = 64;

/// Turns plaintext passwords into stored hashes and checks candidates.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> RepositoryResult<String>;

    /// Check `password` against a stored hash. Malformed hashes never verify.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Argon2id with configurable cost and salt length.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    salt_len: usize,
}

impl Argon2Hasher {
    /// `rounds` is the Argon2 time cost, `memory_kib` the memory cost.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if Argon2 rejects the cost parameters or the salt
    /// length is outside `MIN_SALT_LEN..=MAX_SALT_LEN`.
    pub fn new(rounds: u32, memory_kib: u32, salt_len: usize) -> RepositoryResult<Self> {
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt_len) {
            return Err(RepositoryError::Validation(format!(
                "salt length {} outside {}..={}",
                salt_len, MIN_SALT_LEN, MAX_SALT_LEN
            )));
        }
        let params = Params::new(memory_kib, rounds, 1, None)
            .map_err(|e| RepositoryError::Validation(format!("argon2 parameters: {}", e)))?;
        Ok(Self { params, salt_len })
    }

    fn argon2(&self, params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self { params: Params::default(), salt_len: DEFAULT_SALT_LEN }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> RepositoryResult<String> {
        let mut salt = vec![0u8; self.salt_len];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| RepositoryError::Internal(format!("salt generation failed: {}", e)))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| RepositoryError::Internal(format!("salt encoding failed: {}", e)))?;

        let hash = self
            .argon2(self.params.clone())
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| RepositoryError::Internal(format!("password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return false;
        }
        let Ok(declared) = Params::try_from(&parsed) else {
            return false;
        };
        if declared.m_cost() > MAX_VERIFY_M_COST_KIB || declared.t_cost() > MAX_VERIFY_T_COST {
            tracing::warn!(
                m_cost = declared.m_cost(),
                t_cost = declared.t_cost(),
                "Refusing to verify password hash with excessive cost"
            );
            return false;
        }
        self.argon2(declared).verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
