// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing in PHC string format.
//!
//! Salts come from `ring`'s system RNG. Both operations are CPU-bound and
//! are expected to run on a blocking thread.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use parley_core::ParleyError;
use ring::rand::{SecureRandom, SystemRandom};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    /// OWASP minimum for Argon2id: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashCost {
    fn hasher(&self) -> Result<Argon2<'static>, ParleyError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| ParleyError::Internal(format!("invalid Argon2id parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str, cost: HashCost) -> Result<String, ParleyError> {
    let salt = generate_salt()?;
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| ParleyError::Internal(format!("failed to encode salt: {e}")))?;
    let hash = cost
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ParleyError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. The parameters embedded
/// in the PHC string are used, not the current [`HashCost`].
pub fn verify_password(password: &str, phc: &str) -> Result<bool, ParleyError> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| ParleyError::Internal(format!("stored password hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn generate_salt() -> Result<[u8; 16], ParleyError> {
    let mut salt = [0u8; 16];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| ParleyError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> HashCost {
        HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn hash_is_phc_argon2id() {
        let hash = hash_password("correct horse", cheap()).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$"), "got {hash}");
        assert!(!hash.contains("correct horse"));
    }

    #[test]
    fn verify_accepts_right_and_rejects_wrong_password() {
        let hash = hash_password("correct horse", cheap()).unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("pw", cheap()).unwrap();
        let b = hash_password("pw", cheap()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-phc-string").is_err());
    }
}
