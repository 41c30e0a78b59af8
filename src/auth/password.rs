//! Credential hashing (Argon2id, PHC string format)

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB
pub const ARGON2_M_COST: u32 = 19_456;
/// Iterations
pub const ARGON2_T_COST: u32 = 2;
/// Lanes
pub const ARGON2_P_COST: u32 = 1;

/// One-way password hashing with fixed cost parameters.
///
/// Cheap to clone; the async flows move a copy onto the blocking pool.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new() -> Self {
        // constants are inside argon2's accepted ranges
        let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
            .unwrap_or_default();

        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Digest `plaintext` with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AppError::Internal("Password hashing failed".to_string())
            })
    }

    /// `false` for a mismatch and for a digest that does not parse.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::debug!("Stored password digest is not a PHC string");
            return false;
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matches_only_original_plaintext() {
        let hasher = CredentialHasher::new();
        let digest = hasher.hash("hunter2").unwrap();

        assert!(hasher.verify("hunter2", &digest));
        assert!(!hasher.verify("hunter3", &digest));
    }

    #[test]
    fn test_salt_differs_per_call() {
        let hasher = CredentialHasher::new();

        let first = hasher.hash("same input").unwrap();
        let second = hasher.hash("same input").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same input", &first));
        assert!(hasher.verify("same input", &second));
    }

    #[test]
    fn test_unparseable_digest_is_a_mismatch() {
        let hasher = CredentialHasher::new();

        assert!(!hasher.verify("pw", "not-a-phc-string"));
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "$argon2id$v=19$garbage"));
    }
}
