//! Credential verification with salted, slow one-way hashes.
//!
//! Hashes are argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the salt and the work factor travel with the stored value and
//! verification needs nothing else.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;

/// OWASP argon2id baseline: 19 MiB, 2 iterations, 1 lane.
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argon2 work factor: {0}")]
    WorkFactor(argon2::Error),
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Work factor for new hashes. Existing hashes keep the factor they were made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkFactor {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for WorkFactor {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    /// Build a verifier for the given work factor.
    ///
    /// # Errors
    /// Returns [`Error::WorkFactor`] when argon2 rejects the parameters; callers
    /// treat this as a fatal configuration error.
    pub fn new(work_factor: WorkFactor) -> Result<Self, Error> {
        let params = Params::new(
            work_factor.memory_kib,
            work_factor.iterations,
            work_factor.parallelism,
            None,
        )
        .map_err(Error::WorkFactor)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext secret with a fresh random salt.
    ///
    /// # Errors
    /// Returns [`Error::Hash`] if argon2 fails to produce a hash.
    pub fn hash(&self, plaintext: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(Error::Hash)
    }

    /// Check a plaintext secret against a stored hash.
    ///
    /// Mismatches and unparseable stored values both yield `false`.
    #[must_use]
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_verifier() -> CredentialVerifier {
    // Cheap parameters keep the test suite fast; production uses the defaults.
    CredentialVerifier::new(WorkFactor {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap_or_else(|err| panic!("test work factor rejected: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn hash_verifies_original_secret() -> Result<()> {
        let verifier = test_verifier();
        let hash = verifier.hash("correct horse")?;
        assert!(verifier.verify("correct horse", &hash));
        Ok(())
    }

    #[test]
    fn hash_rejects_altered_secret() -> Result<()> {
        let verifier = test_verifier();
        let hash = verifier.hash("correct horse")?;
        assert!(!verifier.verify("correct horsex", &hash));
        assert!(!verifier.verify("", &hash));
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> Result<()> {
        let verifier = test_verifier();
        let first = verifier.hash("longenough")?;
        let second = verifier.hash("longenough")?;
        assert_ne!(first, second);
        assert!(verifier.verify("longenough", &first));
        assert!(verifier.verify("longenough", &second));
        Ok(())
    }

    #[test]
    fn hash_embeds_algorithm_and_work_factor() -> Result<()> {
        let verifier = test_verifier();
        let hash = verifier.hash("longenough")?;
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        Ok(())
    }

    #[test]
    fn verify_uses_factor_stored_in_hash() -> Result<()> {
        let cheap = test_verifier();
        let hash = cheap.hash("longenough")?;
        let stronger = CredentialVerifier::new(WorkFactor {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })?;
        assert!(stronger.verify("longenough", &hash));
        Ok(())
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        let verifier = test_verifier();
        assert!(!verifier.verify("longenough", ""));
        assert!(!verifier.verify("longenough", "not-a-phc-string"));
        assert!(!verifier.verify("longenough", "$2b$10$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn invalid_work_factor_is_rejected() {
        let result = CredentialVerifier::new(WorkFactor {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(Error::WorkFactor(_))));
    }

    #[test]
    fn default_work_factor_is_owasp_baseline() {
        let factor = WorkFactor::default();
        assert_eq!(factor.memory_kib, 19_456);
        assert_eq!(factor.iterations, 2);
        assert_eq!(factor.parallelism, 1);
    }
}
