use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

/// One-way credential hashing. Every password is combined with the
/// application pepper, and the Argon2 salt is derived from that same pepper,
/// so hashing the same password twice yields the same digest.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: String,
    salt: SaltString,
}

impl PasswordHasher {
    pub fn new(pepper: &str) -> Result<Self, PasswordError> {
        let digest = Sha256::digest(pepper.as_bytes());
        let salt = SaltString::encode_b64(&digest[..16]).map_err(|e| {
            error!(error = %e, "argon2 salt derivation error");
            PasswordError(e.to_string())
        })?;
        Ok(Self {
            pepper: pepper.to_string(),
            salt,
        })
    }

    fn peppered(&self, plain: &str) -> Vec<u8> {
        let mut input = Vec::with_capacity(plain.len() + self.pepper.len());
        input.extend_from_slice(plain.as_bytes());
        input.extend_from_slice(self.pepper.as_bytes());
        input
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let hash = Argon2::default()
            .hash_password(&self.peppered(plain), &self.salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A digest that cannot be parsed never verifies.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "argon2 parse hash error");
                return false;
            }
        };
        Argon2::default()
            .verify_password(&self.peppered(plain), &parsed)
            .is_ok()
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordHasher([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new("test-pepper").expect("pepper should be accepted")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let h = hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = h.hash(password).expect("hashing should succeed");
        assert!(h.verify(password, &hash));
    }

    #[test]
    fn hashing_is_deterministic() {
        let h = hasher();
        assert_eq!(h.hash("kaappi123").unwrap(), h.hash("kaappi123").unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let h = hasher();
        let hash = h.hash("correct-horse-battery-staple").unwrap();
        assert!(!h.verify("wrong-password", &hash));
    }

    #[test]
    fn pepper_changes_digest() {
        let other = PasswordHasher::new("another-pepper").unwrap();
        let hash = hasher().hash("kaappi123").unwrap();
        assert_ne!(other.hash("kaappi123").unwrap(), hash);
        assert!(!other.verify("kaappi123", &hash));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!hasher().verify("anything", "not-a-valid-hash"));
    }
}
