//! Reversible encryption for personally identifiable columns.
//!
//! Tokens are deterministic: the same plaintext always produces the same
//! token, so an encrypted column can be searched by encrypting the query
//! value and comparing for equality. The nonce is synthesized from the key and
//! the plaintext, which keeps AES-GCM authenticated while making it
//! deterministic. Equal values therefore produce equal tokens and that
//! pattern is visible to anyone reading the store.
//!
//! Token layout: `base64([nonce:12B][ciphertext][tag:16B])`.

use aes_gcm::{aead::Aead, Aes256Gcm, Key, KeyInit, Nonce};
use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};
use tracing::debug;

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; KEY_LENGTH],
}

impl FieldCipher {
    /// Derives the 256-bit field key from an application secret.
    pub fn from_secret(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"pintalab:field:");
        hasher.update(secret.as_bytes());
        Self {
            key: hasher.finalize().into(),
        }
    }

    fn synthetic_nonce(&self, plaintext: &[u8]) -> [u8; NONCE_LENGTH] {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(b"nonce:");
        hasher.update(plaintext);
        let digest: [u8; 32] = hasher.finalize().into();
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(&digest[..NONCE_LENGTH]);
        nonce
    }

    /// Encrypts `plaintext` into a printable token. Empty input maps to an
    /// empty token.
    pub fn encrypt(&self, plaintext: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }
        let nonce_bytes = self.synthetic_nonce(plaintext.as_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        // AES-GCM only fails for inputs larger than 64 GiB.
        let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        else {
            return String::new();
        };

        let mut raw = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);
        Base64::encode_string(&raw)
    }

    /// Reverses [`FieldCipher::encrypt`]. Malformed, truncated or tampered
    /// tokens yield an empty string instead of an error.
    pub fn decrypt(&self, token: &str) -> String {
        if token.is_empty() {
            return String::new();
        }
        let raw = match Base64::decode_vec(token) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("field token is not valid base64");
                return String::new();
            }
        };
        if raw.len() < NONCE_LENGTH + TAG_LENGTH {
            debug!(len = raw.len(), "field token too short");
            return String::new();
        }
        let (nonce_bytes, sealed) = raw.split_at(NONCE_LENGTH);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        match cipher.decrypt(Nonce::from_slice(nonce_bytes), sealed) {
            Ok(plain) => String::from_utf8(plain).unwrap_or_default(),
            Err(_) => {
                debug!("field token failed authentication");
                String::new()
            }
        }
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldCipher([REDACTED])")
    }
}
