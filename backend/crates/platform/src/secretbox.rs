//! Secret Box - Authenticated encryption for secrets at rest
//!
//! AES-256-GCM under a server-held key. Used to seal TOTP secrets before
//! they reach the database, so a database dump alone never yields usable
//! authenticator seeds.
//!
//! Wire format: 12-byte random nonce followed by ciphertext+tag. A fresh
//! nonce is drawn per seal, so sealing the same plaintext twice produces
//! different bytes.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use thiserror::Error;

use crate::crypto::random_bytes;

/// AES-GCM nonce size in bytes
const NONCE_LEN: usize = 12;

/// Secret box errors
#[derive(Debug, Error)]
pub enum SecretBoxError {
    /// Encryption failed
    #[error("Sealing failed")]
    SealFailed,

    /// Ciphertext failed to decrypt or authenticate
    #[error("Opening failed: ciphertext invalid or wrong key")]
    OpenFailed,

    /// Sealed blob is structurally invalid
    #[error("Sealed data is truncated")]
    Truncated,
}

/// Authenticated symmetric encryption with a fixed 32-byte key
#[derive(Clone)]
pub struct SecretBox {
    cipher: Aes256Gcm,
}

impl SecretBox {
    /// Create a secret box from a 32-byte key
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }

    /// Encrypt and authenticate `plaintext`
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, SecretBoxError> {
        let nonce_bytes = random_bytes(NONCE_LEN);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| SecretBoxError::SealFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt and verify a sealed blob produced by [`SecretBox::seal`]
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, SecretBoxError> {
        if sealed.len() < NONCE_LEN {
            return Err(SecretBoxError::Truncated);
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| SecretBoxError::OpenFailed)
    }
}
