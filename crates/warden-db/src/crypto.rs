//! AES-256-GCM field encryption for at-rest credential protection.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::DbError;

/// Symmetric cipher for individual stored fields.
///
/// Each encryption uses a fresh random 96-bit nonce; the stored form
/// is `base64(nonce || ciphertext || tag)`.
#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; 32],
}

impl FieldCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext field value.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, DbError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| DbError::Decode(format!("AES-GCM encrypt: {e}")))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(combined))
    }

    /// Decrypt a stored field value.
    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, DbError> {
        let combined = STANDARD
            .decode(encoded)
            .map_err(|e| DbError::Decode(format!("base64 decode: {e}")))?;

        if combined.len() < 13 {
            return Err(DbError::Decode("ciphertext too short".into()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(12);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| DbError::Decode(format!("AES-GCM decrypt: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let cipher = FieldCipher::new([42u8; 32]);
        let plaintext = b"{\"service\":\"smtp\"}";
        let encrypted = cipher.encrypt(plaintext).unwrap();
        let decrypted = cipher.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn nonce_is_fresh_per_encryption() {
        let cipher = FieldCipher::new([42u8; 32]);
        let a = cipher.encrypt(b"same input").unwrap();
        let b = cipher.encrypt(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_decrypt() {
        let cipher1 = FieldCipher::new([42u8; 32]);
        let cipher2 = FieldCipher::new([99u8; 32]);
        let encrypted = cipher1.encrypt(b"secret").unwrap();
        assert!(cipher2.decrypt(&encrypted).is_err());
    }

    #[test]
    fn garbage_input_fails_decrypt() {
        let cipher = FieldCipher::new([42u8; 32]);
        assert!(cipher.decrypt("not-base64!!").is_err());
        assert!(cipher.decrypt("AAAA").is_err());
    }
}
