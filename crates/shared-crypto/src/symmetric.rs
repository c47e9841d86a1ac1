//! # Symmetric Encryption
//!
//! Provides AES-256-GCM (standard profile) and SM4-GCM (national-cipher profile).
//!
//! Ciphertexts are self-describing: a fresh 96-bit nonce is prepended, so the
//! output is `nonce || ciphertext || tag`.

use crate::CryptoError;
use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    AesGcm, Aes256Gcm, Nonce,
};
use rand::RngCore;

/// SM4 in Galois/Counter mode with a 96-bit nonce.
type Sm4Gcm = AesGcm<sm4::Sm4, U12>;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Cipher selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    /// AES-256-GCM (32-byte keys)
    Aes256Gcm,
    /// SM4-GCM (16-byte keys)
    Sm4Gcm,
}

impl CipherAlgorithm {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "aes-256-gcm",
            Self::Sm4Gcm => "sm4-gcm",
        }
    }

    /// Required key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::Aes256Gcm => 32,
            Self::Sm4Gcm => 16,
        }
    }

    /// Encrypt plaintext under `key`.
    ///
    /// # Errors
    ///
    /// `InvalidKeyLength` if the key does not fit the cipher.
    pub fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.check_key(key)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = match self {
            Self::Aes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
                .encrypt(Nonce::from_slice(&nonce), plaintext),
            Self::Sm4Gcm => Sm4Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
                .encrypt(Nonce::from_slice(&nonce), plaintext),
        }
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    /// Decrypt `nonce || ciphertext` produced by [`CipherAlgorithm::encrypt`].
    ///
    /// # Errors
    ///
    /// `DecryptionFailed` on authentication failure.
    pub fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.check_key(key)?;
        if data.len() < NONCE_LEN {
            return Err(CryptoError::CiphertextTooShort(data.len()));
        }
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);

        match self {
            Self::Aes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?
                .decrypt(Nonce::from_slice(nonce), ciphertext),
            Self::Sm4Gcm => Sm4Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?
                .decrypt(Nonce::from_slice(nonce), ciphertext),
        }
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }

    fn check_key(&self, key: &[u8]) -> Result<(), CryptoError> {
        if key.len() != self.key_len() {
            return Err(CryptoError::InvalidKeyLength {
                expected: self.key_len(),
                actual: key.len(),
            });
        }
        Ok(())
    }
}
