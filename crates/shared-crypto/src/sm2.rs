//! # SM2 Signatures
//!
//! Signature scheme of the national-cipher profile (GB/T 32918).
//!
//! SM2 binds every signature to a distinguishing identifier; the node uses
//! the standard default ID so signatures interoperate with other SM2 stacks.

use crate::CryptoError;
use sm2::dsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use sm2::SecretKey;
use zeroize::Zeroize;

/// Default SM2 distinguishing identifier.
pub const SM2_DIST_ID: &str = "1234567812345678";

/// SM2 keypair.
pub struct Sm2KeyPair {
    signing_key: SigningKey,
    public_key: Vec<u8>,
}

impl Sm2KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Result<Self, CryptoError> {
        let secret = SecretKey::random(&mut rand::thread_rng());
        Self::from_secret_key(&secret)
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_secret(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_secret_key(&secret)
    }

    fn from_secret_key(secret: &SecretKey) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::new(SM2_DIST_ID, secret).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let public_key = secret.public_key().to_sec1_bytes().to_vec();
        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// SEC1 public key bytes.
    pub fn public_key(&self) -> Vec<u8> {
        self.public_key.clone()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let sig: Signature = self.signing_key.sign(message);
        sig.to_bytes().to_vec()
    }
}

impl Drop for Sm2KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Verify an SM2 signature against a SEC1 public key.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(SM2_DIST_ID, public_key)
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;

    verifying_key
        .verify(message, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = Sm2KeyPair::generate().unwrap();
        let signature = keypair.sign(b"sm2 message");

        assert!(verify(&keypair.public_key(), b"sm2 message", &signature).is_ok());
    }

    #[test]
    fn test_tampered_message_fails() {
        let keypair = Sm2KeyPair::generate().unwrap();
        let signature = keypair.sign(b"original");

        assert!(verify(&keypair.public_key(), b"tampered", &signature).is_err());
    }

    #[test]
    fn test_from_secret_is_stable() {
        let a = Sm2KeyPair::from_secret(&[0x11u8; 32]).unwrap();
        let b = Sm2KeyPair::from_secret(&[0x11u8; 32]).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_garbage_public_key_rejected() {
        let result = verify(&[0u8; 10], b"msg", &[0u8; 64]);
        assert!(matches!(result, Err(CryptoError::InvalidPublicKey)));
    }
}
