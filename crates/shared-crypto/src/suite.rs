//! # Crypto Suite
//!
//! One immutable bundle of {hash, signature, cipher} chosen once per node.
//!
//! | Profile | Hash | Signature | Cipher |
//! |---------|------|-----------|--------|
//! | Standard | Keccak-256 | secp256k1 ECDSA | AES-256-GCM |
//! | National cipher | SM3 | SM2 | SM4-GCM |
//!
//! The suite is passed around as `Arc<CryptoSuite>`; there is no global.

use crate::ecdsa::{self, Secp256k1KeyPair};
use crate::hashing::{HashAlgorithm, HashValue, Hasher};
use crate::sm2::{self, Sm2KeyPair};
use crate::symmetric::CipherAlgorithm;
use crate::CryptoError;

/// Which algorithm bundle the node runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CryptoProfile {
    /// Keccak-256 / secp256k1 / AES-256-GCM
    Standard,
    /// SM3 / SM2 / SM4-GCM
    NationalCipher,
}

/// Signature scheme selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// ECDSA over secp256k1
    Secp256k1,
    /// SM2 digital signature
    Sm2,
}

impl SignatureAlgorithm {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Sm2 => "sm2",
        }
    }
}

/// A signing key pair for either signature scheme.
pub enum KeyPair {
    /// secp256k1 key pair
    Secp256k1(Secp256k1KeyPair),
    /// SM2 key pair
    Sm2(Sm2KeyPair),
}

impl KeyPair {
    /// Algorithm this key pair signs with.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Secp256k1(_) => SignatureAlgorithm::Secp256k1,
            Self::Sm2(_) => SignatureAlgorithm::Sm2,
        }
    }

    /// Public key bytes (SEC1).
    pub fn public_key(&self) -> Vec<u8> {
        match self {
            Self::Secp256k1(kp) => kp.public_key(),
            Self::Sm2(kp) => kp.public_key(),
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

/// The node-wide cryptographic profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CryptoSuite {
    profile: CryptoProfile,
    hash: HashAlgorithm,
    signature: SignatureAlgorithm,
    cipher: CipherAlgorithm,
}

impl CryptoSuite {
    /// Select the suite for the node.
    ///
    /// Deterministic and side-effect free.
    pub fn select(national_cipher: bool) -> Self {
        if national_cipher {
            Self::national_cipher()
        } else {
            Self::standard()
        }
    }

    /// Keccak-256 / secp256k1 / AES-256-GCM.
    pub fn standard() -> Self {
        Self {
            profile: CryptoProfile::Standard,
            hash: HashAlgorithm::Keccak256,
            signature: SignatureAlgorithm::Secp256k1,
            cipher: CipherAlgorithm::Aes256Gcm,
        }
    }

    /// SM3 / SM2 / SM4-GCM.
    pub fn national_cipher() -> Self {
        Self {
            profile: CryptoProfile::NationalCipher,
            hash: HashAlgorithm::Sm3,
            signature: SignatureAlgorithm::Sm2,
            cipher: CipherAlgorithm::Sm4Gcm,
        }
    }

    /// Selected profile.
    pub fn profile(&self) -> CryptoProfile {
        self.profile
    }

    /// Hash algorithm.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// Signature algorithm.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature
    }

    /// Cipher algorithm.
    pub fn cipher_algorithm(&self) -> CipherAlgorithm {
        self.cipher
    }

    /// Hash bytes.
    pub fn hash(&self, data: &[u8]) -> HashValue {
        self.hash.hash(data)
    }

    /// Hash the concatenation of several inputs.
    pub fn hash_many(&self, inputs: &[&[u8]]) -> HashValue {
        let mut hasher = Hasher::new(self.hash);
        for input in inputs {
            hasher.update(input);
        }
        hasher.finalize()
    }

    /// Generate a fresh key pair for this suite.
    pub fn generate_key_pair(&self) -> Result<KeyPair, CryptoError> {
        match self.signature {
            SignatureAlgorithm::Secp256k1 => Ok(KeyPair::Secp256k1(Secp256k1KeyPair::generate())),
            SignatureAlgorithm::Sm2 => Ok(KeyPair::Sm2(Sm2KeyPair::generate()?)),
        }
    }

    /// Rebuild a key pair from a 32-byte secret.
    pub fn key_pair_from_secret(&self, secret: &[u8]) -> Result<KeyPair, CryptoError> {
        match self.signature {
            SignatureAlgorithm::Secp256k1 => {
                Ok(KeyPair::Secp256k1(Secp256k1KeyPair::from_secret(secret)?))
            }
            SignatureAlgorithm::Sm2 => Ok(KeyPair::Sm2(Sm2KeyPair::from_secret(secret)?)),
        }
    }

    /// Sign a message with a key pair of this suite's scheme.
    pub fn sign(&self, key_pair: &KeyPair, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match (self.signature, key_pair) {
            (SignatureAlgorithm::Secp256k1, KeyPair::Secp256k1(kp)) => Ok(kp.sign(message)),
            (SignatureAlgorithm::Sm2, KeyPair::Sm2(kp)) => Ok(kp.sign(message)),
            (suite, key) => Err(CryptoError::AlgorithmMismatch {
                suite: suite.name(),
                key: key.algorithm().name(),
            }),
        }
    }

    /// Verify a signature. Malformed keys or signatures verify as `false`.
    pub fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let result = match self.signature {
            SignatureAlgorithm::Secp256k1 => ecdsa::verify(public_key, message, signature),
            SignatureAlgorithm::Sm2 => sm2::verify(public_key, message, signature),
        };
        result.is_ok()
    }

    /// Encrypt with the suite's cipher.
    pub fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.cipher.encrypt(key, plaintext)
    }

    /// Decrypt with the suite's cipher.
    pub fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.cipher.decrypt(key, ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_standard() {
        let suite = CryptoSuite::select(false);
        assert_eq!(suite.profile(), CryptoProfile::Standard);
        assert_eq!(suite.hash_algorithm(), HashAlgorithm::Keccak256);
        assert_eq!(suite.signature_algorithm(), SignatureAlgorithm::Secp256k1);
        assert_eq!(suite.cipher_algorithm(), CipherAlgorithm::Aes256Gcm);
    }

    #[test]
    fn test_select_national_cipher() {
        let suite = CryptoSuite::select(true);
        assert_eq!(suite.profile(), CryptoProfile::NationalCipher);
        assert_eq!(suite.hash_algorithm(), HashAlgorithm::Sm3);
        assert_eq!(suite.signature_algorithm(), SignatureAlgorithm::Sm2);
        assert_eq!(suite.cipher_algorithm(), CipherAlgorithm::Sm4Gcm);
    }

    #[test]
    fn test_select_is_deterministic() {
        assert_eq!(CryptoSuite::select(true), CryptoSuite::select(true));
        assert_ne!(CryptoSuite::select(true), CryptoSuite::select(false));
    }

    #[test]
    fn test_hash_many_matches_concatenation() {
        let suite = CryptoSuite::standard();
        assert_eq!(suite.hash_many(&[b"ab".as_slice(), b"cd".as_slice()]), suite.hash(b"abcd"));
    }

    #[test]
    fn test_sign_verify_both_profiles() {
        for suite in [CryptoSuite::standard(), CryptoSuite::national_cipher()] {
            let kp = suite.generate_key_pair().unwrap();
            let sig = suite.sign(&kp, b"header hash").unwrap();
            assert!(suite.verify(&kp.public_key(), b"header hash", &sig));
            assert!(!suite.verify(&kp.public_key(), b"other", &sig));
        }
    }

    #[test]
    fn test_sign_with_foreign_key_pair_fails() {
        let standard = CryptoSuite::standard();
        let national = CryptoSuite::national_cipher();
        let sm2_kp = national.generate_key_pair().unwrap();

        let result = standard.sign(&sm2_kp, b"msg");
        assert!(matches!(result, Err(CryptoError::AlgorithmMismatch { .. })));
    }

    #[test]
    fn test_encrypt_uses_profile_cipher() {
        let suite = CryptoSuite::national_cipher();
        let sealed = suite.encrypt(&[5u8; 16], b"secret").unwrap();
        assert_eq!(suite.decrypt(&[5u8; 16], &sealed).unwrap(), b"secret");
        assert!(suite.encrypt(&[5u8; 32], b"secret").is_err());
    }
}
