//! Crypto configuration and node key loading.
//!
//! A bad crypto configuration is a startup-time fatal error: nothing here
//! retries, every failure bubbles up to the caller that builds the node.

use crate::suite::{CryptoSuite, KeyPair};
use crate::CryptoError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Crypto section of the node configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Use the SM3/SM2/SM4 profile instead of Keccak/secp256k1/AES.
    pub national_cipher: bool,
    /// Hex-encoded private key file.
    pub private_key_path: Option<PathBuf>,
    /// Whether this node signs (sealers do, observers don't).
    pub load_key_pair: bool,
}

impl CryptoConfig {
    /// Standard profile, no signing key.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

/// Suite plus the node's optional signing key.
#[derive(Debug)]
pub struct NodeCrypto {
    /// Selected suite, shared by every component.
    pub suite: Arc<CryptoSuite>,
    /// Signing key, present when the config asked for it.
    pub key_pair: Option<KeyPair>,
}

/// Select the suite and load the node key if requested.
pub fn load_node_crypto(config: &CryptoConfig) -> Result<NodeCrypto, CryptoError> {
    let suite = Arc::new(CryptoSuite::select(config.national_cipher));
    info!(
        profile = ?suite.profile(),
        hash = suite.hash_algorithm().name(),
        signature = suite.signature_algorithm().name(),
        cipher = suite.cipher_algorithm().name(),
        "init crypto suite success"
    );

    if !config.load_key_pair {
        return Ok(NodeCrypto {
            suite,
            key_pair: None,
        });
    }

    let path = config
        .private_key_path
        .as_deref()
        .ok_or(CryptoError::MissingKeyPath)?;
    let key_pair = load_key_pair(&suite, path)?;
    info!(
        path = %path.display(),
        public_key = %hex::encode(key_pair.public_key()),
        "load key pair success"
    );

    Ok(NodeCrypto {
        suite,
        key_pair: Some(key_pair),
    })
}

/// Read a hex private key file (optional `0x`, surrounding whitespace ignored).
pub fn load_key_pair(suite: &CryptoSuite, path: &Path) -> Result<KeyPair, CryptoError> {
    let unreadable = |reason: String| CryptoError::KeyMaterialUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    let trimmed = contents.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let secret = hex::decode(digits).map_err(|e| unreadable(e.to_string()))?;

    suite
        .key_pair_from_secret(&secret)
        .map_err(|e| unreadable(e.to_string()))
}
