//! # Canonical Encoding
//!
//! Every encoded artifact is `CODEC_VERSION (u16, big-endian) || payload`.
//! The payload is `bincode` with fixed options:
//!
//! - big-endian, fixed-width integers
//! - sequences and byte strings prefixed with a `u64` length
//! - enum variants tagged with a `u32` index
//! - trailing bytes rejected, 64 MiB size limit
//!
//! Two nodes encoding the same logical value produce identical bytes. A
//! payload carrying another codec version is a decode error.
//!
//! [`CanonicalHasher`] streams the same layout straight into a hash function,
//! so content hashes never need an intermediate buffer and cannot fail.

use crate::errors::CodecError;
use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use shared_crypto::{HashAlgorithm, HashValue, Hasher};

/// Version of the wire layout produced by [`encode`].
pub const CODEC_VERSION: u16 = 1;

/// Upper bound for a single encoded artifact.
pub const MAX_ENCODED_SIZE: u64 = 64 * 1024 * 1024;

const VERSION_PREFIX_LEN: usize = 2;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .with_limit(MAX_ENCODED_SIZE)
}

/// Encode a value with the version prefix.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let payload = options()
        .serialize(value)
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    let mut out = Vec::with_capacity(VERSION_PREFIX_LEN + payload.len());
    out.extend_from_slice(&CODEC_VERSION.to_be_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a value, rejecting any other codec version.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    if bytes.len() < VERSION_PREFIX_LEN {
        return Err(CodecError::Truncated(bytes.len()));
    }
    let (prefix, payload) = bytes.split_at(VERSION_PREFIX_LEN);
    let found = u16::from_be_bytes([prefix[0], prefix[1]]);
    if found != CODEC_VERSION {
        return Err(CodecError::VersionMismatch {
            expected: CODEC_VERSION,
            found,
        });
    }

    options()
        .deserialize(payload)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Streams values into a hasher using the canonical layout.
///
/// `CanonicalHasher::new(alg)` followed by the field writes of a struct
/// yields `alg.hash(encode(&that_struct))`.
pub struct CanonicalHasher {
    inner: Hasher,
}

impl CanonicalHasher {
    /// Start a hash, already fed with the codec version prefix.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let mut inner = Hasher::new(algorithm);
        inner.update(&CODEC_VERSION.to_be_bytes());
        Self { inner }
    }

    /// `u8`, also used for `bool`.
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.inner.update(&[v]);
        self
    }

    /// `u32`
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.inner.update(&v.to_be_bytes());
        self
    }

    /// `u64`
    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.inner.update(&v.to_be_bytes());
        self
    }

    /// Fixed-size array, written raw.
    pub fn fixed(&mut self, v: &[u8]) -> &mut Self {
        self.inner.update(v);
        self
    }

    /// Variable-length byte string.
    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.seq_len(v.len());
        self.inner.update(v);
        self
    }

    /// Sequence length prefix.
    pub fn seq_len(&mut self, len: usize) -> &mut Self {
        self.u64(len as u64)
    }

    /// Finish the hash.
    pub fn finalize(self) -> HashValue {
        self.inner.finalize()
    }
}

/// Serde adapter writing `U256` as 32 big-endian bytes.
pub mod u256_be {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize as `[u8; 32]`.
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        buf.serialize(serializer)
    }

    /// Deserialize from `[u8; 32]`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let buf = <[u8; 32]>::deserialize(deserializer)?;
        Ok(U256::from_big_endian(&buf))
    }
}
