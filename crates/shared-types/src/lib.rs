//! # Shared Types Crate
//!
//! The block/header model and its canonical wire format.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every crate uses these types for blocks,
//!   transactions and receipts.
//! - **Hash Binding**: a header hash is the suite hash of the header's
//!   canonical encoding, memoized and invalidated by every setter.
//! - **Versioned Encoding**: every encoded artifact carries `CODEC_VERSION`;
//!   a different version is a decode error.

#![warn(missing_docs)]

pub mod block;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod header;
pub mod merkle;
pub mod state;

pub use block::{Block, BlockFactory};
pub use codec::{CanonicalHasher, CODEC_VERSION};
pub use entities::*;
pub use errors::{CodecError, ProtocolError};
pub use header::{BlockHeader, HeaderData};
pub use merkle::{merkle_root, SENTINEL_HASH};
pub use state::state_root;
