//! # Key/Value Contract Operations
//!
//! The instruction set of the reference shard. A transaction's input is the
//! canonical encoding of a `Vec<Op>`, executed in the context of the target
//! contract.

use serde::{Deserialize, Serialize};
use shared_types::{codec, Address, CodecError, Hash};

/// Gas costs for operations.
pub mod gas {
    /// Base transaction gas.
    pub const TX_BASE: u64 = 21_000;
    /// Extra gas for a contract creation.
    pub const TX_CREATE: u64 = 32_000;
    /// Slot write.
    pub const SET: u64 = 5_000;
    /// Slot read-modify-write.
    pub const ADD: u64 = 5_000;
    /// Slot read.
    pub const GET: u64 = 200;
    /// Log base cost.
    pub const LOG: u64 = 375;
    /// Log cost per data byte.
    pub const LOG_BYTE: u64 = 8;
    /// Call cost, charged to the caller.
    pub const CALL: u64 = 700;
}

/// One operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Write `value` to slot `key`.
    Set {
        /// Slot
        key: Vec<u8>,
        /// Value
        value: Vec<u8>,
    },
    /// Add to a big-endian `u64` counter; a missing slot counts as 0.
    Add {
        /// Slot
        key: Vec<u8>,
        /// Increment
        amount: u64,
    },
    /// Append the slot's value (if any) to the output.
    Get {
        /// Slot
        key: Vec<u8>,
    },
    /// Emit a log from the current contract.
    Log {
        /// Topics
        topics: Vec<Hash>,
        /// Data
        data: Vec<u8>,
    },
    /// Run `ops` in the context of `contract`.
    Call {
        /// Callee
        contract: Address,
        /// Callee operations
        ops: Vec<Op>,
        /// Continue when the call fails instead of failing the caller.
        allow_failure: bool,
    },
    /// Abort the current call with `reason` as output.
    Revert {
        /// Revert reason
        reason: Vec<u8>,
    },
}

impl Op {
    /// Gas charged before the operation runs.
    pub fn cost(&self) -> u64 {
        match self {
            Op::Set { .. } => gas::SET,
            Op::Add { .. } => gas::ADD,
            Op::Get { .. } => gas::GET,
            Op::Log { data, .. } => {
                gas::LOG.saturating_add(gas::LOG_BYTE.saturating_mul(data.len() as u64))
            }
            Op::Call { .. } => gas::CALL,
            Op::Revert { .. } => 0,
        }
    }
}

/// Encode a program as transaction input.
pub fn encode_ops(ops: &[Op]) -> Result<Vec<u8>, CodecError> {
    codec::encode(ops)
}

/// Decode transaction input.
pub fn decode_ops(input: &[u8]) -> Result<Vec<Op>, CodecError> {
    codec::decode(input)
}

/// Counter slot encoding.
pub fn encode_counter(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Counter slot decoding; `None` if the slot is not a counter.
pub fn decode_counter(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}
