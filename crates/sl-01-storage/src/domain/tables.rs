//! Table names and key encodings.
//!
//! Numeric keys are big-endian so that a sorted scan is numeric order.

/// Chain configuration written at genesis.
pub const S_CONFIG: &str = "s_config";
/// Chain tip metadata.
pub const S_CURRENT_STATE: &str = "s_current_state";
/// Block number to encoded header.
pub const S_NUMBER_2_HEADER: &str = "s_number_2_header";
/// Block number to encoded transaction list.
pub const S_NUMBER_2_TXS: &str = "s_number_2_txs";
/// Block number to encoded receipt list.
pub const S_NUMBER_2_RECEIPTS: &str = "s_number_2_receipts";
/// Header hash to block number.
pub const S_HASH_2_NUMBER: &str = "s_hash_2_number";
/// Contract address to owning shard.
pub const S_CONTRACT_SHARD: &str = "s_contract_shard";
/// Contract state, keyed by `contract || key`.
pub const S_STATE: &str = "s_state";

/// `s_config` key holding the encoded genesis config.
pub const KEY_GENESIS_CONFIG: &[u8] = b"genesis_config";
/// `s_current_state` key holding the latest block number.
pub const KEY_CURRENT_NUMBER: &[u8] = b"current_number";

/// Encode a block number as a key.
pub fn number_key(number: u64) -> [u8; 8] {
    number.to_be_bytes()
}

/// Decode a block number key or value.
pub fn decode_number(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

/// Encode a shard id value for `s_contract_shard`.
pub fn shard_value(shard: u16) -> [u8; 2] {
    shard.to_be_bytes()
}

/// Decode a `s_contract_shard` value.
pub fn decode_shard(bytes: &[u8]) -> Option<u16> {
    let raw: [u8; 2] = bytes.try_into().ok()?;
    Some(u16::from_be_bytes(raw))
}

/// `s_state` key: the 20-byte contract address followed by the slot key.
pub fn state_key(contract: &[u8; 20], key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(contract.len() + key.len());
    out.extend_from_slice(contract);
    out.extend_from_slice(key);
    out
}

/// Split a `s_state` key into contract and slot key.
pub fn split_state_key(raw: &[u8]) -> Option<([u8; 20], &[u8])> {
    if raw.len() < 20 {
        return None;
    }
    let (contract, key) = raw.split_at(20);
    Some((contract.try_into().ok()?, key))
}
