//! Genesis and ledger configuration.

use crate::domain::errors::LedgerError;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Default per-transaction gas limit.
pub const DEFAULT_TX_GAS_LIMIT: u64 = 300_000_000;

/// Chain parameters written once, into block 0.
///
/// The canonical encoding of this struct is the genesis block's extra data
/// and the stored config; a node restarted with a different config refuses
/// to run on the existing chain.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Group identity.
    pub group_id: String,
    /// Chain identity.
    pub chain_id: String,
    /// Consensus algorithm name (informational).
    pub consensus_type: String,
    /// Gas limit per transaction.
    pub tx_gas_limit: u64,
    /// Sealer public keys (hex in JSON).
    #[serde_as(as = "Vec<Hex>")]
    pub sealer_list: Vec<Vec<u8>>,
    /// Weight per sealer; empty means equal weights.
    pub consensus_weights: Vec<u64>,
    /// Genesis timestamp (milliseconds).
    pub timestamp: u64,
    /// Free-form genesis data blob.
    pub genesis_data: String,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            group_id: "group0".to_string(),
            chain_id: "chain0".to_string(),
            consensus_type: "pbft".to_string(),
            tx_gas_limit: DEFAULT_TX_GAS_LIMIT,
            sealer_list: Vec::new(),
            consensus_weights: Vec::new(),
            timestamp: 0,
            genesis_data: String::new(),
        }
    }
}

impl GenesisConfig {
    /// Minimal config for tests: `group_id` and gas limit only.
    pub fn for_testing(group_id: &str, tx_gas_limit: u64) -> Self {
        Self {
            group_id: group_id.to_string(),
            tx_gas_limit,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.group_id.is_empty() {
            return Err(LedgerError::InvalidGenesisConfig(
                "group_id must not be empty".to_string(),
            ));
        }
        if self.tx_gas_limit == 0 {
            return Err(LedgerError::InvalidGenesisConfig(
                "tx_gas_limit must be positive".to_string(),
            ));
        }
        if !self.consensus_weights.is_empty()
            && self.consensus_weights.len() != self.sealer_list.len()
        {
            return Err(LedgerError::InvalidGenesisConfig(format!(
                "{} weights for {} sealers",
                self.consensus_weights.len(),
                self.sealer_list.len()
            )));
        }
        Ok(())
    }

    /// Weights with the equal-weight default applied.
    pub fn effective_weights(&self) -> Vec<u64> {
        if self.consensus_weights.is_empty() {
            vec![1; self.sealer_list.len()]
        } else {
            self.consensus_weights.clone()
        }
    }
}

/// Chain parameters as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Group identity.
    pub group_id: String,
    /// Chain identity.
    pub chain_id: String,
    /// Consensus algorithm name.
    pub consensus_type: String,
    /// Gas limit per transaction.
    pub tx_gas_limit: u64,
    /// Sealer public keys.
    pub sealer_list: Vec<Vec<u8>>,
    /// Weight per sealer.
    pub consensus_weights: Vec<u64>,
}

impl From<&GenesisConfig> for LedgerConfig {
    fn from(config: &GenesisConfig) -> Self {
        Self {
            group_id: config.group_id.clone(),
            chain_id: config.chain_id.clone(),
            consensus_type: config.consensus_type.clone(),
            tx_gas_limit: config.tx_gas_limit,
            sealer_list: config.sealer_list.clone(),
            consensus_weights: config.effective_weights(),
        }
    }
}
