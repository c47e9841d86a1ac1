//! Scheduler and node configuration.
//!
//! Only loading and validation live here. Building shards, storage and the
//! ledger from a [`NodeConfig`] is the bootstrap code's job.

use crate::domain::errors::SchedulerError;
use serde::{Deserialize, Serialize};
use shared_crypto::CryptoConfig;
use sl_02_ledger::GenesisConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Longest backoff between executor retries.
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Scheduler tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of executor shards. Shards are numbered `0..shard_count`.
    pub shard_count: u16,
    /// Deepest allowed call depth; the top-level call is depth 0.
    pub max_call_depth: u32,
    /// Serial re-executions per transaction before it is failed with
    /// `ExecutionConflictUnresolved`.
    pub max_reexecutions: u32,
    /// Bound on one cross-shard round trip.
    pub cross_shard_timeout_ms: u64,
    /// Retries after an unavailable shard before the block fails.
    pub executor_retry_attempts: u32,
    /// First retry delay; doubles on every retry.
    pub executor_retry_backoff_ms: u64,
    /// Require the block's parent link to name the chain tip.
    pub verify_parent: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            shard_count: 1,
            max_call_depth: 64,
            max_reexecutions: 3,
            cross_shard_timeout_ms: 5_000,
            executor_retry_attempts: 3,
            executor_retry_backoff_ms: 50,
            verify_parent: true,
        }
    }
}

impl SchedulerConfig {
    /// Config for tests: `shard_count` shards and fast retries.
    pub fn for_testing(shard_count: u16) -> Self {
        Self {
            shard_count,
            cross_shard_timeout_ms: 1_000,
            executor_retry_backoff_ms: 1,
            ..Self::default()
        }
    }

    /// Cross-shard round-trip bound.
    pub fn cross_shard_timeout(&self) -> Duration {
        Duration::from_millis(self.cross_shard_timeout_ms)
    }

    /// Delay before retry number `retry` (0-based).
    pub fn retry_backoff(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.min(20)).unwrap_or(u64::MAX);
        Duration::from_millis(self.executor_retry_backoff_ms.saturating_mul(factor))
            .min(MAX_RETRY_BACKOFF)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.shard_count == 0 {
            return Err(SchedulerError::Config("shard_count must be positive".into()));
        }
        if self.max_call_depth == 0 {
            return Err(SchedulerError::Config("max_call_depth must be positive".into()));
        }
        if self.cross_shard_timeout_ms == 0 {
            return Err(SchedulerError::Config(
                "cross_shard_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Everything a node needs to run the execution core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Chain parameters, including the group identity.
    pub genesis: GenesisConfig,
    /// Crypto profile and key material.
    pub crypto: CryptoConfig,
    /// Scheduler tuning.
    pub scheduler: SchedulerConfig,
}

impl NodeConfig {
    /// Parse a JSON document. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SchedulerError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SchedulerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `SL_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `SL_GROUP_ID` | `genesis.group_id` |
    /// | `SL_TX_GAS_LIMIT` | `genesis.tx_gas_limit` |
    /// | `SL_SM_CRYPTO` | `crypto.national_cipher` |
    /// | `SL_PRIVATE_KEY_PATH` | `crypto.private_key_path` (also enables key loading) |
    /// | `SL_SHARD_COUNT` | `scheduler.shard_count` |
    pub fn from_env() -> Result<Self, SchedulerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`NodeConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SchedulerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(group_id) = lookup("SL_GROUP_ID") {
            config.genesis.group_id = group_id;
        }
        if let Some(limit) = parse_var(&lookup, "SL_TX_GAS_LIMIT")? {
            config.genesis.tx_gas_limit = limit;
        }
        if let Some(flag) = lookup("SL_SM_CRYPTO") {
            config.crypto.national_cipher = parse_flag(&flag)
                .ok_or_else(|| SchedulerError::Config(format!("SL_SM_CRYPTO: invalid flag {flag:?}")))?;
        }
        if let Some(path) = lookup("SL_PRIVATE_KEY_PATH") {
            config.crypto.private_key_path = Some(PathBuf::from(path));
            config.crypto.load_key_pair = true;
        }
        if let Some(count) = parse_var(&lookup, "SL_SHARD_COUNT")? {
            config.scheduler.shard_count = count;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        self.genesis
            .validate()
            .map_err(|e| SchedulerError::Config(e.to_string()))?;
        self.scheduler.validate()?;
        if self.crypto.load_key_pair && self.crypto.private_key_path.is_none() {
            return Err(SchedulerError::Config(
                "load_key_pair requires private_key_path".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, SchedulerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| SchedulerError::Config(format!("{name}: {e}")))
        })
        .transpose()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
