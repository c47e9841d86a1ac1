//! # Inbound Ports (Driving Ports)
//!
//! What the block producer and consensus layer call.

use crate::domain::errors::SchedulerError;
use crate::domain::state::BlockState;
use async_trait::async_trait;
use shared_types::Block;
use sl_02_ledger::FinalizedBlock;

/// Block execution API.
#[async_trait]
pub trait BlockExecutionApi: Send + Sync {
    /// Execute `block` on top of the chain tip and commit it atomically.
    ///
    /// The block's receipts, roots and gas are filled in; the header must
    /// not be sealed yet. On error nothing of the block is visible.
    async fn execute_block(&self, block: Block) -> Result<FinalizedBlock, SchedulerError>;

    /// Cancel the in-flight block `number` if it has not started committing.
    fn cancel(&self, number: u64) -> Result<(), SchedulerError>;

    /// State of a recent block.
    fn state_of(&self, number: u64) -> Option<BlockState>;
}
