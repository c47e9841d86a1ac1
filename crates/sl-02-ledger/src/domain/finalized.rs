//! Staged and finalized blocks.
//!
//! [`FinalizedBlock`] can only be obtained from
//! [`crate::Ledger::commit_staged`], i.e. after the block's scope committed.
//! [`crate::Ledger::append`] accepts nothing else, so appending a block that
//! never reached storage cannot be expressed.

use shared_types::{Block, Hash};
use sl_01_storage::ScopeId;

/// A block whose ledger index entries sit in an open storage scope.
#[derive(Debug)]
pub struct StagedBlock {
    pub(crate) scope: ScopeId,
    pub(crate) block: Block,
}

impl StagedBlock {
    /// Scope holding the entries.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The staged block.
    pub fn block(&self) -> &Block {
        &self.block
    }
}

/// A block durably committed to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedBlock {
    block: Block,
}

impl FinalizedBlock {
    pub(crate) fn new(block: Block) -> Self {
        Self { block }
    }

    /// Block number.
    pub fn number(&self) -> u64 {
        self.block.number()
    }

    /// Header hash.
    pub fn hash(&self) -> Hash {
        self.block.hash()
    }

    /// The committed block.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Unwrap.
    pub fn into_block(self) -> Block {
        self.block
    }
}
