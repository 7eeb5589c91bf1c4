use proposer_node_primitives::L2BlockId;
use std::sync::Arc;

/// An error that occurred while interacting with the world state database.
#[derive(Debug, thiserror::Error)]
pub enum WorldStateError {
    /// The database failed.
    #[error("world state error: {0}")]
    Database(String),
    /// The requested block is not available locally.
    #[error("world state has not synced block {0}")]
    BlockNotSynced(u64),
}

/// The sync status of the world state database.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WorldStateStatus {
    /// The block the world state is synced to.
    pub synced_to_l2_block: L2BlockId,
}

/// A fork of the world state that can be mutated independently of the canonical view and
/// discarded with [`StateFork::close`]. Closing discards every uncommitted mutation made
/// through the fork.
#[async_trait::async_trait]
pub trait StateFork: Send + Sync {
    /// The block number the fork was taken at.
    fn block_number(&self) -> u64;

    /// Releases the fork. Mutations made through it are discarded.
    async fn close(&self) -> Result<(), WorldStateError>;
}

/// The authenticated world state database.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait WorldState: Send + Sync {
    /// The current sync status.
    async fn status(&self) -> Result<WorldStateStatus, WorldStateError>;

    /// Blocks until the world state has synced to the given block.
    async fn sync_immediate(&self, block_number: u64) -> Result<(), WorldStateError>;

    /// Takes a fork of the world state at the latest synced block.
    async fn fork(&self) -> Result<Arc<dyn StateFork>, WorldStateError>;
}
