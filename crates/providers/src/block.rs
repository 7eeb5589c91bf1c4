use proposer_node_primitives::{L2Block, L2Tips};

/// An error that occurred while querying an L2 data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The underlying archiver or RPC failed.
    #[error("source error: {0}")]
    Backend(String),
}

/// A source of published L2 blocks, backed by the archiver.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait L2BlockSource: Send + Sync {
    /// The latest published block, or `None` before genesis.
    async fn get_latest_block(&self) -> Result<Option<L2Block>, SourceError>;

    /// The number of the latest published block, 0 before genesis.
    async fn get_block_number(&self) -> Result<u64, SourceError>;

    /// The latest, proven and finalized tips of the L2 chain.
    async fn get_l2_tips(&self) -> Result<L2Tips, SourceError>;
}
