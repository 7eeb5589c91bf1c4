use crate::SourceError;
use alloy_primitives::B256;

/// A source of L1→L2 messages to be consumed by new L2 blocks.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait L1ToL2MessageSource: Send + Sync {
    /// The messages that must be included in the given L2 block.
    async fn get_l1_to_l2_messages(&self, block_number: u64) -> Result<Vec<B256>, SourceError>;

    /// The L1 block number the message source has processed up to.
    async fn get_block_number(&self) -> Result<u64, SourceError>;
}
