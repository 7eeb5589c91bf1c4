use crate::StateFork;
use alloy_primitives::B256;
use proposer_node_primitives::{GlobalVariables, L2Block, ProcessedTx};
use std::sync::Arc;

/// An error that occurred inside the block builder's tree inserter.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// A tree insertion failed.
    #[error("block builder error: {0}")]
    TreeInsertion(String),
    /// Builder calls arrived out of order.
    #[error("no block in progress")]
    NoBlockInProgress,
}

/// Creates block builders bound to a world state fork.
pub trait BlockBuilderFactory: Send + Sync {
    /// Returns a builder inserting into the rollup trees on `fork`.
    fn create(&self, fork: Arc<dyn StateFork>) -> Box<dyn BlockBuilder>;
}

/// Assembles an L2 block by inserting tx effects and L1→L2 messages into the rollup trees.
#[async_trait::async_trait]
pub trait BlockBuilder: Send + Sync {
    /// Starts a new block with the given global variables and L1→L2 messages.
    async fn start_new_block(
        &mut self,
        global_variables: GlobalVariables,
        l1_to_l2_messages: Vec<B256>,
    ) -> Result<(), BuilderError>;

    /// Inserts the effects of the given processed txs.
    async fn add_txs(&mut self, txs: Vec<ProcessedTx>) -> Result<(), BuilderError>;

    /// Pads and completes the block, returning it with its new archive root.
    async fn set_block_completed(&mut self) -> Result<L2Block, BuilderError>;
}
