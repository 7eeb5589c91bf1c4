use alloy_primitives::B256;
use futures::future::BoxFuture;
use proposer_node_primitives::{
    Attestation, BlockHeader, BlockProposal, GlobalVariables, L2Block, Tx, TxHash,
};
use std::sync::Arc;

/// An error that occurred while interacting with the validator client.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorClientError {
    /// The p2p layer failed to deliver a message.
    #[error("p2p error: {0}")]
    P2p(String),
    /// Attestation collection timed out below the threshold.
    #[error("collected {collected} attestations, needed {threshold}")]
    NotEnoughAttestations {
        /// The number of attestations collected before the timeout.
        collected: usize,
        /// The attestation threshold that was requested.
        threshold: usize,
    },
}

/// A callback the validator client invokes to re-execute a proposal it received, so it can
/// attest to blocks it has verified locally.
pub type BlockBuilderFn = Arc<
    dyn Fn(
            Vec<Tx>,
            GlobalVariables,
        ) -> BoxFuture<'static, Result<L2Block, Box<dyn std::error::Error + Send + Sync>>>
        + Send
        + Sync,
>;

/// The sequencer-facing surface of the validator client: proposal creation, broadcast and
/// attestation collection over the validator p2p network.
#[async_trait::async_trait]
pub trait ValidatorClient: Send + Sync {
    /// Builds a signed block proposal for the given header, archive root and tx hashes.
    /// Returns `None` when the client holds no proposer key.
    async fn create_block_proposal(
        &self,
        header: &BlockHeader,
        archive: B256,
        tx_hashes: &[TxHash],
    ) -> Result<Option<BlockProposal>, ValidatorClientError>;

    /// Broadcasts the proposal to the committee.
    async fn broadcast_block_proposal(
        &self,
        proposal: &BlockProposal,
    ) -> Result<(), ValidatorClientError>;

    /// Waits until at least `threshold` attestations over the proposal have been received and
    /// returns them, in arrival order.
    async fn collect_attestations(
        &self,
        proposal: &BlockProposal,
        threshold: usize,
    ) -> Result<Vec<Attestation>, ValidatorClientError>;

    /// Registers the block builder the client uses to re-execute proposals.
    fn register_block_builder(&self, builder: BlockBuilderFn);

    /// Stops the validator client.
    async fn stop(&self);
}
