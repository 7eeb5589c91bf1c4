use crate::SlashPayloadProvider;
use alloy_primitives::{Address, Bytes, B256};
use proposer_node_primitives::{
    Attestation, BlockHeader, EpochProofQuote, L2Block, TxHash, VoteKind,
};
use std::sync::Arc;

/// An error that occurred while interacting with the L1 publisher.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    /// The underlying L1 RPC call failed.
    #[error("L1 rpc error: {0}")]
    Rpc(String),
    /// The rollup contract rejected the request.
    #[error("rollup contract rejected request: {0}")]
    ContractRejected(String),
    /// An in-flight call was interrupted by a sequencer stop.
    #[error("publisher call interrupted")]
    Interrupted,
}

/// The publisher owns the L1 side of the sequencer: eligibility checks against the rollup
/// contract, block submission, committee queries, epoch proof claims and votes. Tx signing,
/// gas and nonce management are implementation concerns behind this trait.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait L1Publisher: Send + Sync {
    /// Asks the rollup contract whether this node may propose on top of `tip_archive` at the
    /// next L1 block. Returns the assigned L2 slot and block number.
    async fn can_propose_at_next_eth_block(
        &self,
        tip_archive: B256,
    ) -> Result<(u64, u64), PublisherError>;

    /// Validates that a block with the given header would currently be accepted by the rollup
    /// contract.
    async fn validate_block_for_submission(
        &self,
        header: &BlockHeader,
    ) -> Result<(), PublisherError>;

    /// Submits the block to the rollup contract, with the collected attestations and an
    /// optional epoch proof quote. Returns whether the block was included.
    async fn propose_l2_block(
        &self,
        block: &L2Block,
        attestations: &[Attestation],
        tx_hashes: &[TxHash],
        proof_quote: Option<&EpochProofQuote>,
    ) -> Result<bool, PublisherError>;

    /// Returns the validator committee for the current epoch.
    async fn get_current_epoch_committee(&self) -> Result<Vec<Address>, PublisherError>;

    /// Returns the prior epoch whose proof right is currently claimable, if any.
    async fn get_claimable_epoch(&self) -> Result<Option<u64>, PublisherError>;

    /// Validates an epoch proof quote against the rollup contract, returning it when valid.
    async fn validate_proof_quote(&self, quote: &EpochProofQuote) -> Option<EpochProofQuote>;

    /// Claims the proof right for the quoted epoch. Returns whether the claim landed.
    async fn claim_epoch_proof_right(
        &self,
        quote: &EpochProofQuote,
    ) -> Result<bool, PublisherError>;

    /// Casts a governance or slashing vote for the given slot.
    async fn cast_vote(
        &self,
        slot: u64,
        timestamp: u64,
        kind: VoteKind,
    ) -> Result<bool, PublisherError>;

    /// Registers the getter the publisher polls for slash payloads when casting slashing votes.
    fn register_slash_payload_getter(&self, getter: Arc<dyn SlashPayloadProvider>);

    /// Sets the payload the publisher votes for in governance proposals.
    fn set_governance_payload(&self, payload: Bytes);

    /// The L1 address the publisher signs with.
    fn get_sender_address(&self) -> Address;

    /// Interrupts any in-flight L1 calls. They fail with [`PublisherError::Interrupted`].
    fn interrupt(&self);

    /// Re-arms the publisher after an [`L1Publisher::interrupt`].
    fn restart(&self);
}
