use crate::{BlockHeader, TxHash};
use alloy_primitives::{Address, Bytes, B256};

/// A block proposal broadcast to the validator committee for attestation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockProposal {
    /// The header of the proposed block.
    pub header: BlockHeader,
    /// The archive root after the proposed block.
    pub archive: B256,
    /// The hashes of the txs included in the proposed block.
    pub tx_hashes: Vec<TxHash>,
}

/// A committee member's signature over a block proposal.
///
/// The signature payload is opaque to the sequencer; the rollup contract verifies it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attestation {
    /// The address of the committee member that signed.
    pub signer: Address,
    /// The signature over the proposal.
    pub signature: Bytes,
}

/// The kind of vote the publisher casts alongside a proposal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VoteKind {
    /// A governance proposal vote.
    Governance,
    /// A slashing vote.
    Slashing,
}
