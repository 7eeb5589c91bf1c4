use crate::state::SequencerPhase;
use proposer_node_providers::{
    BuilderError, PoolError, ProcessorError, PublisherError, SourceError, ValidatorClientError,
    WorldStateError,
};

/// An error type for the sequencer.
#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    /// A forward state transition was attempted past its deadline within the slot.
    #[error(
        "sequencer too slow: transition {from} -> {to} allowed up to {max_allowed_s}s into the slot, attempted at {seconds_into_slot}s"
    )]
    TooSlow {
        /// The phase the sequencer was in.
        from: SequencerPhase,
        /// The phase the sequencer attempted to enter.
        to: SequencerPhase,
        /// The deadline for the target phase, in seconds from slot start.
        max_allowed_s: f64,
        /// The wall-clock seconds into the slot at which the transition was attempted.
        seconds_into_slot: f64,
    },
    /// This node may not propose at the next L1 block.
    #[error("not eligible to propose: {0}")]
    NotEligible(String),
    /// The publisher assigned a different block number than the one derived from the local tip.
    #[error("proposer assigned block {actual}, expected block {expected}")]
    ProposerMismatch {
        /// The block number derived from the local tip.
        expected: u64,
        /// The block number the publisher assigned.
        actual: u64,
    },
    /// Fewer txs survived processing than the configured block minimum.
    #[error("not enough processed txs to build block: {available} < {min}")]
    TooFewTxs {
        /// The number of txs that survived processing.
        available: usize,
        /// The configured minimum.
        min: usize,
    },
    /// The sequencer configuration does not fit the rollup constants.
    #[error("invalid sequencer configuration: {0}")]
    Config(String),
    /// The publisher refused the block before or at submission.
    #[error("publisher rejected block at {stage}: {reason}")]
    PublisherRejected {
        /// Which validation or submission step rejected the block.
        stage: &'static str,
        /// The rejection reason.
        reason: String,
    },
    /// Claiming the epoch proof right failed.
    #[error("failed to claim epoch proof right for epoch {epoch}")]
    ClaimFailed {
        /// The epoch the claim was for.
        epoch: u64,
    },
    /// Attestation collection was requested without a validator client.
    #[error("no validator client configured")]
    NoValidator,
    /// The sequencer task is gone and its handle can no longer reach it.
    #[error("sequencer channel closed")]
    ChannelClosed,
    /// The sequencer encountered an error interacting with the L1 publisher.
    #[error(transparent)]
    Publisher(#[from] PublisherError),
    /// The sequencer encountered an error interacting with the validator client.
    #[error(transparent)]
    Validator(#[from] ValidatorClientError),
    /// The sequencer encountered an error interacting with the tx pool.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The sequencer encountered an error interacting with the world state.
    #[error(transparent)]
    WorldState(#[from] WorldStateError),
    /// The sequencer encountered an error interacting with an L2 data source.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The public processor failed outside of individual tx execution.
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    /// The block builder failed to assemble the block.
    #[error(transparent)]
    Builder(#[from] BuilderError),
}
