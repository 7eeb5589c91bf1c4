//! Primitive types for the proposer node.

pub use block::{BlockHeader, L2Block, L2BlockId, L2Tips, GENESIS_ARCHIVE_ROOT};
mod block;

pub use constants::RollupConstants;
mod constants;

pub use globals::GlobalVariables;
mod globals;

pub use proposal::{Attestation, BlockProposal, VoteKind};
mod proposal;

pub use quote::EpochProofQuote;
mod quote;

pub use transaction::{FailedTx, ProcessedTx, Tx, TxHash};
mod transaction;
