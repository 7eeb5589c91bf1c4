use crate::{GlobalVariables, TxHash};
use alloy_primitives::B256;
use core::cmp::Ordering;
use std::fmt;

/// The archive root the rollup contract expects as the parent of block 1.
pub const GENESIS_ARCHIVE_ROOT: B256 = B256::with_last_byte(1);

/// Information about an L2 block.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct L2BlockId {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
}

impl L2BlockId {
    /// Returns a new instance of [`L2BlockId`].
    pub const fn new(number: u64, hash: B256) -> Self {
        Self { number, hash }
    }
}

impl PartialOrd for L2BlockId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.number.partial_cmp(&other.number)
    }
}

impl fmt::Display for L2BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L2BlockId {{ number: {}, hash: {} }}", self.number, self.hash)
    }
}

/// The tips of the L2 chain as seen by a block source.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct L2Tips {
    /// The latest block, if any block has been published.
    pub latest: Option<L2BlockId>,
    /// The latest proven block.
    pub proven: Option<L2BlockId>,
    /// The latest finalized block.
    pub finalized: Option<L2BlockId>,
}

/// The header of an L2 block.
///
/// A proposal header is built with [`BlockHeader::empty_at`] before any tx has been
/// processed; the block builder fills in the commitments when the block is completed.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockHeader {
    /// The archive root of the parent block this block builds on.
    pub last_archive: B256,
    /// Commitment to the tx effects included in the block.
    pub txs_effects_hash: B256,
    /// Commitment to the L2→L1 messages emitted by the block.
    pub out_hash: B256,
    /// Commitment to the world state after the block.
    pub state_reference: B256,
    /// The global variables the block was built with.
    pub global_variables: GlobalVariables,
}

impl BlockHeader {
    /// Returns a proposal header on top of `last_archive` with zeroed commitments.
    pub fn empty_at(last_archive: B256, global_variables: GlobalVariables) -> Self {
        Self { last_archive, global_variables, ..Default::default() }
    }

    /// The number of the block this header belongs to.
    pub const fn block_number(&self) -> u64 {
        self.global_variables.block_number
    }

    /// The slot the block was proposed in.
    pub const fn slot_number(&self) -> u64 {
        self.global_variables.slot_number
    }
}

/// A complete L2 block as returned by the block builder and consumed by the publisher.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct L2Block {
    /// The archive root after this block.
    pub archive: B256,
    /// The block header.
    pub header: BlockHeader,
    /// The hashes of the txs included in the block.
    pub tx_hashes: Vec<TxHash>,
}

impl L2Block {
    /// The block number.
    pub const fn number(&self) -> u64 {
        self.header.global_variables.block_number
    }

    /// Returns the [`L2BlockId`] for this block, identified by its archive root.
    pub fn id(&self) -> L2BlockId {
        L2BlockId::new(self.number(), self.archive)
    }
}
