use alloy_primitives::{Address, Bytes};
use core::cmp::Ordering;

/// A signed bid to prove a prior epoch, priced in basis points of the epoch rewards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EpochProofQuote {
    /// The epoch the prover offers to prove.
    pub epoch_to_prove: u64,
    /// The last slot at which the quote may be claimed.
    pub valid_until_slot: u64,
    /// The fee asked by the prover, in basis points.
    pub basis_point_fee: u64,
    /// The prover offering the quote.
    pub prover: Address,
    /// The opaque signed payload submitted to the rollup contract.
    pub signature: Bytes,
}

impl PartialOrd for EpochProofQuote {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EpochProofQuote {
    fn cmp(&self, other: &Self) -> Ordering {
        self.basis_point_fee
            .cmp(&other.basis_point_fee)
            .then_with(|| self.epoch_to_prove.cmp(&other.epoch_to_prove))
            .then_with(|| self.valid_until_slot.cmp(&other.valid_until_slot))
            .then_with(|| self.prover.cmp(&other.prover))
            .then_with(|| self.signature.cmp(&other.signature))
    }
}
