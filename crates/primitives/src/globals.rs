use alloy_primitives::Address;

/// The global variables an L2 block is built and executed against.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlobalVariables {
    /// The chain id of the rollup.
    pub chain_id: u64,
    /// The version of the rollup contract.
    pub version: u64,
    /// The number of the block.
    pub block_number: u64,
    /// The L2 slot the block is proposed in.
    pub slot_number: u64,
    /// The unix timestamp in seconds of the slot start.
    pub timestamp: u64,
    /// The coinbase address collecting block rewards.
    pub coinbase: Address,
    /// The recipient of tx fees.
    pub fee_recipient: Address,
}
