use crate::SourceError;
use alloy_primitives::Address;
use proposer_node_primitives::GlobalVariables;

/// Builds the global variables a new block is executed against, deriving timestamps and
/// chain parameters from the L1 view.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait GlobalVariablesBuilder: Send + Sync {
    /// Returns the global variables for the given block at the given slot.
    async fn build_global_variables(
        &self,
        block_number: u64,
        coinbase: Address,
        fee_recipient: Address,
        slot: u64,
    ) -> Result<GlobalVariables, SourceError>;
}
