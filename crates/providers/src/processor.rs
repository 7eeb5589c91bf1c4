use crate::StateFork;
use alloy_primitives::Address;
use proposer_node_primitives::{BlockHeader, FailedTx, GlobalVariables, ProcessedTx, Tx};
use std::sync::Arc;

/// An error that occurred inside the public function processor.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The processor failed outside of individual tx execution.
    #[error("public processor error: {0}")]
    Execution(String),
}

/// Limits the processor enforces while executing a batch of txs.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ProcessorLimits {
    /// Absolute unix deadline in milliseconds; the processor stops mid-batch when reached.
    pub deadline_ms: Option<u64>,
    /// Maximum number of txs to process.
    pub max_transactions: Option<usize>,
    /// Maximum cumulative tx size in bytes.
    pub max_block_size_in_bytes: Option<usize>,
    /// Maximum DA gas the block may consume.
    pub max_block_da_gas: Option<u64>,
    /// Maximum L2 gas the block may consume.
    pub max_block_l2_gas: Option<u64>,
}

/// The validation policy forwarded to the processor's tx validators.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TxValidationPolicy {
    /// Contract addresses allowed to be called during tx setup.
    pub allowed_in_setup: Vec<Address>,
    /// Whether txs must pay fees to be included.
    pub enforce_fees: bool,
}

/// Creates public processors bound to a world state fork.
pub trait PublicProcessorFactory: Send + Sync {
    /// Returns a processor executing against `fork` on top of `historical_header` with the
    /// given global variables.
    fn create(
        &self,
        fork: Arc<dyn StateFork>,
        historical_header: Option<BlockHeader>,
        global_variables: GlobalVariables,
    ) -> Box<dyn PublicProcessor>;
}

/// Executes public functions for a batch of txs against a world state fork.
#[async_trait::async_trait]
pub trait PublicProcessor: Send + Sync {
    /// Processes the txs under the given limits and validation policy. Returns the txs that
    /// executed successfully and the ones that failed, in order. The processor owns stopping
    /// mid-tx when the deadline is reached.
    async fn process(
        &mut self,
        txs: Vec<Tx>,
        limits: ProcessorLimits,
        policy: TxValidationPolicy,
    ) -> Result<(Vec<ProcessedTx>, Vec<FailedTx>), ProcessorError>;
}
