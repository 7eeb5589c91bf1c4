use crate::{error::SequencerError, metrics::SequencerMetrics};
use alloy_primitives::B256;
use proposer_node_providers::{
    BlockBuilderFactory, L1ToL2MessageSource, ProcessorLimits, PublicProcessorFactory, StateFork,
    TxPool, TxValidationPolicy, WorldState,
};
use proposer_node_primitives::{BlockHeader, GlobalVariables, L2Block, Tx, TxHash};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

/// How long closed-over forks are kept alive after a build, so a tx interrupted by the
/// processing deadline is not dropped onto a closed fork.
pub(crate) const FORK_CLOSE_GRACE: Duration = Duration::from_secs(5);

/// The inputs of a single block build.
#[derive(Debug, Clone)]
pub(crate) struct BuildRequest {
    /// The global variables of the block being built.
    pub(crate) global_variables: GlobalVariables,
    /// The header of the parent block, `None` at genesis.
    pub(crate) historical_header: Option<BlockHeader>,
    /// Absolute unix deadline in milliseconds for tx processing, when enforced.
    pub(crate) deadline_ms: Option<u64>,
    /// The maximum number of txs to include.
    pub(crate) max_transactions: usize,
    /// The maximum cumulative tx size in bytes.
    pub(crate) max_block_size_in_bytes: usize,
    /// The maximum DA gas the block may consume.
    pub(crate) max_block_da_gas: Option<u64>,
    /// The maximum L2 gas the block may consume.
    pub(crate) max_block_l2_gas: Option<u64>,
    /// The minimum number of processed txs the block must carry.
    pub(crate) min_transactions: usize,
    /// The validation policy forwarded to the processor's tx validators.
    pub(crate) policy: TxValidationPolicy,
    /// Build for validation only: the minimum-tx gate is skipped.
    pub(crate) validate_only: bool,
    /// A flush was requested: the minimum-tx gate is skipped for this build.
    pub(crate) flushing: bool,
}

/// The outputs of a completed block build.
#[derive(Debug)]
pub(crate) struct BuildOutcome {
    /// The completed block.
    pub(crate) block: L2Block,
    /// How long the public processor ran.
    pub(crate) processor_duration: Duration,
    /// The number of L1→L2 messages included.
    pub(crate) num_msgs: usize,
    /// The number of txs included.
    pub(crate) num_txs: usize,
    /// When the build started, for the publication timer.
    pub(crate) build_start: Instant,
}

/// Assembles candidate blocks: forks world state, runs the public processor under the slot
/// deadline, drops failed txs from the pool and drives the block builder's tree inserter.
#[derive(Clone)]
pub(crate) struct BlockAssembler {
    world_state: Arc<dyn WorldState>,
    pool: Arc<dyn TxPool>,
    message_source: Arc<dyn L1ToL2MessageSource>,
    processor_factory: Arc<dyn PublicProcessorFactory>,
    builder_factory: Arc<dyn BlockBuilderFactory>,
    metrics: SequencerMetrics,
}

impl BlockAssembler {
    pub(crate) fn new(
        world_state: Arc<dyn WorldState>,
        pool: Arc<dyn TxPool>,
        message_source: Arc<dyn L1ToL2MessageSource>,
        processor_factory: Arc<dyn PublicProcessorFactory>,
        builder_factory: Arc<dyn BlockBuilderFactory>,
        metrics: SequencerMetrics,
    ) -> Self {
        Self { world_state, pool, message_source, processor_factory, builder_factory, metrics }
    }

    /// Builds a block from the given candidate txs.
    ///
    /// Two independent forks of the world state are taken: one for the public processor and
    /// one for the block builder. Both are released after [`FORK_CLOSE_GRACE`] on every exit
    /// path; everything mutated through them is discarded with them.
    pub(crate) async fn build_block(
        &self,
        txs: Vec<Tx>,
        request: BuildRequest,
    ) -> Result<BuildOutcome, SequencerError> {
        let block_number = request.global_variables.block_number;

        let l1_to_l2_messages = self.message_source.get_l1_to_l2_messages(block_number).await?;
        self.world_state.sync_immediate(block_number.saturating_sub(1)).await?;

        let processor_fork = self.world_state.fork().await?;
        let builder_fork = match self.world_state.fork().await {
            Ok(fork) => fork,
            Err(err) => {
                close_forks_after_grace(vec![processor_fork]);
                return Err(err.into());
            }
        };

        let forks = vec![processor_fork.clone(), builder_fork.clone()];
        let result =
            self.build_on_forks(txs, request, l1_to_l2_messages, processor_fork, builder_fork).await;
        close_forks_after_grace(forks);

        result
    }

    async fn build_on_forks(
        &self,
        txs: Vec<Tx>,
        request: BuildRequest,
        l1_to_l2_messages: Vec<B256>,
        processor_fork: Arc<dyn StateFork>,
        builder_fork: Arc<dyn StateFork>,
    ) -> Result<BuildOutcome, SequencerError> {
        let build_start = Instant::now();
        let num_candidate_txs = txs.len();

        let mut processor = self.processor_factory.create(
            processor_fork,
            request.historical_header.clone(),
            request.global_variables,
        );
        let mut builder = self.builder_factory.create(builder_fork);
        builder.start_new_block(request.global_variables, l1_to_l2_messages.clone()).await?;

        let limits = ProcessorLimits {
            deadline_ms: request.deadline_ms,
            max_transactions: Some(request.max_transactions),
            max_block_size_in_bytes: Some(request.max_block_size_in_bytes),
            max_block_da_gas: request.max_block_da_gas,
            max_block_l2_gas: request.max_block_l2_gas,
        };
        let processing_start = Instant::now();
        let (processed, failed) = processor.process(txs, limits, request.policy.clone()).await?;
        let processor_duration = processing_start.elapsed();
        debug!(
            target: "proposer_node::sequencer",
            processed = processed.len(),
            failed = failed.len(),
            candidates = num_candidate_txs,
            ?processor_duration,
            "processed txs"
        );

        if !failed.is_empty() {
            let hashes: Vec<TxHash> = failed.iter().map(|failed| failed.tx.hash).collect();
            warn!(
                target: "proposer_node::sequencer",
                count = hashes.len(),
                "dropping failed txs from the pool"
            );
            self.pool.delete_txs(hashes).await?;
        }

        if !request.validate_only &&
            !request.flushing &&
            processed.len() < request.min_transactions
        {
            return Err(SequencerError::TooFewTxs {
                available: processed.len(),
                min: request.min_transactions,
            });
        }

        let num_txs = processed.len();
        let insertion_start = Instant::now();
        builder.add_txs(processed).await?;
        self.metrics.tree_insertion_duration.record(insertion_start.elapsed().as_micros() as f64);

        let block = builder.set_block_completed().await?;

        Ok(BuildOutcome {
            block,
            processor_duration,
            num_msgs: l1_to_l2_messages.len(),
            num_txs,
            build_start,
        })
    }
}

impl std::fmt::Debug for BlockAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockAssembler").finish_non_exhaustive()
    }
}

/// Releases the forks after [`FORK_CLOSE_GRACE`]. Closing is best effort; failures are
/// logged and the forks are abandoned.
fn close_forks_after_grace(forks: Vec<Arc<dyn StateFork>>) {
    tokio::spawn(async move {
        tokio::time::sleep(FORK_CLOSE_GRACE).await;
        for fork in forks {
            if let Err(err) = fork.close().await {
                warn!(
                    target: "proposer_node::sequencer",
                    %err,
                    block_number = fork.block_number(),
                    "failed to close world state fork"
                );
            }
        }
    });
}
