//! This library contains the sequencer, the block proposer loop of the proposer node.
//!
//! Once per polling tick the sequencer checks that local views have caught up with the L1
//! tip, asks the publisher whether this node is the elected proposer for the current slot,
//! assembles a candidate block from the tx pool under the slot's time budget, solicits
//! attestations from the validator committee, publishes the block to the rollup contract
//! and opportunistically claims a proof quote for a prior epoch.
//!
//! Every long-running step of a tick is gated by a per-phase deadline derived from the slot
//! duration; missing a deadline aborts the tick and the loop parks back in idle.

use alloy_primitives::B256;
use proposer_node_primitives::{
    BlockHeader, RollupConstants, Tx, VoteKind, GENESIS_ARCHIVE_ROOT,
};
use proposer_node_providers::{
    BlockBuilderFactory, BlockBuilderFn, DateProvider, GlobalVariablesBuilder, L1Publisher,
    L1ToL2MessageSource, L2BlockSource, PublicProcessorFactory, Slasher, TxPool,
    TxValidationPolicy, ValidatorClient, WorldState,
};
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    assembler::{BlockAssembler, BuildRequest},
    command::SequencerCommand,
    metrics::MetricsHandler,
    quotes::ProofQuoteBidder,
    state::StateMachine,
};

mod assembler;
mod attestations;
mod command;
mod sync;

pub use config::{SequencerConfig, SequencerConfigUpdate};
mod config;

pub use error::SequencerError;
mod error;

pub use handle::SequencerHandle;
mod handle;

mod metrics;
mod quotes;

pub use state::SequencerPhase;
mod state;

pub use timetable::TimeTable;
mod timetable;

/// The current status of the sequencer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SequencerStatus {
    /// The phase the sequencer is in.
    pub phase: SequencerPhase,
    /// Whether a flush is pending for the next built block.
    pub is_flushing: bool,
}

/// The collaborators the sequencer drives. Every one of them is an interface; test doubles
/// supply the same surface.
#[derive(Clone)]
pub struct SequencerDeps {
    /// The L1 publisher.
    pub publisher: Arc<dyn L1Publisher>,
    /// The validator client, when this node participates in attestation collection.
    pub validator_client: Option<Arc<dyn ValidatorClient>>,
    /// The pending-tx pool.
    pub pool: Arc<dyn TxPool>,
    /// The world state database.
    pub world_state: Arc<dyn WorldState>,
    /// The source of published L2 blocks.
    pub l2_block_source: Arc<dyn L2BlockSource>,
    /// The source of L1→L2 messages.
    pub l1_to_l2_message_source: Arc<dyn L1ToL2MessageSource>,
    /// The public processor factory.
    pub processor_factory: Arc<dyn PublicProcessorFactory>,
    /// The block builder factory.
    pub builder_factory: Arc<dyn BlockBuilderFactory>,
    /// The global variables builder.
    pub global_variables_builder: Arc<dyn GlobalVariablesBuilder>,
    /// The slashing payload producer, when slashing votes are enabled.
    pub slasher: Option<Arc<dyn Slasher>>,
    /// The clock slot time is measured against.
    pub date_provider: Arc<dyn DateProvider>,
}

impl std::fmt::Debug for SequencerDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencerDeps").finish_non_exhaustive()
    }
}

/// The sequencer is responsible for proposing new L2 blocks.
///
/// It is driven on a single task via [`Sequencer::run`], which services commands from the
/// [`SequencerHandle`] and fires the work loop at the configured polling interval. One tick
/// is in flight at a time; the phase is only ever mutated by this task.
pub struct Sequencer {
    publisher: Arc<dyn L1Publisher>,
    validator_client: Option<Arc<dyn ValidatorClient>>,
    pool: Arc<dyn TxPool>,
    world_state: Arc<dyn WorldState>,
    l2_block_source: Arc<dyn L2BlockSource>,
    l1_to_l2_message_source: Arc<dyn L1ToL2MessageSource>,
    global_variables_builder: Arc<dyn GlobalVariablesBuilder>,
    slasher: Option<Arc<dyn Slasher>>,
    date_provider: Arc<dyn DateProvider>,
    assembler: BlockAssembler,
    quote_bidder: ProofQuoteBidder,
    constants: RollupConstants,
    config: SequencerConfig,
    time_table: TimeTable,
    state: StateMachine,
    metrics: MetricsHandler,
    flushing: bool,
    poll_interval: Option<Interval>,
    command_rx: Option<mpsc::UnboundedReceiver<SequencerCommand>>,
}

impl Sequencer {
    /// Creates a new sequencer and the handle controlling it. Fails when the time table
    /// cannot be derived from the config and constants.
    pub fn new(
        deps: SequencerDeps,
        config: SequencerConfig,
        constants: RollupConstants,
    ) -> Result<(Self, SequencerHandle), SequencerError> {
        let time_table = TimeTable::new(
            config.enforce_time_table,
            constants.slot_duration,
            constants.ethereum_slot_duration,
            config.max_l1_tx_inclusion_time_into_slot,
        )?;

        let metrics = MetricsHandler::default();
        let assembler = BlockAssembler::new(
            deps.world_state.clone(),
            deps.pool.clone(),
            deps.l1_to_l2_message_source.clone(),
            deps.processor_factory.clone(),
            deps.builder_factory.clone(),
            metrics.sequencer_metrics(),
        );
        let quote_bidder = ProofQuoteBidder::new(deps.publisher.clone(), deps.pool.clone());

        if let Some(slasher) = &deps.slasher {
            deps.publisher.register_slash_payload_getter(slasher.clone());
        }
        if let Some(validator) = &deps.validator_client {
            validator.register_block_builder(validate_only_block_builder(
                assembler.clone(),
                deps.l2_block_source.clone(),
                &config,
            ));
        }

        let (to_sequencer_tx, command_rx) = mpsc::unbounded_channel();
        let sequencer = Self {
            publisher: deps.publisher,
            validator_client: deps.validator_client,
            pool: deps.pool,
            world_state: deps.world_state,
            l2_block_source: deps.l2_block_source,
            l1_to_l2_message_source: deps.l1_to_l2_message_source,
            global_variables_builder: deps.global_variables_builder,
            slasher: deps.slasher,
            date_provider: deps.date_provider,
            assembler,
            quote_bidder,
            constants,
            config,
            time_table,
            state: StateMachine::new(),
            metrics,
            flushing: false,
            poll_interval: None,
            command_rx: Some(command_rx),
        };
        Ok((sequencer, SequencerHandle::new(to_sequencer_tx)))
    }

    /// Drives the sequencer until every handle is dropped. Commands take priority over the
    /// polling tick; a tick runs to completion before the next command is serviced.
    pub async fn run(mut self) {
        let mut command_rx = self.command_rx.take().expect("run may only be called once");

        /// What woke the driver up.
        enum Wakeup {
            Command(Option<SequencerCommand>),
            Tick,
        }

        loop {
            let wakeup = tokio::select! {
                biased;
                command = command_rx.recv() => Wakeup::Command(command),
                _ = poll_tick(self.poll_interval.as_mut()) => Wakeup::Tick,
            };
            match wakeup {
                Wakeup::Command(Some(command)) => self.handle_command(command).await,
                Wakeup::Command(None) => {
                    debug!(
                        target: "proposer_node::sequencer",
                        "all sequencer handles dropped, shutting down"
                    );
                    break;
                }
                Wakeup::Tick => self.work().await,
            }
        }
    }

    async fn handle_command(&mut self, command: SequencerCommand) {
        match command {
            SequencerCommand::Start(tx) => {
                self.start();
                let _ = tx.send(());
            }
            SequencerCommand::Stop(tx) => {
                self.stop().await;
                let _ = tx.send(());
            }
            SequencerCommand::Restart(tx) => {
                self.restart();
                let _ = tx.send(());
            }
            SequencerCommand::Flush(tx) => {
                self.flushing = true;
                let _ = tx.send(());
            }
            SequencerCommand::Status(tx) => {
                let _ = tx.send(SequencerStatus {
                    phase: self.state.phase(),
                    is_flushing: self.flushing,
                });
            }
            SequencerCommand::UpdateConfig(update, tx) => {
                let _ = tx.send(self.apply_config_update(*update));
            }
        }
    }

    fn start(&mut self) {
        if self.poll_interval.is_some() {
            warn!(target: "proposer_node::sequencer", "sequencer is already running");
            return;
        }
        info!(
            target: "proposer_node::sequencer",
            polling_interval_ms = self.config.polling_interval_ms,
            "starting sequencer"
        );
        self.force_phase(SequencerPhase::Idle);
        self.poll_interval = Some(delayed_interval(self.config.polling_interval_ms));
    }

    async fn stop(&mut self) {
        if self.poll_interval.is_none() && self.state.phase() == SequencerPhase::Stopped {
            return;
        }
        info!(target: "proposer_node::sequencer", "stopping sequencer");
        if let Some(validator) = &self.validator_client {
            validator.stop().await;
        }
        self.poll_interval = None;
        if let Some(slasher) = &self.slasher {
            slasher.stop().await;
        }
        self.publisher.interrupt();
        self.force_phase(SequencerPhase::Stopped);
        info!(target: "proposer_node::sequencer", "sequencer stopped");
    }

    fn restart(&mut self) {
        info!(target: "proposer_node::sequencer", "restarting sequencer");
        self.publisher.restart();
        self.force_phase(SequencerPhase::Idle);
        self.poll_interval = Some(delayed_interval(self.config.polling_interval_ms));
    }

    fn apply_config_update(&mut self, update: SequencerConfigUpdate) -> Result<(), SequencerError> {
        let config = self.config.merged(update);
        // derive first so a rejected update leaves the active table untouched
        let time_table = TimeTable::new(
            config.enforce_time_table,
            self.constants.slot_duration,
            self.constants.ethereum_slot_duration,
            config.max_l1_tx_inclusion_time_into_slot,
        )?;

        if let Some(payload) = &config.governance_proposer_payload {
            self.publisher.set_governance_payload(payload.clone());
        }
        if let Some(slasher) = &self.slasher {
            self.publisher.register_slash_payload_getter(slasher.clone());
        }
        if self.poll_interval.is_some() &&
            config.polling_interval_ms != self.config.polling_interval_ms
        {
            self.poll_interval = Some(delayed_interval(config.polling_interval_ms));
        }

        self.config = config;
        self.time_table = time_table;
        Ok(())
    }

    /// A tick of the work loop. A missed deadline is expected behavior under load and logged
    /// as a warning; anything else is an error. The tick always parks back in idle.
    async fn work(&mut self) {
        match self.do_real_work().await {
            Ok(()) => {}
            Err(err @ SequencerError::TooSlow { .. }) => {
                warn!(
                    target: "proposer_node::sequencer",
                    %err,
                    "sequencer missed its slot budget, aborting tick"
                );
            }
            Err(err @ SequencerError::TooFewTxs { .. }) => {
                debug!(target: "proposer_node::sequencer", %err, "not building a block this tick");
            }
            Err(err) => {
                error!(target: "proposer_node::sequencer", %err, "sequencer tick failed");
            }
        }
        self.force_phase(SequencerPhase::Idle);
    }

    #[tracing::instrument(target = "proposer_node::sequencer", name = "work", skip_all)]
    async fn do_real_work(&mut self) -> Result<(), SequencerError> {
        self.set_phase(SequencerPhase::Synchronizing, 0, false)?;
        if !self.is_synced().await? {
            debug!(
                target: "proposer_node::sequencer",
                "local views are not caught up with the L1 tip, skipping tick"
            );
            return Ok(());
        }

        self.set_phase(SequencerPhase::ProposerCheck, 0, false)?;
        let tip = self.l2_block_source.get_latest_block().await?;
        let (next_block_number, tip_archive, historical_header) = match tip {
            Some(block) => (block.number() + 1, block.archive, Some(block.header)),
            None => (1, GENESIS_ARCHIVE_ROOT, None),
        };

        let slot = match self.may_propose_block(tip_archive, next_block_number).await {
            Ok(slot) => slot,
            Err(err) => {
                debug!(
                    target: "proposer_node::sequencer",
                    %err,
                    block_number = next_block_number,
                    "not proposing this tick"
                );
                return Ok(());
            }
        };
        debug!(
            target: "proposer_node::sequencer",
            slot,
            block_number = next_block_number,
            "elected proposer for slot"
        );

        let global_variables = self
            .global_variables_builder
            .build_global_variables(
                next_block_number,
                self.config.coinbase,
                self.config.fee_recipient,
                slot,
            )
            .await?;

        self.cast_votes(slot, global_variables.timestamp);

        let pending = self.pool.pending_tx_count().await?;
        if pending < self.config.min_txs_per_block && !self.flushing {
            debug!(
                target: "proposer_node::sequencer",
                pending,
                min = self.config.min_txs_per_block,
                "not enough pending txs, attempting proof quote claim instead"
            );
            return self.quote_bidder.claim_if_available(slot).await;
        }

        self.set_phase(SequencerPhase::InitializingProposal, slot, false)?;
        let proposal_header = BlockHeader::empty_at(tip_archive, global_variables);
        let txs = self.pool.pending_txs(self.config.max_txs_per_block).await?;

        self.build_block_and_attempt_to_publish(txs, proposal_header, historical_header, slot)
            .await
    }

    /// Asks the publisher whether this node may propose on top of `tip_archive` at the next
    /// L1 block and that the assigned block number matches the locally derived one.
    async fn may_propose_block(
        &self,
        tip_archive: B256,
        expected_block_number: u64,
    ) -> Result<u64, SequencerError> {
        let (slot, block_number) = self
            .publisher
            .can_propose_at_next_eth_block(tip_archive)
            .await
            .map_err(|err| SequencerError::NotEligible(err.to_string()))?;
        if block_number != expected_block_number {
            return Err(SequencerError::ProposerMismatch {
                expected: expected_block_number,
                actual: block_number,
            });
        }
        Ok(slot)
    }

    /// Dispatches the governance and slashing votes for the slot. Fire and forget: vote
    /// failures never hold up the block.
    fn cast_votes(&self, slot: u64, timestamp: u64) {
        for kind in [VoteKind::Governance, VoteKind::Slashing] {
            let publisher = self.publisher.clone();
            tokio::spawn(async move {
                if let Err(err) = publisher.cast_vote(slot, timestamp, kind).await {
                    debug!(target: "proposer_node::sequencer", %err, ?kind, "failed to cast vote");
                }
            });
        }
    }

    /// Builds the block and publishes it, raising on any partial failure so the tick aborts
    /// cleanly; the world state forks taken by the assembler are the unit of rollback.
    async fn build_block_and_attempt_to_publish(
        &mut self,
        txs: Vec<Tx>,
        proposal_header: BlockHeader,
        historical_header: Option<BlockHeader>,
        slot: u64,
    ) -> Result<(), SequencerError> {
        let flushing = self.flushing;
        let result = self.try_build_and_publish(txs, proposal_header, historical_header, slot, flushing).await;

        // the flush request is consumed by this build attempt, whatever its outcome
        self.flushing = false;

        if let Err(err) = &result {
            // a timing abort is not a failed build
            if !matches!(err, SequencerError::TooSlow { .. }) {
                self.metrics.record_failed_block();
            }
        }
        result
    }

    async fn try_build_and_publish(
        &mut self,
        txs: Vec<Tx>,
        proposal_header: BlockHeader,
        historical_header: Option<BlockHeader>,
        slot: u64,
        flushing: bool,
    ) -> Result<(), SequencerError> {
        self.publisher.validate_block_for_submission(&proposal_header).await.map_err(|err| {
            SequencerError::PublisherRejected { stage: "pre-build", reason: err.to_string() }
        })?;

        self.set_phase(SequencerPhase::CreatingBlock, slot, false)?;

        // the quote for the claimable prior epoch is collected while the block builds
        let quote_bidder = self.quote_bidder.clone();
        let quote_handle = tokio::spawn(async move { quote_bidder.best_quote(slot).await });

        let global_variables = proposal_header.global_variables;
        let request = BuildRequest {
            global_variables,
            historical_header,
            deadline_ms: self.tx_processing_deadline_ms(slot),
            max_transactions: self.config.max_txs_per_block,
            max_block_size_in_bytes: self.config.max_block_size_in_bytes,
            max_block_da_gas: self.config.max_block_da_gas,
            max_block_l2_gas: self.config.max_block_l2_gas,
            min_transactions: self.config.min_txs_per_block,
            policy: self.tx_validation_policy(),
            validate_only: false,
            flushing,
        };
        let outcome = self.assembler.build_block(txs, request).await?;
        info!(
            target: "proposer_node::sequencer",
            block_number = outcome.block.number(),
            slot,
            num_txs = outcome.num_txs,
            num_msgs = outcome.num_msgs,
            processor_duration = ?outcome.processor_duration,
            "built block"
        );

        let block = outcome.block;
        let attestations = self.collect_attestations(&block, slot).await?;

        let proof_quote = match quote_handle.await {
            Ok(quote) => quote,
            Err(err) => {
                warn!(
                    target: "proposer_node::sequencer",
                    %err,
                    "proof quote collection task failed"
                );
                None
            }
        };

        self.set_phase(SequencerPhase::PublishingBlock, slot, false)?;
        self.publisher.validate_block_for_submission(&block.header).await.map_err(|err| {
            SequencerError::PublisherRejected { stage: "pre-publish", reason: err.to_string() }
        })?;

        let published = self
            .publisher
            .propose_l2_block(
                &block,
                attestations.as_deref().unwrap_or(&[]),
                &block.tx_hashes,
                proof_quote.as_ref(),
            )
            .await?;
        if !published {
            return Err(SequencerError::PublisherRejected {
                stage: "propose",
                reason: "block submission was not included".to_string(),
            });
        }

        self.metrics.record_published_block(outcome.build_start.elapsed());
        info!(
            target: "proposer_node::sequencer",
            block_number = block.number(),
            slot,
            attestations = attestations.map(|a| a.len()).unwrap_or(0),
            "published block"
        );
        Ok(())
    }

    /// The absolute wall-clock deadline for tx processing, when the time table is enforced.
    fn tx_processing_deadline_ms(&self, slot: u64) -> Option<u64> {
        self.time_table.enforced().then(|| {
            let offset_s = self.time_table.deadline(SequencerPhase::CreatingBlock) +
                self.time_table.process_tx_time();
            self.constants.slot_start_timestamp(slot) * 1000 + (offset_s * 1000.0) as u64
        })
    }

    fn tx_validation_policy(&self) -> TxValidationPolicy {
        TxValidationPolicy {
            allowed_in_setup: self.config.allowed_in_setup.clone(),
            enforce_fees: self.config.enforce_fees,
        }
    }

    fn set_phase(
        &mut self,
        phase: SequencerPhase,
        slot: u64,
        force: bool,
    ) -> Result<(), SequencerError> {
        let buffer = self.state.set(
            phase,
            slot,
            force,
            &self.time_table,
            &self.constants,
            self.date_provider.now_ms(),
        )?;
        if let Some(buffer_ms) = buffer {
            self.metrics.record_state_transition_buffer(phase, buffer_ms);
        }
        Ok(())
    }

    /// Forced transitions to unrestricted phases never fail the deadline gate.
    fn force_phase(&mut self, phase: SequencerPhase) {
        let _ = self.set_phase(phase, 0, true);
    }
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("constants", &self.constants)
            .field("config", &self.config)
            .field("phase", &self.state.phase())
            .field("flushing", &self.flushing)
            .finish_non_exhaustive()
    }
}

/// The block builder the validator client re-executes proposals with: a validate-only build
/// on a fresh world state fork, with the minimum-tx gate disabled.
fn validate_only_block_builder(
    assembler: BlockAssembler,
    l2_block_source: Arc<dyn L2BlockSource>,
    config: &SequencerConfig,
) -> BlockBuilderFn {
    let max_transactions = config.max_txs_per_block;
    let max_block_size_in_bytes = config.max_block_size_in_bytes;
    let max_block_da_gas = config.max_block_da_gas;
    let max_block_l2_gas = config.max_block_l2_gas;
    let policy = TxValidationPolicy {
        allowed_in_setup: config.allowed_in_setup.clone(),
        enforce_fees: config.enforce_fees,
    };

    Arc::new(move |txs, global_variables| {
        let assembler = assembler.clone();
        let l2_block_source = l2_block_source.clone();
        let policy = policy.clone();
        Box::pin(async move {
            let historical_header =
                l2_block_source.get_latest_block().await?.map(|block| block.header);
            let request = BuildRequest {
                global_variables,
                historical_header,
                deadline_ms: None,
                max_transactions,
                max_block_size_in_bytes,
                max_block_da_gas,
                max_block_l2_gas,
                min_transactions: 0,
                policy,
                validate_only: true,
                flushing: false,
            };
            let outcome = assembler.build_block(txs, request).await?;
            Ok(outcome.block)
        })
    })
}

/// Waits for the next tick, or forever when polling is not armed.
async fn poll_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Creates a delayed interval that will not skip ticks if the interval is missed but will
/// delay the next tick until the interval has passed.
fn delayed_interval(interval_ms: u64) -> Interval {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
