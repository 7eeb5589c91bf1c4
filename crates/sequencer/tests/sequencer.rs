//! e2e tests for the sequencer work loop, driven over the provider mocks with a
//! controllable clock.

use alloy_primitives::{Address, Bytes, B256};
use proposer_node_primitives::{
    Attestation, BlockHeader, GlobalVariables, L2Block, RollupConstants, GENESIS_ARCHIVE_ROOT,
};
use proposer_node_providers::test_utils::{
    test_quote, test_tx, MockBlockBuilderFactory, MockGlobalVariablesBuilder,
    MockL1ToL2MessageSource, MockL2BlockSource, MockPublicProcessorFactory, MockPublisher,
    MockSlasher, MockTxPool, MockValidatorClient, MockWorldState, TestClock,
};
use proposer_node_sequencer::{
    Sequencer, SequencerConfig, SequencerConfigUpdate, SequencerDeps, SequencerHandle,
    SequencerPhase,
};
use std::{sync::Arc, time::Duration};

/// S=24, E=12: with a 4s L1 inclusion allowance the restricted deadlines are
/// 2s / 3s / 8s / 16s into the slot.
const CONSTANTS: RollupConstants = RollupConstants::new(24, 12, 1_700_000_000);

/// The slot the publisher assigns to this node in every test.
const SLOT: u64 = 10;

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct TestHarness {
    handle: SequencerHandle,
    clock: Arc<TestClock>,
    publisher: Arc<MockPublisher>,
    validator: Arc<MockValidatorClient>,
    pool: Arc<MockTxPool>,
    world_state: Arc<MockWorldState>,
    processor_factory: Arc<MockPublicProcessorFactory>,
    slasher: Arc<MockSlasher>,
}

impl TestHarness {
    async fn start(&self) -> eyre::Result<()> {
        self.handle.start().await?;
        Ok(())
    }
}

fn test_config() -> SequencerConfig {
    SequencerConfig {
        // large enough that a test only sees the immediate tick fired on start/restart
        polling_interval_ms: 3_600_000,
        enforce_time_table: true,
        max_l1_tx_inclusion_time_into_slot: 4,
        ..Default::default()
    }
}

fn tip_block(number: u64) -> L2Block {
    L2Block {
        archive: B256::repeat_byte(0x22),
        header: BlockHeader {
            global_variables: GlobalVariables { block_number: number, ..Default::default() },
            ..Default::default()
        },
        tx_hashes: vec![],
    }
}

fn committee(size: u8) -> Vec<Address> {
    (1..=size).map(Address::repeat_byte).collect()
}

fn attestation(seed: u8) -> Attestation {
    Attestation { signer: Address::repeat_byte(seed), signature: Bytes::from(vec![seed; 65]) }
}

/// Sets up a sequencer over fresh mocks, with every view synced to `latest`. The returned
/// sequencer is spawned but not started, so tests can finish scripting the mocks first.
fn setup(config: SequencerConfig, latest: Option<L2Block>) -> TestHarness {
    setup_with_constants(config, latest, CONSTANTS)
}

fn setup_with_constants(
    config: SequencerConfig,
    latest: Option<L2Block>,
    constants: RollupConstants,
) -> TestHarness {
    init_test_tracing();

    let latest_number = latest.as_ref().map(|block| block.number()).unwrap_or(0);
    let synced_to = latest.as_ref().map(|block| block.id()).unwrap_or_default();

    // one second into the assigned slot
    let clock = Arc::new(TestClock::new(constants.slot_start_timestamp(SLOT) * 1000 + 1000));
    let publisher = Arc::new(MockPublisher::new(SLOT, latest_number + 1));
    let validator = Arc::new(MockValidatorClient::new(vec![]));
    let pool = Arc::new(MockTxPool::new(vec![], latest_number));
    let world_state = Arc::new(MockWorldState::new(synced_to));
    let block_source = Arc::new(MockL2BlockSource::new(latest));
    let message_source = Arc::new(MockL1ToL2MessageSource::new(latest_number));
    let processor_factory = Arc::new(MockPublicProcessorFactory::default());
    let builder_factory = Arc::new(MockBlockBuilderFactory::default());
    let globals_builder = Arc::new(MockGlobalVariablesBuilder::new(constants));
    let slasher = Arc::new(MockSlasher::default());

    let deps = SequencerDeps {
        publisher: publisher.clone(),
        validator_client: Some(validator.clone()),
        pool: pool.clone(),
        world_state: world_state.clone(),
        l2_block_source: block_source,
        l1_to_l2_message_source: message_source,
        processor_factory: processor_factory.clone(),
        builder_factory,
        global_variables_builder: globals_builder,
        slasher: Some(slasher.clone()),
        date_provider: clock.clone(),
    };
    let (sequencer, handle) = Sequencer::new(deps, config, constants).expect("valid test config");
    tokio::spawn(sequencer.run());

    TestHarness {
        handle,
        clock,
        publisher,
        validator,
        pool,
        world_state,
        processor_factory,
        slasher,
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(60), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

#[tokio::test(start_paused = true)]
async fn happy_path_publishes_block_with_ordered_attestations() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1), test_tx(2), test_tx(3)];
    *harness.publisher.committee.lock().unwrap() = committee(4);
    // three signatures out of committee order
    *harness.validator.attestations.lock().unwrap() =
        vec![attestation(3), attestation(1), attestation(2)];

    harness.start().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;

    let proposed = harness.publisher.proposed_blocks();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].block.number(), 3);
    assert_eq!(proposed[0].block.tx_hashes.len(), 3);
    // attestations are reordered to committee order
    assert_eq!(
        proposed[0].attestations.iter().map(|a| a.signer).collect::<Vec<_>>(),
        vec![Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)]
    );
    // the threshold requested was 2/3 of the committee of 4, plus one
    assert_eq!(harness.validator.collect_calls()[0].1, 3);
    // the proposal header was validated pre-build and the final header pre-publish
    assert_eq!(harness.publisher.validated_headers().len(), 2);

    // status commands are serviced between ticks, so this resolves once the tick is done
    assert_eq!(harness.handle.status().await?.phase, SequencerPhase::Idle);

    // governance and slashing votes were dispatched alongside the build
    wait_until(|| harness.publisher.votes().len() == 2).await;
    let votes = harness.publisher.votes();
    assert!(votes.iter().all(|(slot, timestamp, _)| {
        *slot == SLOT && *timestamp == CONSTANTS.slot_start_timestamp(SLOT)
    }));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn too_slow_during_attestation_collection_aborts_the_tick() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];
    *harness.publisher.committee.lock().unwrap() = committee(4);
    *harness.validator.attestations.lock().unwrap() = vec![attestation(1)];
    // processing pushes the clock past the 8s CollectingAttestations deadline
    let clock = harness.clock.clone();
    *harness.processor_factory.on_process.lock().unwrap() = Some(Arc::new(move || {
        clock.set_ms(CONSTANTS.slot_start_timestamp(SLOT) * 1000 + 9_000);
    }));

    harness.start().await?;

    // both forks taken by the build are released after the grace window
    wait_until(|| {
        harness.world_state.forks().len() == 2 && harness.world_state.open_fork_count() == 0
    })
    .await;

    // no attestations were solicited and nothing was published
    assert!(harness.validator.collect_calls().is_empty());
    assert!(harness.publisher.proposed_blocks().is_empty());
    assert_eq!(harness.handle.status().await?.phase, SequencerPhase::Idle);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_txs_are_dropped_from_the_pool() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    let txs: Vec<_> = (1..=5).map(test_tx).collect();
    let failing = vec![txs[1].hash, txs[3].hash];
    *harness.pool.txs.lock().unwrap() = txs;
    *harness.processor_factory.failing_tx_hashes.lock().unwrap() = failing.clone();

    harness.start().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;

    // exactly one deletion batch carrying exactly the failed hashes
    assert_eq!(harness.pool.deletions(), vec![failing]);
    assert_eq!(harness.publisher.proposed_blocks()[0].block.tx_hashes.len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn flush_overrides_the_tx_minimum_and_is_consumed() -> eyre::Result<()> {
    let config = SequencerConfig { min_txs_per_block: 10, ..test_config() };
    let harness = setup(config, Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1), test_tx(2)];

    harness.start().await?;
    // the pool is below the minimum: the first tick casts its votes but builds nothing
    wait_until(|| harness.publisher.votes().len() == 2).await;
    assert_eq!(harness.handle.status().await?.phase, SequencerPhase::Idle);
    assert!(harness.world_state.sync_calls().is_empty());
    assert!(harness.publisher.proposed_blocks().is_empty());

    harness.handle.flush().await?;
    assert!(harness.handle.status().await?.is_flushing);

    // re-arm polling to fire the next tick immediately
    harness.handle.restart().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;

    assert_eq!(harness.publisher.proposed_blocks()[0].block.tx_hashes.len(), 2);
    assert!(!harness.handle.status().await?.is_flushing);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cheapest_valid_proof_quote_is_attached_to_the_block() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];
    *harness.publisher.claimable_epoch.lock().unwrap() = Some(7);
    harness.pool.quotes.lock().unwrap().insert(
        7,
        vec![
            test_quote(7, SLOT + 10, 100, 0x51),
            test_quote(7, SLOT + 10, 50, 0x52),
            test_quote(7, SLOT + 10, 75, 0x53),
        ],
    );
    // the publisher accepts two of the three quotes
    *harness.publisher.valid_quote_provers.lock().unwrap() =
        Some(vec![Address::repeat_byte(0x52), Address::repeat_byte(0x53)]);

    harness.start().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;

    let quote = harness.publisher.proposed_blocks()[0]
        .proof_quote
        .clone()
        .expect("quote attached to submission");
    assert_eq!(quote.basis_point_fee, 50);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn below_minimum_pool_claims_the_proof_right_instead() -> eyre::Result<()> {
    let config = SequencerConfig { min_txs_per_block: 10, ..test_config() };
    let harness = setup(config, Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];
    *harness.publisher.claimable_epoch.lock().unwrap() = Some(7);
    harness.pool.quotes.lock().unwrap().insert(7, vec![test_quote(7, SLOT + 10, 80, 0x51)]);

    harness.start().await?;
    wait_until(|| !harness.publisher.claims().is_empty()).await;

    assert_eq!(harness.publisher.claims()[0].basis_point_fee, 80);
    assert!(harness.publisher.proposed_blocks().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_committee_publishes_without_attestations() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];

    harness.start().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;

    assert!(harness.publisher.proposed_blocks()[0].attestations.is_empty());
    assert!(harness.validator.collect_calls().is_empty());
    assert!(harness.validator.broadcasts().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn genesis_builds_block_one_on_the_genesis_archive_root() -> eyre::Result<()> {
    let harness = setup(test_config(), None);
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];

    harness.start().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;

    let proposed = &harness.publisher.proposed_blocks()[0];
    assert_eq!(proposed.block.number(), 1);
    // the proposal header validated pre-build extends the genesis archive root
    assert_eq!(harness.publisher.validated_headers()[0].last_archive, GENESIS_ARCHIVE_ROOT);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_releases_collaborators() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));

    harness.start().await?;
    harness.handle.stop().await?;
    harness.handle.stop().await?;

    assert_eq!(harness.handle.status().await?.phase, SequencerPhase::Stopped);
    assert_eq!(harness.validator.stops(), 1);
    assert_eq!(harness.slasher.stops(), 1);
    assert_eq!(harness.publisher.interrupts(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn restart_rearms_the_publisher_and_resumes_ticking() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];

    harness.start().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;
    harness.handle.stop().await?;
    assert_eq!(harness.handle.status().await?.phase, SequencerPhase::Stopped);
    let published_before_restart = harness.publisher.proposed_blocks().len();

    harness.handle.restart().await?;
    assert_eq!(harness.publisher.restarts(), 1);
    assert_eq!(harness.handle.status().await?.phase, SequencerPhase::Idle);
    wait_until(|| harness.publisher.proposed_blocks().len() > published_before_restart).await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rejected_config_update_keeps_the_previous_table() -> eyre::Result<()> {
    // 13s slots cannot fit the 12s L1 publish window once the table is enforced
    let config = SequencerConfig {
        enforce_time_table: false,
        max_l1_tx_inclusion_time_into_slot: 0,
        ..test_config()
    };
    let constants = RollupConstants::new(13, 12, 1_700_000_000);
    let harness = setup_with_constants(config, Some(tip_block(2)), constants);
    harness.start().await?;

    let err = harness
        .handle
        .update_config(SequencerConfigUpdate {
            enforce_time_table: Some(true),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, proposer_node_sequencer::SequencerError::Config(_)));

    // the sequencer still runs on the previous, unenforced table
    *harness.pool.txs.lock().unwrap() = vec![test_tx(1)];
    harness.handle.restart().await?;
    wait_until(|| !harness.publisher.proposed_blocks().is_empty()).await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn config_update_forwards_the_governance_payload() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));
    harness.start().await?;

    let payload = Bytes::from(vec![0xab; 4]);
    harness
        .handle
        .update_config(SequencerConfigUpdate {
            governance_proposer_payload: Some(payload.clone()),
            ..Default::default()
        })
        .await?;

    assert_eq!(harness.publisher.governance_payloads(), vec![payload]);
    // construction and the update each registered the slash payload getter
    assert_eq!(harness.publisher.slash_payload_getters(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn registered_block_builder_runs_validate_only_builds() -> eyre::Result<()> {
    let harness = setup(test_config(), Some(tip_block(2)));

    let builder = harness.validator.registered_builder().expect("builder registered at setup");
    let globals = GlobalVariables { block_number: 3, slot_number: SLOT, ..Default::default() };
    // a single tx below min_txs_per_block still builds: the gate is off for validation
    let block = (*builder)(vec![test_tx(9)], globals).await.map_err(|err| eyre::eyre!(err))?;

    assert_eq!(block.number(), 3);
    assert_eq!(block.tx_hashes, vec![test_tx(9).hash]);
    Ok(())
}
