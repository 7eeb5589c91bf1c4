//! Mock implementations of the provider traits, with recorded call histories so tests can
//! assert on the exact interactions the sequencer makes.

use crate::{
    BlockBuilder, BlockBuilderFactory, BlockBuilderFn, BuilderError, DateProvider,
    GlobalVariablesBuilder, L1Publisher, L1ToL2MessageSource, L2BlockSource, PoolError,
    PoolStatus, ProcessorError, ProcessorLimits, PublicProcessor, PublicProcessorFactory,
    PublisherError, SlashPayloadProvider, Slasher, SourceError, StateFork, TxPool,
    TxValidationPolicy, ValidatorClient, ValidatorClientError, WorldState, WorldStateError,
    WorldStateStatus,
};
use alloy_primitives::{keccak256, Address, Bytes, B256};
use proposer_node_primitives::{
    Attestation, BlockHeader, BlockProposal, EpochProofQuote, FailedTx, GlobalVariables,
    L2Block, L2BlockId, L2Tips, ProcessedTx, RollupConstants, Tx, TxHash, VoteKind,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

/// A settable [`DateProvider`] used to simulate slot timing.
#[derive(Debug, Default)]
pub struct TestClock {
    now_ms: AtomicU64,
}

impl TestClock {
    /// Returns a clock reading `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self { now_ms: AtomicU64::new(now_ms) }
    }

    /// Sets the clock to the given unix time in milliseconds.
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl DateProvider for TestClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

/// A block submission recorded by the [`MockPublisher`].
#[derive(Debug, Clone)]
pub struct ProposedBlock {
    /// The submitted block.
    pub block: L2Block,
    /// The attestations attached to the submission.
    pub attestations: Vec<Attestation>,
    /// The tx hashes attached to the submission.
    pub tx_hashes: Vec<TxHash>,
    /// The proof quote attached to the submission, if any.
    pub proof_quote: Option<EpochProofQuote>,
}

/// A scripted [`L1Publisher`].
#[derive(Debug)]
pub struct MockPublisher {
    /// The slot returned by the eligibility check.
    pub proposal_slot: AtomicU64,
    /// The block number returned by the eligibility check.
    pub proposal_block_number: AtomicU64,
    /// When set, the eligibility check fails with this message.
    pub can_propose_error: Mutex<Option<String>>,
    /// When set, header validation fails with this message.
    pub validate_error: Mutex<Option<String>>,
    /// The result of block submissions.
    pub propose_result: AtomicBool,
    /// The committee returned for the current epoch.
    pub committee: Mutex<Vec<Address>>,
    /// The epoch returned as claimable, if any.
    pub claimable_epoch: Mutex<Option<u64>>,
    /// Provers whose quotes pass validation. `None` accepts every quote.
    pub valid_quote_provers: Mutex<Option<Vec<Address>>>,
    /// The result of proof right claims.
    pub claim_result: AtomicBool,
    /// The sender address.
    pub sender: Address,

    proposed: Mutex<Vec<ProposedBlock>>,
    validated_headers: Mutex<Vec<BlockHeader>>,
    votes: Mutex<Vec<(u64, u64, VoteKind)>>,
    claims: Mutex<Vec<EpochProofQuote>>,
    governance_payloads: Mutex<Vec<Bytes>>,
    slash_payload_getters: AtomicU64,
    interrupts: AtomicU64,
    restarts: AtomicU64,
}

impl MockPublisher {
    /// Returns a publisher assigning the given slot and block number to this node.
    pub fn new(proposal_slot: u64, proposal_block_number: u64) -> Self {
        Self {
            proposal_slot: AtomicU64::new(proposal_slot),
            proposal_block_number: AtomicU64::new(proposal_block_number),
            can_propose_error: Mutex::new(None),
            validate_error: Mutex::new(None),
            propose_result: AtomicBool::new(true),
            committee: Mutex::new(vec![]),
            claimable_epoch: Mutex::new(None),
            valid_quote_provers: Mutex::new(None),
            claim_result: AtomicBool::new(true),
            sender: Address::repeat_byte(0xaa),
            proposed: Mutex::new(vec![]),
            validated_headers: Mutex::new(vec![]),
            votes: Mutex::new(vec![]),
            claims: Mutex::new(vec![]),
            governance_payloads: Mutex::new(vec![]),
            slash_payload_getters: AtomicU64::new(0),
            interrupts: AtomicU64::new(0),
            restarts: AtomicU64::new(0),
        }
    }

    /// The blocks submitted so far.
    pub fn proposed_blocks(&self) -> Vec<ProposedBlock> {
        self.proposed.lock().expect("lock poisoned").clone()
    }

    /// The headers validated so far.
    pub fn validated_headers(&self) -> Vec<BlockHeader> {
        self.validated_headers.lock().expect("lock poisoned").clone()
    }

    /// The votes cast so far.
    pub fn votes(&self) -> Vec<(u64, u64, VoteKind)> {
        self.votes.lock().expect("lock poisoned").clone()
    }

    /// The proof right claims made so far.
    pub fn claims(&self) -> Vec<EpochProofQuote> {
        self.claims.lock().expect("lock poisoned").clone()
    }

    /// The governance payloads forwarded so far.
    pub fn governance_payloads(&self) -> Vec<Bytes> {
        self.governance_payloads.lock().expect("lock poisoned").clone()
    }

    /// How many slash payload getters have been registered.
    pub fn slash_payload_getters(&self) -> u64 {
        self.slash_payload_getters.load(Ordering::Relaxed)
    }

    /// How many times the publisher was interrupted.
    pub fn interrupts(&self) -> u64 {
        self.interrupts.load(Ordering::Relaxed)
    }

    /// How many times the publisher was re-armed.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl L1Publisher for MockPublisher {
    async fn can_propose_at_next_eth_block(
        &self,
        _tip_archive: B256,
    ) -> Result<(u64, u64), PublisherError> {
        if let Some(message) = self.can_propose_error.lock().expect("lock poisoned").clone() {
            return Err(PublisherError::Rpc(message));
        }
        Ok((
            self.proposal_slot.load(Ordering::Relaxed),
            self.proposal_block_number.load(Ordering::Relaxed),
        ))
    }

    async fn validate_block_for_submission(
        &self,
        header: &BlockHeader,
    ) -> Result<(), PublisherError> {
        self.validated_headers.lock().expect("lock poisoned").push(header.clone());
        if let Some(message) = self.validate_error.lock().expect("lock poisoned").clone() {
            return Err(PublisherError::ContractRejected(message));
        }
        Ok(())
    }

    async fn propose_l2_block(
        &self,
        block: &L2Block,
        attestations: &[Attestation],
        tx_hashes: &[TxHash],
        proof_quote: Option<&EpochProofQuote>,
    ) -> Result<bool, PublisherError> {
        self.proposed.lock().expect("lock poisoned").push(ProposedBlock {
            block: block.clone(),
            attestations: attestations.to_vec(),
            tx_hashes: tx_hashes.to_vec(),
            proof_quote: proof_quote.cloned(),
        });
        Ok(self.propose_result.load(Ordering::Relaxed))
    }

    async fn get_current_epoch_committee(&self) -> Result<Vec<Address>, PublisherError> {
        Ok(self.committee.lock().expect("lock poisoned").clone())
    }

    async fn get_claimable_epoch(&self) -> Result<Option<u64>, PublisherError> {
        Ok(*self.claimable_epoch.lock().expect("lock poisoned"))
    }

    async fn validate_proof_quote(&self, quote: &EpochProofQuote) -> Option<EpochProofQuote> {
        let valid = match &*self.valid_quote_provers.lock().expect("lock poisoned") {
            Some(provers) => provers.contains(&quote.prover),
            None => true,
        };
        valid.then(|| quote.clone())
    }

    async fn claim_epoch_proof_right(
        &self,
        quote: &EpochProofQuote,
    ) -> Result<bool, PublisherError> {
        self.claims.lock().expect("lock poisoned").push(quote.clone());
        Ok(self.claim_result.load(Ordering::Relaxed))
    }

    async fn cast_vote(
        &self,
        slot: u64,
        timestamp: u64,
        kind: VoteKind,
    ) -> Result<bool, PublisherError> {
        self.votes.lock().expect("lock poisoned").push((slot, timestamp, kind));
        Ok(true)
    }

    fn register_slash_payload_getter(&self, _getter: Arc<dyn SlashPayloadProvider>) {
        self.slash_payload_getters.fetch_add(1, Ordering::Relaxed);
    }

    fn set_governance_payload(&self, payload: Bytes) {
        self.governance_payloads.lock().expect("lock poisoned").push(payload);
    }

    fn get_sender_address(&self) -> Address {
        self.sender
    }

    fn interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);
    }

    fn restart(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }
}

/// A scripted [`ValidatorClient`].
#[derive(Default)]
pub struct MockValidatorClient {
    /// The attestations returned by collection, in arrival order.
    pub attestations: Mutex<Vec<Attestation>>,
    /// Whether proposal creation yields a proposal.
    pub proposal_available: AtomicBool,

    broadcasts: Mutex<Vec<BlockProposal>>,
    collect_calls: Mutex<Vec<(BlockProposal, usize)>>,
    registered_builder: Mutex<Option<BlockBuilderFn>>,
    stops: AtomicU64,
}

impl MockValidatorClient {
    /// Returns a client answering attestation collection with the given attestations.
    pub fn new(attestations: Vec<Attestation>) -> Self {
        Self {
            attestations: Mutex::new(attestations),
            proposal_available: AtomicBool::new(true),
            broadcasts: Mutex::new(vec![]),
            collect_calls: Mutex::new(vec![]),
            registered_builder: Mutex::new(None),
            stops: AtomicU64::new(0),
        }
    }

    /// The proposals broadcast so far.
    pub fn broadcasts(&self) -> Vec<BlockProposal> {
        self.broadcasts.lock().expect("lock poisoned").clone()
    }

    /// The attestation collection calls made so far.
    pub fn collect_calls(&self) -> Vec<(BlockProposal, usize)> {
        self.collect_calls.lock().expect("lock poisoned").clone()
    }

    /// The block builder registered with the client, if any.
    pub fn registered_builder(&self) -> Option<BlockBuilderFn> {
        self.registered_builder.lock().expect("lock poisoned").clone()
    }

    /// How many times the client was stopped.
    pub fn stops(&self) -> u64 {
        self.stops.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MockValidatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockValidatorClient").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ValidatorClient for MockValidatorClient {
    async fn create_block_proposal(
        &self,
        header: &BlockHeader,
        archive: B256,
        tx_hashes: &[TxHash],
    ) -> Result<Option<BlockProposal>, ValidatorClientError> {
        Ok(self.proposal_available.load(Ordering::Relaxed).then(|| BlockProposal {
            header: header.clone(),
            archive,
            tx_hashes: tx_hashes.to_vec(),
        }))
    }

    async fn broadcast_block_proposal(
        &self,
        proposal: &BlockProposal,
    ) -> Result<(), ValidatorClientError> {
        self.broadcasts.lock().expect("lock poisoned").push(proposal.clone());
        Ok(())
    }

    async fn collect_attestations(
        &self,
        proposal: &BlockProposal,
        threshold: usize,
    ) -> Result<Vec<Attestation>, ValidatorClientError> {
        self.collect_calls.lock().expect("lock poisoned").push((proposal.clone(), threshold));
        Ok(self.attestations.lock().expect("lock poisoned").clone())
    }

    fn register_block_builder(&self, builder: BlockBuilderFn) {
        *self.registered_builder.lock().expect("lock poisoned") = Some(builder);
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }
}

/// An in-memory [`TxPool`].
#[derive(Debug, Default)]
pub struct MockTxPool {
    /// The pending txs.
    pub txs: Mutex<Vec<Tx>>,
    /// The proof quotes gossiped per epoch.
    pub quotes: Mutex<HashMap<u64, Vec<EpochProofQuote>>>,
    /// The block the p2p client is synced to.
    pub synced_to_l2_block: AtomicU64,

    deletions: Mutex<Vec<Vec<TxHash>>>,
}

impl MockTxPool {
    /// Returns a pool holding the given txs, synced to the given block.
    pub fn new(txs: Vec<Tx>, synced_to_l2_block: u64) -> Self {
        Self {
            txs: Mutex::new(txs),
            quotes: Mutex::new(HashMap::new()),
            synced_to_l2_block: AtomicU64::new(synced_to_l2_block),
            deletions: Mutex::new(vec![]),
        }
    }

    /// The deletion batches requested so far.
    pub fn deletions(&self) -> Vec<Vec<TxHash>> {
        self.deletions.lock().expect("lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl TxPool for MockTxPool {
    async fn pending_tx_count(&self) -> Result<usize, PoolError> {
        Ok(self.txs.lock().expect("lock poisoned").len())
    }

    async fn pending_txs(&self, limit: usize) -> Result<Vec<Tx>, PoolError> {
        Ok(self.txs.lock().expect("lock poisoned").iter().take(limit).cloned().collect())
    }

    async fn delete_txs(&self, hashes: Vec<TxHash>) -> Result<(), PoolError> {
        self.txs.lock().expect("lock poisoned").retain(|tx| !hashes.contains(&tx.hash));
        self.deletions.lock().expect("lock poisoned").push(hashes);
        Ok(())
    }

    async fn get_epoch_proof_quotes(
        &self,
        epoch: u64,
    ) -> Result<Vec<EpochProofQuote>, PoolError> {
        Ok(self.quotes.lock().expect("lock poisoned").get(&epoch).cloned().unwrap_or_default())
    }

    async fn status(&self) -> Result<PoolStatus, PoolError> {
        Ok(PoolStatus { synced_to_l2_block: self.synced_to_l2_block.load(Ordering::Relaxed) })
    }
}

/// A fork handed out by the [`MockWorldState`].
#[derive(Debug)]
pub struct MockStateFork {
    block_number: u64,
    closed: AtomicBool,
}

impl MockStateFork {
    /// Whether the fork has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl StateFork for MockStateFork {
    fn block_number(&self) -> u64 {
        self.block_number
    }

    async fn close(&self) -> Result<(), WorldStateError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// An in-memory [`WorldState`] that tracks the forks it hands out.
#[derive(Debug, Default)]
pub struct MockWorldState {
    /// The reported sync status.
    pub synced_to: Mutex<L2BlockId>,

    sync_calls: Mutex<Vec<u64>>,
    forks: Mutex<Vec<Arc<MockStateFork>>>,
}

impl MockWorldState {
    /// Returns a world state synced to the given block.
    pub fn new(synced_to: L2BlockId) -> Self {
        Self {
            synced_to: Mutex::new(synced_to),
            sync_calls: Mutex::new(vec![]),
            forks: Mutex::new(vec![]),
        }
    }

    /// The `sync_immediate` calls made so far.
    pub fn sync_calls(&self) -> Vec<u64> {
        self.sync_calls.lock().expect("lock poisoned").clone()
    }

    /// The forks handed out so far.
    pub fn forks(&self) -> Vec<Arc<MockStateFork>> {
        self.forks.lock().expect("lock poisoned").clone()
    }

    /// The number of forks handed out and not yet closed.
    pub fn open_fork_count(&self) -> usize {
        self.forks.lock().expect("lock poisoned").iter().filter(|f| !f.is_closed()).count()
    }
}

#[async_trait::async_trait]
impl WorldState for MockWorldState {
    async fn status(&self) -> Result<WorldStateStatus, WorldStateError> {
        Ok(WorldStateStatus { synced_to_l2_block: *self.synced_to.lock().expect("lock poisoned") })
    }

    async fn sync_immediate(&self, block_number: u64) -> Result<(), WorldStateError> {
        self.sync_calls.lock().expect("lock poisoned").push(block_number);
        Ok(())
    }

    async fn fork(&self) -> Result<Arc<dyn StateFork>, WorldStateError> {
        let block_number = self.synced_to.lock().expect("lock poisoned").number;
        let fork = Arc::new(MockStateFork { block_number, closed: AtomicBool::new(false) });
        self.forks.lock().expect("lock poisoned").push(fork.clone());
        Ok(fork)
    }
}

/// An [`L2BlockSource`] serving a single latest block.
#[derive(Debug, Default)]
pub struct MockL2BlockSource {
    /// The latest published block, if any.
    pub latest: Mutex<Option<L2Block>>,
}

impl MockL2BlockSource {
    /// Returns a source with the given latest block.
    pub fn new(latest: Option<L2Block>) -> Self {
        Self { latest: Mutex::new(latest) }
    }
}

#[async_trait::async_trait]
impl L2BlockSource for MockL2BlockSource {
    async fn get_latest_block(&self) -> Result<Option<L2Block>, SourceError> {
        Ok(self.latest.lock().expect("lock poisoned").clone())
    }

    async fn get_block_number(&self) -> Result<u64, SourceError> {
        Ok(self.latest.lock().expect("lock poisoned").as_ref().map(|b| b.number()).unwrap_or(0))
    }

    async fn get_l2_tips(&self) -> Result<L2Tips, SourceError> {
        let latest = self.latest.lock().expect("lock poisoned").as_ref().map(|b| b.id());
        Ok(L2Tips { latest, proven: latest, finalized: latest })
    }
}

/// An [`L1ToL2MessageSource`] serving scripted message batches.
#[derive(Debug, Default)]
pub struct MockL1ToL2MessageSource {
    /// The messages to include per L2 block number.
    pub messages: Mutex<HashMap<u64, Vec<B256>>>,
    /// The L1 block number the source has processed up to.
    pub block_number: AtomicU64,
}

impl MockL1ToL2MessageSource {
    /// Returns a source synced to the given block with no messages.
    pub fn new(block_number: u64) -> Self {
        Self { messages: Mutex::new(HashMap::new()), block_number: AtomicU64::new(block_number) }
    }
}

#[async_trait::async_trait]
impl L1ToL2MessageSource for MockL1ToL2MessageSource {
    async fn get_l1_to_l2_messages(&self, block_number: u64) -> Result<Vec<B256>, SourceError> {
        Ok(self
            .messages
            .lock()
            .expect("lock poisoned")
            .get(&block_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_block_number(&self) -> Result<u64, SourceError> {
        Ok(self.block_number.load(Ordering::Relaxed))
    }
}

/// A hook invoked when a [`MockPublicProcessor`] starts processing, used by tests to move
/// the clock mid-build.
pub type ProcessHook = Arc<dyn Fn() + Send + Sync>;

/// A [`PublicProcessorFactory`] creating [`MockPublicProcessor`]s.
#[derive(Default)]
pub struct MockPublicProcessorFactory {
    /// Txs with these hashes fail processing.
    pub failing_tx_hashes: Mutex<Vec<TxHash>>,
    /// Invoked at the start of every `process` call.
    pub on_process: Mutex<Option<ProcessHook>>,

    created: AtomicU64,
}

impl MockPublicProcessorFactory {
    /// How many processors have been created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MockPublicProcessorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPublicProcessorFactory").finish_non_exhaustive()
    }
}

impl PublicProcessorFactory for MockPublicProcessorFactory {
    fn create(
        &self,
        _fork: Arc<dyn StateFork>,
        _historical_header: Option<BlockHeader>,
        _global_variables: GlobalVariables,
    ) -> Box<dyn PublicProcessor> {
        self.created.fetch_add(1, Ordering::Relaxed);
        Box::new(MockPublicProcessor {
            failing_tx_hashes: self.failing_tx_hashes.lock().expect("lock poisoned").clone(),
            on_process: self.on_process.lock().expect("lock poisoned").clone(),
        })
    }
}

/// A [`PublicProcessor`] that turns every tx into effects, failing the scripted ones.
pub struct MockPublicProcessor {
    failing_tx_hashes: Vec<TxHash>,
    on_process: Option<ProcessHook>,
}

impl std::fmt::Debug for MockPublicProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPublicProcessor")
            .field("failing_tx_hashes", &self.failing_tx_hashes)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl PublicProcessor for MockPublicProcessor {
    async fn process(
        &mut self,
        txs: Vec<Tx>,
        limits: ProcessorLimits,
        _policy: TxValidationPolicy,
    ) -> Result<(Vec<ProcessedTx>, Vec<FailedTx>), ProcessorError> {
        if let Some(hook) = &self.on_process {
            hook();
        }
        let max = limits.max_transactions.unwrap_or(usize::MAX);
        let mut processed = vec![];
        let mut failed = vec![];
        for tx in txs {
            if self.failing_tx_hashes.contains(&tx.hash) {
                failed.push(FailedTx { tx, reason: "reverted".to_string() });
            } else if processed.len() < max {
                processed.push(ProcessedTx { hash: tx.hash, effects: tx.payload });
            }
        }
        Ok((processed, failed))
    }
}

/// A [`BlockBuilderFactory`] creating [`MockBlockBuilder`]s.
#[derive(Debug, Default)]
pub struct MockBlockBuilderFactory {
    created: AtomicU64,
}

impl MockBlockBuilderFactory {
    /// How many builders have been created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

impl BlockBuilderFactory for MockBlockBuilderFactory {
    fn create(&self, _fork: Arc<dyn StateFork>) -> Box<dyn BlockBuilder> {
        self.created.fetch_add(1, Ordering::Relaxed);
        Box::new(MockBlockBuilder { global_variables: None, l1_to_l2_messages: vec![], txs: vec![] })
    }
}

/// A [`BlockBuilder`] assembling blocks with a synthetic archive root.
#[derive(Debug, Default)]
pub struct MockBlockBuilder {
    global_variables: Option<GlobalVariables>,
    l1_to_l2_messages: Vec<B256>,
    txs: Vec<ProcessedTx>,
}

#[async_trait::async_trait]
impl BlockBuilder for MockBlockBuilder {
    async fn start_new_block(
        &mut self,
        global_variables: GlobalVariables,
        l1_to_l2_messages: Vec<B256>,
    ) -> Result<(), BuilderError> {
        self.global_variables = Some(global_variables);
        self.l1_to_l2_messages = l1_to_l2_messages;
        Ok(())
    }

    async fn add_txs(&mut self, txs: Vec<ProcessedTx>) -> Result<(), BuilderError> {
        if self.global_variables.is_none() {
            return Err(BuilderError::NoBlockInProgress);
        }
        self.txs.extend(txs);
        Ok(())
    }

    async fn set_block_completed(&mut self) -> Result<L2Block, BuilderError> {
        let global_variables = self.global_variables.take().ok_or(BuilderError::NoBlockInProgress)?;
        let tx_hashes: Vec<TxHash> = self.txs.drain(..).map(|tx| tx.hash).collect();
        let mut preimage = global_variables.block_number.to_be_bytes().to_vec();
        for hash in &tx_hashes {
            preimage.extend_from_slice(hash.as_slice());
        }
        Ok(L2Block {
            archive: keccak256(&preimage),
            header: BlockHeader {
                txs_effects_hash: keccak256((tx_hashes.len() as u64).to_be_bytes()),
                global_variables,
                ..Default::default()
            },
            tx_hashes,
        })
    }
}

/// A [`GlobalVariablesBuilder`] deriving timestamps from [`RollupConstants`].
#[derive(Debug)]
pub struct MockGlobalVariablesBuilder {
    /// The constants timestamps are derived from.
    pub constants: RollupConstants,
}

impl MockGlobalVariablesBuilder {
    /// Returns a builder over the given constants.
    pub const fn new(constants: RollupConstants) -> Self {
        Self { constants }
    }
}

#[async_trait::async_trait]
impl GlobalVariablesBuilder for MockGlobalVariablesBuilder {
    async fn build_global_variables(
        &self,
        block_number: u64,
        coinbase: Address,
        fee_recipient: Address,
        slot: u64,
    ) -> Result<GlobalVariables, SourceError> {
        Ok(GlobalVariables {
            chain_id: 1,
            version: 1,
            block_number,
            slot_number: slot,
            timestamp: self.constants.slot_start_timestamp(slot),
            coinbase,
            fee_recipient,
        })
    }
}

/// A [`Slasher`] serving a fixed payload.
#[derive(Debug, Default)]
pub struct MockSlasher {
    /// The payload returned for every slot.
    pub payload: Mutex<Option<Bytes>>,

    stops: AtomicU64,
}

impl MockSlasher {
    /// How many times the slasher was stopped.
    pub fn stops(&self) -> u64 {
        self.stops.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl SlashPayloadProvider for MockSlasher {
    async fn get_slash_payload(&self, _slot: u64) -> Option<Bytes> {
        self.payload.lock().expect("lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl Slasher for MockSlasher {
    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns a pending tx with a deterministic hash derived from `seed`.
pub fn test_tx(seed: u8) -> Tx {
    let payload = Bytes::from(vec![seed; 32]);
    Tx::new(keccak256(&payload), payload)
}

/// Returns an epoch proof quote from a prover derived from `seed`.
pub fn test_quote(epoch: u64, valid_until_slot: u64, basis_point_fee: u64, seed: u8) -> EpochProofQuote {
    EpochProofQuote {
        epoch_to_prove: epoch,
        valid_until_slot,
        basis_point_fee,
        prover: Address::repeat_byte(seed),
        signature: Bytes::from(vec![seed; 65]),
    }
}
