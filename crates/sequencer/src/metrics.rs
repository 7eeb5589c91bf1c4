use crate::state::SequencerPhase;
use metrics::{Counter, Histogram};
use metrics_derive::Metrics;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use strum::IntoEnumIterator;

/// The metrics for the [`super::Sequencer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "sequencer")]
pub(crate) struct SequencerMetrics {
    /// Blocks published to the rollup contract.
    pub(crate) published_blocks: Counter,
    /// Block builds that failed before or at publication.
    pub(crate) failed_blocks: Counter,
    /// Duration of a full block build up to publication, in milliseconds.
    pub(crate) block_build_duration: Histogram,
    /// Duration of block builder tree insertions, in microseconds.
    pub(crate) tree_insertion_duration: Histogram,
    /// Duration of attestation collection, in seconds.
    pub(crate) attestation_collection_duration: Histogram,
}

/// Per-phase state transition metric.
#[derive(Metrics, Clone)]
#[metrics(scope = "sequencer")]
pub(crate) struct StateTransitionMetrics {
    /// Remaining budget when entering a restricted phase, in milliseconds.
    state_transition_buffer_ms: Histogram,
}

/// The metric handler for the sequencer. Tracks per-phase transition buffers and the
/// in-flight attestation collection.
pub(crate) struct MetricsHandler {
    metrics: SequencerMetrics,
    transitions: HashMap<SequencerPhase, StateTransitionMetrics>,
    attestation_start: Option<Instant>,
}

impl Default for MetricsHandler {
    fn default() -> Self {
        Self {
            metrics: SequencerMetrics::default(),
            transitions: SequencerPhase::iter()
                .map(|phase| {
                    let labeled =
                        StateTransitionMetrics::new_with_labels(&[("phase", phase.as_str())]);
                    (phase, labeled)
                })
                .collect(),
            attestation_start: None,
        }
    }
}

impl MetricsHandler {
    /// Returns a clone of the underlying metrics for components recording directly.
    pub(crate) fn sequencer_metrics(&self) -> SequencerMetrics {
        self.metrics.clone()
    }

    /// Records the remaining budget observed when entering a restricted phase.
    pub(crate) fn record_state_transition_buffer(&self, phase: SequencerPhase, buffer_ms: f64) {
        if let Some(transition) = self.transitions.get(&phase) {
            transition.state_transition_buffer_ms.record(buffer_ms);
        }
    }

    /// Records a successful block publication and its build duration.
    pub(crate) fn record_published_block(&self, duration: Duration) {
        self.metrics.published_blocks.increment(1);
        self.metrics.block_build_duration.record(duration.as_millis() as f64);
    }

    /// Records a failed block build or publication.
    pub(crate) fn record_failed_block(&self) {
        self.metrics.failed_blocks.increment(1);
    }

    /// Starts timing an attestation collection.
    pub(crate) fn start_attestation_recording(&mut self) {
        if self.attestation_start.is_some() {
            tracing::warn!(
                target: "proposer_node::sequencer",
                "attestation recording is already ongoing, overwriting"
            );
        }
        self.attestation_start = Some(Instant::now());
    }

    /// Finishes timing the current attestation collection, if one is ongoing.
    pub(crate) fn finish_attestation_recording(&mut self) {
        if let Some(start) = self.attestation_start.take() {
            self.metrics.attestation_collection_duration.record(start.elapsed().as_secs_f64());
        }
    }
}

impl std::fmt::Debug for MetricsHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsHandler")
            .field("attestation_start", &self.attestation_start)
            .finish_non_exhaustive()
    }
}
