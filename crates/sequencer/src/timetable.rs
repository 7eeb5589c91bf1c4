use crate::{error::SequencerError, state::SequencerPhase};

/// Latest seconds into the slot at which proposer work may start.
const INITIAL_TIME: f64 = 2.0;
/// Seconds allowed for pre-build setup.
const BLOCK_PREPARE_TIME: f64 = 1.0;
/// One-way propagation allowance for proposals and attestations, counted twice.
const ATTESTATION_PROPAGATION_TIME: f64 = 2.0;
/// Seconds allowed for validators to check a completed block.
const BLOCK_VALIDATION_TIME: f64 = 1.0;

/// Per-phase deadlines within a slot, in seconds from slot start.
///
/// Unrestricted phases carry the full slot duration so the gate always passes for them.
/// The table is immutable; config updates derive a new one and swap it in atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    enforce: bool,
    slot_duration: f64,
    process_tx_time: f64,
    initializing_proposal: f64,
    creating_block: f64,
    collecting_attestations: f64,
    publishing_block: f64,
}

impl TimeTable {
    /// Derives the deadlines from the slot durations. `max_l1_tx_inclusion_time_into_slot`
    /// shortens the time reserved for the L1 publish tx at the end of the slot.
    pub fn new(
        enforce: bool,
        slot_duration: u64,
        ethereum_slot_duration: u64,
        max_l1_tx_inclusion_time_into_slot: u64,
    ) -> Result<Self, SequencerError> {
        let slot = slot_duration as f64;
        let l1_publishing_time =
            ethereum_slot_duration as f64 - max_l1_tx_inclusion_time_into_slot as f64;
        let remaining_time_in_slot = slot
            - INITIAL_TIME
            - BLOCK_PREPARE_TIME
            - l1_publishing_time
            - 2.0 * ATTESTATION_PROPAGATION_TIME
            - BLOCK_VALIDATION_TIME;
        if enforce && remaining_time_in_slot < 0.0 {
            return Err(SequencerError::Config(format!(
                "slot duration of {slot_duration}s leaves no time to process txs \
                 ({remaining_time_in_slot}s remaining)"
            )));
        }

        // the sequencer and the attesting validators each re-execute the txs once
        let process_tx_time = remaining_time_in_slot / 2.0;

        Ok(Self {
            enforce,
            slot_duration: slot,
            process_tx_time,
            initializing_proposal: INITIAL_TIME,
            creating_block: INITIAL_TIME + BLOCK_PREPARE_TIME,
            collecting_attestations: INITIAL_TIME
                + BLOCK_PREPARE_TIME
                + process_tx_time
                + BLOCK_VALIDATION_TIME,
            publishing_block: slot - l1_publishing_time,
        })
    }

    /// The deadline for entering the given phase, in seconds from slot start.
    pub fn deadline(&self, phase: SequencerPhase) -> f64 {
        match phase {
            SequencerPhase::Stopped |
            SequencerPhase::Idle |
            SequencerPhase::Synchronizing |
            SequencerPhase::ProposerCheck => self.slot_duration,
            SequencerPhase::InitializingProposal => self.initializing_proposal,
            SequencerPhase::CreatingBlock => self.creating_block,
            SequencerPhase::CollectingAttestations => self.collecting_attestations,
            SequencerPhase::PublishingBlock => self.publishing_block,
        }
    }

    /// Whether the deadline gate is enforced.
    pub const fn enforced(&self) -> bool {
        self.enforce
    }

    /// The seconds the tx processing phase may take.
    pub const fn process_tx_time(&self) -> f64 {
        self.process_tx_time
    }

    /// The slot duration in seconds.
    pub const fn slot_duration(&self) -> f64 {
        self.slot_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_deadlines() {
        // S=24, E=12, M=4: l1 publishing takes 8s, 8s remain for tx processing.
        let table = TimeTable::new(true, 24, 12, 4).unwrap();

        assert_eq!(table.process_tx_time(), 4.0);
        assert_eq!(table.deadline(SequencerPhase::InitializingProposal), 2.0);
        assert_eq!(table.deadline(SequencerPhase::CreatingBlock), 3.0);
        assert_eq!(table.deadline(SequencerPhase::CollectingAttestations), 8.0);
        assert_eq!(table.deadline(SequencerPhase::PublishingBlock), 16.0);
    }

    #[test]
    fn unrestricted_phases_carry_the_slot_duration() {
        let table = TimeTable::new(true, 24, 12, 4).unwrap();

        for phase in [
            SequencerPhase::Stopped,
            SequencerPhase::Idle,
            SequencerPhase::Synchronizing,
            SequencerPhase::ProposerCheck,
        ] {
            assert_eq!(table.deadline(phase), 24.0);
        }
    }

    #[test]
    fn rejects_slots_too_short_to_process_txs() {
        // 13s slots cannot fit a 12s L1 publish window plus the fixed allowances.
        let err = TimeTable::new(true, 13, 12, 0).unwrap_err();
        assert!(matches!(err, SequencerError::Config(_)));
    }

    #[test]
    fn short_slots_are_accepted_when_not_enforced() {
        let table = TimeTable::new(false, 13, 12, 0).unwrap();
        assert!(table.process_tx_time() < 0.0);
        assert!(!table.enforced());
    }
}
