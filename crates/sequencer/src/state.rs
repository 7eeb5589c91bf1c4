use crate::{error::SequencerError, timetable::TimeTable};
use proposer_node_primitives::RollupConstants;
use std::fmt;
use strum::EnumIter;
use tracing::{debug, trace};

/// The phase the sequencer is in.
///
/// `Stopped` is terminal until a restart; `Idle` is the resting state of a running
/// sequencer. The remaining phases trace one block proposal through a slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter)]
pub enum SequencerPhase {
    /// The sequencer is not running.
    Stopped,
    /// The sequencer is running and waiting for the next tick.
    Idle,
    /// Checking whether local views have caught up with the L1 tip.
    Synchronizing,
    /// Checking whether this node is the elected proposer.
    ProposerCheck,
    /// Setting up the proposal for the assigned slot.
    InitializingProposal,
    /// Processing txs and assembling the block.
    CreatingBlock,
    /// Waiting for committee attestations over the proposal.
    CollectingAttestations,
    /// Submitting the block to the rollup contract.
    PublishingBlock,
}

impl SequencerPhase {
    /// Returns the str representation of the phase.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Idle => "idle",
            Self::Synchronizing => "synchronizing",
            Self::ProposerCheck => "proposer_check",
            Self::InitializingProposal => "initializing_proposal",
            Self::CreatingBlock => "creating_block",
            Self::CollectingAttestations => "collecting_attestations",
            Self::PublishingBlock => "publishing_block",
        }
    }
}

impl fmt::Display for SequencerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the sequencer phase and gates forward transitions on the [`TimeTable`].
#[derive(Debug)]
pub(crate) struct StateMachine {
    phase: SequencerPhase,
}

impl StateMachine {
    /// Returns a new state machine in the [`SequencerPhase::Stopped`] phase.
    pub(crate) const fn new() -> Self {
        Self { phase: SequencerPhase::Stopped }
    }

    /// The current phase.
    pub(crate) const fn phase(&self) -> SequencerPhase {
        self.phase
    }

    /// Transitions to `target` for the given slot. Non-forced transitions out of
    /// `Stopped` are ignored. When the table is enforced and the target deadline is
    /// restricted, the transition fails with [`SequencerError::TooSlow`] past the deadline.
    ///
    /// Callers pass slot 0 when transitioning to an unrestricted phase; the slot arithmetic
    /// is meaningless there and the gate never fires.
    ///
    /// Returns the remaining budget in milliseconds for restricted targets.
    pub(crate) fn set(
        &mut self,
        target: SequencerPhase,
        slot: u64,
        force: bool,
        table: &TimeTable,
        constants: &RollupConstants,
        now_ms: u64,
    ) -> Result<Option<f64>, SequencerError> {
        if self.phase == SequencerPhase::Stopped && !force {
            trace!(
                target: "proposer_node::sequencer",
                %target,
                "sequencer is stopped, ignoring transition"
            );
            return Ok(None);
        }

        let seconds_into_slot = round_to_millis(constants.seconds_into_slot(slot, now_ms));
        let deadline = table.deadline(target);
        let restricted = deadline < table.slot_duration();

        if table.enforced() && restricted && seconds_into_slot > deadline {
            return Err(SequencerError::TooSlow {
                from: self.phase,
                to: target,
                max_allowed_s: deadline,
                seconds_into_slot,
            });
        }

        debug!(
            target: "proposer_node::sequencer",
            from = %self.phase,
            to = %target,
            slot,
            seconds_into_slot,
            "state transition"
        );
        self.phase = target;

        Ok(restricted.then(|| (deadline - seconds_into_slot) * 1000.0))
    }
}

/// Rounds to 3 decimals so deadline comparisons are stable across float noise.
fn round_to_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TimeTable {
        // S=24, E=12, M=4; restricted deadlines are 2 / 3 / 8 / 16 seconds.
        TimeTable::new(true, 24, 12, 4).unwrap()
    }

    const CONSTANTS: RollupConstants = RollupConstants::new(24, 12, 1_700_000_000);

    fn ms_into_slot(slot: u64, seconds: f64) -> u64 {
        CONSTANTS.slot_start_timestamp(slot) * 1000 + (seconds * 1000.0) as u64
    }

    #[test]
    fn ignores_transitions_while_stopped() {
        let mut machine = StateMachine::new();
        let buffer = machine
            .set(SequencerPhase::Synchronizing, 0, false, &table(), &CONSTANTS, 0)
            .unwrap();

        assert_eq!(machine.phase(), SequencerPhase::Stopped);
        assert!(buffer.is_none());
    }

    #[test]
    fn forced_transitions_leave_stopped() {
        let mut machine = StateMachine::new();
        machine.set(SequencerPhase::Idle, 0, true, &table(), &CONSTANTS, 0).unwrap();
        assert_eq!(machine.phase(), SequencerPhase::Idle);
    }

    #[test]
    fn gates_restricted_transitions_on_the_deadline() {
        let table = table();
        let mut machine = StateMachine::new();
        machine.set(SequencerPhase::Idle, 0, true, &table, &CONSTANTS, 0).unwrap();

        // 1s into slot 5: within the 2s InitializingProposal deadline.
        let buffer = machine
            .set(
                SequencerPhase::InitializingProposal,
                5,
                false,
                &table,
                &CONSTANTS,
                ms_into_slot(5, 1.0),
            )
            .unwrap();
        assert_eq!(buffer, Some(1000.0));

        // 3.5s into slot 5: past the 3s CreatingBlock deadline.
        let err = machine
            .set(
                SequencerPhase::CreatingBlock,
                5,
                false,
                &table,
                &CONSTANTS,
                ms_into_slot(5, 3.5),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SequencerError::TooSlow {
                from: SequencerPhase::InitializingProposal,
                to: SequencerPhase::CreatingBlock,
                ..
            }
        ));
        // the failed transition does not move the phase
        assert_eq!(machine.phase(), SequencerPhase::InitializingProposal);
    }

    #[test]
    fn unrestricted_transitions_pass_at_any_time() {
        let table = table();
        let mut machine = StateMachine::new();
        machine.set(SequencerPhase::Idle, 0, true, &table, &CONSTANTS, 0).unwrap();

        // way past the end of slot 5
        let buffer = machine
            .set(
                SequencerPhase::Synchronizing,
                0,
                false,
                &table,
                &CONSTANTS,
                ms_into_slot(5, 60.0),
            )
            .unwrap();
        assert_eq!(machine.phase(), SequencerPhase::Synchronizing);
        assert!(buffer.is_none());
    }

    #[test]
    fn unenforced_table_never_raises() {
        let table = TimeTable::new(false, 24, 12, 4).unwrap();
        let mut machine = StateMachine::new();
        machine.set(SequencerPhase::Idle, 0, true, &table, &CONSTANTS, 0).unwrap();

        machine
            .set(
                SequencerPhase::CreatingBlock,
                5,
                false,
                &table,
                &CONSTANTS,
                ms_into_slot(5, 20.0),
            )
            .unwrap();
        assert_eq!(machine.phase(), SequencerPhase::CreatingBlock);
    }
}
