/// Timing constants of the rollup, fixed at deployment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RollupConstants {
    /// Duration of an L2 slot in seconds.
    pub slot_duration: u64,
    /// Duration of an L1 slot in seconds.
    pub ethereum_slot_duration: u64,
    /// Unix timestamp in seconds of the start of L2 slot 0.
    pub l1_genesis_time: u64,
}

impl RollupConstants {
    /// Returns a new instance of [`RollupConstants`].
    pub const fn new(slot_duration: u64, ethereum_slot_duration: u64, l1_genesis_time: u64) -> Self {
        Self { slot_duration, ethereum_slot_duration, l1_genesis_time }
    }

    /// The unix timestamp in seconds at which the given slot starts.
    pub const fn slot_start_timestamp(&self, slot: u64) -> u64 {
        self.l1_genesis_time + slot * self.slot_duration
    }

    /// Seconds elapsed since the start of the given slot, from a unix timestamp in
    /// milliseconds. Negative when the slot has not started yet.
    pub fn seconds_into_slot(&self, slot: u64, now_ms: u64) -> f64 {
        now_ms as f64 / 1000.0 - self.slot_start_timestamp(slot) as f64
    }
}
