use std::time::{SystemTime, UNIX_EPOCH};

/// The clock the sequencer measures slot time against. Tests substitute a settable
/// implementation to simulate slot timing.
pub trait DateProvider: Send + Sync {
    /// The current unix time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// A [`DateProvider`] backed by the system clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemDateProvider;

impl DateProvider for SystemDateProvider {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time can't go backwards")
            .as_millis() as u64
    }
}
