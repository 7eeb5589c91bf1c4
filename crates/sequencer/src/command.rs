use crate::{config::SequencerConfigUpdate, error::SequencerError, SequencerStatus};
use tokio::sync::oneshot;

/// The commands the sequencer accepts from its handle.
#[derive(Debug)]
pub(crate) enum SequencerCommand {
    /// Start polling. Acknowledged once the loop is armed.
    Start(oneshot::Sender<()>),
    /// Stop polling and release collaborators. Acknowledged once stopped.
    Stop(oneshot::Sender<()>),
    /// Re-arm the publisher and resume polling. Acknowledged once resumed.
    Restart(oneshot::Sender<()>),
    /// Build the next block even when the pool is below the configured minimum.
    Flush(oneshot::Sender<()>),
    /// Query the current status.
    Status(oneshot::Sender<SequencerStatus>),
    /// Apply a configuration update and recompute the time table.
    UpdateConfig(Box<SequencerConfigUpdate>, oneshot::Sender<Result<(), SequencerError>>),
}
