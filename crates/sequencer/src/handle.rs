use crate::{
    command::SequencerCommand, config::SequencerConfigUpdate, error::SequencerError,
    SequencerStatus,
};
use tokio::sync::{mpsc, oneshot};

/// The handle used to send commands to the sequencer.
#[derive(Debug, Clone)]
pub struct SequencerHandle {
    to_sequencer_tx: mpsc::UnboundedSender<SequencerCommand>,
}

impl SequencerHandle {
    /// Returns a new sequencer handle.
    pub(crate) const fn new(to_sequencer_tx: mpsc::UnboundedSender<SequencerCommand>) -> Self {
        Self { to_sequencer_tx }
    }

    fn send_command(&self, command: SequencerCommand) -> Result<(), SequencerError> {
        self.to_sequencer_tx.send(command).map_err(|_| SequencerError::ChannelClosed)
    }

    async fn request<T>(
        &self,
        command: SequencerCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, SequencerError> {
        self.send_command(command)?;
        rx.await.map_err(|_| SequencerError::ChannelClosed)
    }

    /// Starts the polling loop.
    pub async fn start(&self) -> Result<(), SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.request(SequencerCommand::Start(tx), rx).await
    }

    /// Stops the sequencer: polling ends, collaborators are released and in-flight publisher
    /// calls are interrupted.
    pub async fn stop(&self) -> Result<(), SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.request(SequencerCommand::Stop(tx), rx).await
    }

    /// Re-arms the publisher and resumes polling after a stop.
    pub async fn restart(&self) -> Result<(), SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.request(SequencerCommand::Restart(tx), rx).await
    }

    /// Makes the next tick build a block even when the pool is below the configured minimum.
    pub async fn flush(&self) -> Result<(), SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.request(SequencerCommand::Flush(tx), rx).await
    }

    /// The current status of the sequencer.
    pub async fn status(&self) -> Result<SequencerStatus, SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.request(SequencerCommand::Status(tx), rx).await
    }

    /// Applies a configuration update. The time table is recomputed; when derivation fails
    /// the update is rejected and the previous configuration stays active.
    pub async fn update_config(
        &self,
        update: SequencerConfigUpdate,
    ) -> Result<(), SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.request(SequencerCommand::UpdateConfig(Box::new(update), tx), rx).await?
    }
}
