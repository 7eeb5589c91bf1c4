use alloy_primitives::Bytes;

/// Produces the payload a slashing vote commits to, if the slasher currently wants one.
#[async_trait::async_trait]
pub trait SlashPayloadProvider: Send + Sync {
    /// The slash payload for the given slot, or `None` when there is nothing to slash.
    async fn get_slash_payload(&self, slot: u64) -> Option<Bytes>;
}

/// The slashing vote payload producer.
#[async_trait::async_trait]
pub trait Slasher: SlashPayloadProvider {
    /// Stops the slasher.
    async fn stop(&self);
}
