use crate::{error::SequencerError, Sequencer};
use tracing::debug;

impl Sequencer {
    /// Whether every local view has caught up with the L1 tip: the world state matches the
    /// latest published block, and the p2p client and the L1→L2 message source have both
    /// processed at least up to it.
    pub(crate) async fn is_synced(&self) -> Result<bool, SequencerError> {
        let tips = self.l2_block_source.get_l2_tips().await?;
        let world_state = self.world_state.status().await?;

        if let Some(latest) = &tips.latest {
            if world_state.synced_to_l2_block.hash != latest.hash {
                debug!(
                    target: "proposer_node::sequencer",
                    world_state = %world_state.synced_to_l2_block,
                    latest = %latest,
                    "world state is behind the L2 tip"
                );
                return Ok(false);
            }
        }
        let latest_number = tips.latest.map(|block| block.number).unwrap_or(0);

        let pool = self.pool.status().await?;
        if pool.synced_to_l2_block < latest_number {
            debug!(
                target: "proposer_node::sequencer",
                p2p = pool.synced_to_l2_block,
                latest = latest_number,
                "p2p client is behind the L2 tip"
            );
            return Ok(false);
        }

        let message_block = self.l1_to_l2_message_source.get_block_number().await?;
        if message_block < latest_number {
            debug!(
                target: "proposer_node::sequencer",
                messages = message_block,
                latest = latest_number,
                "L1 to L2 message source is behind the L2 tip"
            );
            return Ok(false);
        }

        Ok(true)
    }
}
