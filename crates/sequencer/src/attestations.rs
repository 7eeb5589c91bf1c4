use crate::{error::SequencerError, state::SequencerPhase, Sequencer};
use alloy_primitives::Address;
use proposer_node_primitives::{Attestation, L2Block};
use proposer_node_providers::ValidatorClient;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The attestation quorum for a committee of the given size.
pub(crate) const fn attestation_threshold(committee_size: usize) -> usize {
    committee_size * 2 / 3 + 1
}

impl Sequencer {
    /// Solicits attestations over the built block from the current committee.
    ///
    /// Returns `None` when publication should proceed without attestations: the committee is
    /// empty, or the validator client could not produce a proposal.
    pub(crate) async fn collect_attestations(
        &mut self,
        block: &L2Block,
        slot: u64,
    ) -> Result<Option<Vec<Attestation>>, SequencerError> {
        let committee = self.publisher.get_current_epoch_committee().await?;
        if committee.is_empty() {
            debug!(
                target: "proposer_node::sequencer",
                "committee is empty, publishing without attestations"
            );
            return Ok(None);
        }

        let validator = self.validator_client.clone().ok_or(SequencerError::NoValidator)?;

        self.set_phase(SequencerPhase::CollectingAttestations, slot, false)?;

        self.metrics.start_attestation_recording();
        let result = collect(validator.as_ref(), &committee, block).await;
        self.metrics.finish_attestation_recording();
        result
    }
}

async fn collect(
    validator: &dyn ValidatorClient,
    committee: &[Address],
    block: &L2Block,
) -> Result<Option<Vec<Attestation>>, SequencerError> {
    let proposal =
        validator.create_block_proposal(&block.header, block.archive, &block.tx_hashes).await?;
    let Some(proposal) = proposal else {
        warn!(
            target: "proposer_node::sequencer",
            "validator returned no proposal, publishing without attestations"
        );
        return Ok(None);
    };

    validator.broadcast_block_proposal(&proposal).await?;

    let threshold = attestation_threshold(committee.len());
    let attestations = validator.collect_attestations(&proposal, threshold).await?;
    debug!(
        target: "proposer_node::sequencer",
        collected = attestations.len(),
        threshold,
        "collected attestations"
    );

    Ok(Some(order_by_committee(committee, attestations)))
}

/// Reorders attestations to committee order, as the rollup contract requires. Attestations
/// from signers outside the committee are dropped.
fn order_by_committee(committee: &[Address], attestations: Vec<Attestation>) -> Vec<Attestation> {
    let mut by_signer: HashMap<Address, Attestation> =
        attestations.into_iter().map(|attestation| (attestation.signer, attestation)).collect();
    committee.iter().filter_map(|signer| by_signer.remove(signer)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    fn attestation(seed: u8) -> Attestation {
        Attestation { signer: Address::repeat_byte(seed), signature: Bytes::from(vec![seed; 65]) }
    }

    #[test]
    fn threshold_is_two_thirds_plus_one() {
        assert_eq!(attestation_threshold(0), 1);
        assert_eq!(attestation_threshold(3), 3);
        assert_eq!(attestation_threshold(4), 3);
        assert_eq!(attestation_threshold(48), 33);
    }

    #[test]
    fn orders_attestations_to_committee_order() {
        let committee =
            vec![Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)];
        let ordered = order_by_committee(
            &committee,
            vec![attestation(3), attestation(1), attestation(2)],
        );

        assert_eq!(
            ordered.iter().map(|a| a.signer).collect::<Vec<_>>(),
            committee
        );
    }

    #[test]
    fn drops_unknown_signers_and_absentees() {
        let committee =
            vec![Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)];
        let ordered =
            order_by_committee(&committee, vec![attestation(9), attestation(2)]);

        assert_eq!(ordered.iter().map(|a| a.signer).collect::<Vec<_>>(), vec![
            Address::repeat_byte(2)
        ]);
    }
}
