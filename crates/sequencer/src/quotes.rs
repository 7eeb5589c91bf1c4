use crate::error::SequencerError;
use proposer_node_primitives::EpochProofQuote;
use proposer_node_providers::{L1Publisher, TxPool};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Bids on proof quotes for the claimable prior epoch: fetches the gossiped quotes, filters
/// them for validity and picks the cheapest.
#[derive(Clone)]
pub(crate) struct ProofQuoteBidder {
    publisher: Arc<dyn L1Publisher>,
    pool: Arc<dyn TxPool>,
}

impl ProofQuoteBidder {
    pub(crate) fn new(publisher: Arc<dyn L1Publisher>, pool: Arc<dyn TxPool>) -> Self {
        Self { publisher, pool }
    }

    /// The cheapest valid quote for the claimable epoch, if there is one. Collaborator
    /// failures are logged and treated as "no quote".
    pub(crate) async fn best_quote(&self, current_slot: u64) -> Option<EpochProofQuote> {
        let epoch = match self.publisher.get_claimable_epoch().await {
            Ok(Some(epoch)) => epoch,
            Ok(None) => return None,
            Err(err) => {
                debug!(target: "proposer_node::sequencer", %err, "failed to fetch claimable epoch");
                return None;
            }
        };

        let quotes = match self.pool.get_epoch_proof_quotes(epoch).await {
            Ok(quotes) => quotes,
            Err(err) => {
                warn!(target: "proposer_node::sequencer", %err, epoch, "failed to fetch epoch proof quotes");
                return None;
            }
        };
        let total = quotes.len();

        let mut valid = Vec::with_capacity(total);
        for quote in quotes {
            if quote.epoch_to_prove != epoch || quote.valid_until_slot < current_slot {
                continue;
            }
            if let Some(quote) = self.publisher.validate_proof_quote(&quote).await {
                valid.push(quote);
            }
        }
        debug!(
            target: "proposer_node::sequencer",
            epoch,
            total,
            valid = valid.len(),
            "filtered epoch proof quotes"
        );

        // quotes order by fee ascending
        valid.sort();
        valid.into_iter().next()
    }

    /// Claims the proof right for the best available quote, if any.
    pub(crate) async fn claim_if_available(&self, current_slot: u64) -> Result<(), SequencerError> {
        let Some(quote) = self.best_quote(current_slot).await else { return Ok(()) };
        let epoch = quote.epoch_to_prove;

        let claimed = self.publisher.claim_epoch_proof_right(&quote).await.map_err(|err| {
            warn!(target: "proposer_node::sequencer", %err, epoch, "epoch proof claim tx failed");
            SequencerError::ClaimFailed { epoch }
        })?;
        if !claimed {
            return Err(SequencerError::ClaimFailed { epoch });
        }

        info!(
            target: "proposer_node::sequencer",
            epoch,
            basis_point_fee = quote.basis_point_fee,
            prover = %quote.prover,
            "claimed epoch proof right"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ProofQuoteBidder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofQuoteBidder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use proposer_node_providers::test_utils::{test_quote, MockPublisher, MockTxPool};

    fn bidder(publisher: Arc<MockPublisher>, pool: Arc<MockTxPool>) -> ProofQuoteBidder {
        ProofQuoteBidder::new(publisher, pool)
    }

    #[tokio::test]
    async fn returns_none_without_claimable_epoch() {
        let publisher = Arc::new(MockPublisher::new(1, 1));
        let pool = Arc::new(MockTxPool::default());

        assert!(bidder(publisher, pool).best_quote(10).await.is_none());
    }

    #[tokio::test]
    async fn picks_the_cheapest_valid_quote() {
        let publisher = Arc::new(MockPublisher::new(1, 1));
        *publisher.claimable_epoch.lock().unwrap() = Some(3);
        let pool = Arc::new(MockTxPool::default());
        pool.quotes.lock().unwrap().insert(
            3,
            vec![
                test_quote(3, 100, 100, 0x01),
                test_quote(3, 100, 50, 0x02),
                test_quote(3, 100, 75, 0x03),
            ],
        );
        // the cheapest quote fails publisher validation
        *publisher.valid_quote_provers.lock().unwrap() =
            Some(vec![Address::repeat_byte(0x01), Address::repeat_byte(0x03)]);

        let quote = bidder(publisher, pool).best_quote(10).await.unwrap();
        assert_eq!(quote.basis_point_fee, 75);
    }

    #[tokio::test]
    async fn filters_expired_and_mismatched_quotes() {
        let publisher = Arc::new(MockPublisher::new(1, 1));
        *publisher.claimable_epoch.lock().unwrap() = Some(3);
        let pool = Arc::new(MockTxPool::default());
        pool.quotes.lock().unwrap().insert(
            3,
            vec![
                // expired before the current slot
                test_quote(3, 9, 10, 0x01),
                // quotes a different epoch
                test_quote(4, 100, 20, 0x02),
                test_quote(3, 10, 30, 0x03),
            ],
        );

        let quote = bidder(publisher, pool).best_quote(10).await.unwrap();
        assert_eq!(quote.basis_point_fee, 30);
    }

    #[tokio::test]
    async fn claim_failure_surfaces() {
        let publisher = Arc::new(MockPublisher::new(1, 1));
        *publisher.claimable_epoch.lock().unwrap() = Some(3);
        publisher.claim_result.store(false, std::sync::atomic::Ordering::Relaxed);
        let pool = Arc::new(MockTxPool::default());
        pool.quotes.lock().unwrap().insert(3, vec![test_quote(3, 100, 50, 0x02)]);

        let err = bidder(publisher, pool).claim_if_available(10).await.unwrap_err();
        assert!(matches!(err, SequencerError::ClaimFailed { epoch: 3 }));
    }
}
