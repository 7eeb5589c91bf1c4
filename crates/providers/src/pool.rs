use proposer_node_primitives::{EpochProofQuote, Tx, TxHash};

/// An error that occurred while interacting with the tx pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool backend failed.
    #[error("tx pool error: {0}")]
    Backend(String),
}

/// The sync status of the p2p client backing the pool.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    /// The highest L2 block the p2p client has synced to.
    pub synced_to_l2_block: u64,
}

/// The pending-tx pool maintained by the p2p client.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait TxPool: Send + Sync {
    /// The number of pending txs in the pool.
    async fn pending_tx_count(&self) -> Result<usize, PoolError>;

    /// Returns up to `limit` pending txs. Iteration is lazy on the pool side; txs added
    /// concurrently may or may not be observed.
    async fn pending_txs(&self, limit: usize) -> Result<Vec<Tx>, PoolError>;

    /// Removes the given txs from the pool.
    async fn delete_txs(&self, hashes: Vec<TxHash>) -> Result<(), PoolError>;

    /// Returns the epoch proof quotes gossiped for the given epoch.
    async fn get_epoch_proof_quotes(
        &self,
        epoch: u64,
    ) -> Result<Vec<EpochProofQuote>, PoolError>;

    /// The sync status of the p2p client.
    async fn status(&self) -> Result<PoolStatus, PoolError>;
}
