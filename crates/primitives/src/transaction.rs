use alloy_primitives::{Bytes, B256};

/// The hash identifying a tx in the pool and on published blocks.
pub type TxHash = B256;

/// A pending tx as stored in the tx pool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tx {
    /// The tx hash.
    pub hash: TxHash,
    /// The serialized tx payload.
    pub payload: Bytes,
}

impl Tx {
    /// Returns a new instance of [`Tx`].
    pub const fn new(hash: TxHash, payload: Bytes) -> Self {
        Self { hash, payload }
    }

    /// The serialized size of the tx in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// A tx that went through the public processor successfully.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessedTx {
    /// The hash of the processed tx.
    pub hash: TxHash,
    /// The serialized tx effects produced by the processor.
    pub effects: Bytes,
}

/// A tx the public processor rejected or failed to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTx {
    /// The failed tx.
    pub tx: Tx,
    /// Why the tx failed.
    pub reason: String,
}
