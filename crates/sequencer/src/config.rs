use alloy_primitives::{Address, Bytes};

/// Configuration for the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    /// The polling cadence of the work loop in milliseconds.
    pub polling_interval_ms: u64,
    /// The maximum number of txs per block.
    pub max_txs_per_block: usize,
    /// The minimum number of txs a block must carry to be built.
    pub min_txs_per_block: usize,
    /// The maximum cumulative tx size per block in bytes.
    pub max_block_size_in_bytes: usize,
    /// The maximum DA gas a block may consume.
    pub max_block_da_gas: Option<u64>,
    /// The maximum L2 gas a block may consume.
    pub max_block_l2_gas: Option<u64>,
    /// The coinbase address collecting block rewards.
    pub coinbase: Address,
    /// The recipient of tx fees.
    pub fee_recipient: Address,
    /// Contract addresses txs may call during setup, forwarded to the tx validators.
    pub allowed_in_setup: Vec<Address>,
    /// Whether txs must pay fees to be included, forwarded to the tx validators.
    pub enforce_fees: bool,
    /// Whether the per-phase deadline gate is enforced.
    pub enforce_time_table: bool,
    /// Seconds into the L1 slot by which the publish tx must be submitted.
    pub max_l1_tx_inclusion_time_into_slot: u64,
    /// The payload the publisher votes for in governance proposals.
    pub governance_proposer_payload: Option<Bytes>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 1000,
            max_txs_per_block: 32,
            min_txs_per_block: 1,
            max_block_size_in_bytes: 1024 * 1024,
            max_block_da_gas: None,
            max_block_l2_gas: None,
            coinbase: Address::ZERO,
            fee_recipient: Address::ZERO,
            allowed_in_setup: vec![],
            enforce_fees: false,
            enforce_time_table: false,
            max_l1_tx_inclusion_time_into_slot: 0,
            governance_proposer_payload: None,
        }
    }
}

impl SequencerConfig {
    /// Returns a copy of the config with the set fields of `update` applied.
    pub fn merged(&self, update: SequencerConfigUpdate) -> Self {
        let mut config = self.clone();
        if let Some(polling_interval_ms) = update.polling_interval_ms {
            config.polling_interval_ms = polling_interval_ms;
        }
        if let Some(max_txs_per_block) = update.max_txs_per_block {
            config.max_txs_per_block = max_txs_per_block;
        }
        if let Some(min_txs_per_block) = update.min_txs_per_block {
            config.min_txs_per_block = min_txs_per_block;
        }
        if let Some(max_block_size_in_bytes) = update.max_block_size_in_bytes {
            config.max_block_size_in_bytes = max_block_size_in_bytes;
        }
        if let Some(max_block_da_gas) = update.max_block_da_gas {
            config.max_block_da_gas = Some(max_block_da_gas);
        }
        if let Some(max_block_l2_gas) = update.max_block_l2_gas {
            config.max_block_l2_gas = Some(max_block_l2_gas);
        }
        if let Some(coinbase) = update.coinbase {
            config.coinbase = coinbase;
        }
        if let Some(fee_recipient) = update.fee_recipient {
            config.fee_recipient = fee_recipient;
        }
        if let Some(allowed_in_setup) = update.allowed_in_setup {
            config.allowed_in_setup = allowed_in_setup;
        }
        if let Some(enforce_fees) = update.enforce_fees {
            config.enforce_fees = enforce_fees;
        }
        if let Some(enforce_time_table) = update.enforce_time_table {
            config.enforce_time_table = enforce_time_table;
        }
        if let Some(max_l1_tx_inclusion_time_into_slot) = update.max_l1_tx_inclusion_time_into_slot
        {
            config.max_l1_tx_inclusion_time_into_slot = max_l1_tx_inclusion_time_into_slot;
        }
        if let Some(governance_proposer_payload) = update.governance_proposer_payload {
            config.governance_proposer_payload = Some(governance_proposer_payload);
        }
        config
    }
}

/// A partial [`SequencerConfig`]; unset fields keep their current value on update.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SequencerConfigUpdate {
    /// See [`SequencerConfig::polling_interval_ms`].
    pub polling_interval_ms: Option<u64>,
    /// See [`SequencerConfig::max_txs_per_block`].
    pub max_txs_per_block: Option<usize>,
    /// See [`SequencerConfig::min_txs_per_block`].
    pub min_txs_per_block: Option<usize>,
    /// See [`SequencerConfig::max_block_size_in_bytes`].
    pub max_block_size_in_bytes: Option<usize>,
    /// See [`SequencerConfig::max_block_da_gas`].
    pub max_block_da_gas: Option<u64>,
    /// See [`SequencerConfig::max_block_l2_gas`].
    pub max_block_l2_gas: Option<u64>,
    /// See [`SequencerConfig::coinbase`].
    pub coinbase: Option<Address>,
    /// See [`SequencerConfig::fee_recipient`].
    pub fee_recipient: Option<Address>,
    /// See [`SequencerConfig::allowed_in_setup`].
    pub allowed_in_setup: Option<Vec<Address>>,
    /// See [`SequencerConfig::enforce_fees`].
    pub enforce_fees: Option<bool>,
    /// See [`SequencerConfig::enforce_time_table`].
    pub enforce_time_table: Option<bool>,
    /// See [`SequencerConfig::max_l1_tx_inclusion_time_into_slot`].
    pub max_l1_tx_inclusion_time_into_slot: Option<u64>,
    /// See [`SequencerConfig::governance_proposer_payload`].
    pub governance_proposer_payload: Option<Bytes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_set_fields_only() {
        let config = SequencerConfig::default();
        let merged = config.merged(SequencerConfigUpdate {
            min_txs_per_block: Some(4),
            coinbase: Some(Address::repeat_byte(0x11)),
            ..Default::default()
        });

        assert_eq!(merged.min_txs_per_block, 4);
        assert_eq!(merged.coinbase, Address::repeat_byte(0x11));
        assert_eq!(merged.polling_interval_ms, config.polling_interval_ms);
        assert_eq!(merged.max_txs_per_block, config.max_txs_per_block);
    }

    #[test]
    fn empty_update_is_identity() {
        let config = SequencerConfig {
            min_txs_per_block: 7,
            enforce_time_table: true,
            ..Default::default()
        };
        assert_eq!(config.merged(SequencerConfigUpdate::default()), config);
    }
}
