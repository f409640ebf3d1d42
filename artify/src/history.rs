//! In-memory record of completed mints.
//!
//! The gateway keeps a small per-process history so clients can list what
//! was minted during the current run. Records never outlive the process;
//! the chain itself is the durable record.

use ethers_core::types::{Address, H256, U256};
use serde::Serialize;

/// One confirmed mint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MintRecord {
    /// Content identifier baked into the token.
    pub cid: String,
    /// Score as submitted to the contract.
    pub score: u8,
    /// Hash of the confirmed mint transaction.
    pub transaction_hash: H256,
    /// Token id, when the receipt carried a recognisable `Transfer` event.
    pub token_id: Option<U256>,
    /// Wallet address the token was minted to.
    pub minted_by: Address,
    /// Unix timestamp (seconds) of confirmation, as observed locally.
    pub minted_at: u64,
}

/// Append-only in-memory mint history.
#[derive(Debug, Default)]
pub struct MintHistory {
    records: Vec<MintRecord>,
}

impl MintHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a confirmed mint.
    pub fn push(&mut self, record: MintRecord) {
        self.records.push(record);
    }

    /// All records, oldest first.
    pub fn all(&self) -> &[MintRecord] {
        &self.records
    }

    /// Records minted to `address`, oldest first.
    pub fn for_address(&self, address: Address) -> Vec<&MintRecord> {
        self.records
            .iter()
            .filter(|r| r.minted_by == address)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cid: &str, by: Address) -> MintRecord {
        MintRecord {
            cid: cid.to_string(),
            score: 95,
            transaction_hash: H256::from_low_u64_be(1),
            token_id: Some(U256::from(1u64)),
            minted_by: by,
            minted_at: 1_700_000_000,
        }
    }

    #[test]
    fn history_preserves_insertion_order() {
        let mut history = MintHistory::new();
        assert!(history.is_empty());

        let addr = Address::from([1u8; 20]);
        history.push(record("QmA", addr));
        history.push(record("QmB", addr));

        assert_eq!(history.len(), 2);
        assert_eq!(history.all()[0].cid, "QmA");
        assert_eq!(history.all()[1].cid, "QmB");
    }

    #[test]
    fn records_can_be_filtered_by_minter() {
        let mut history = MintHistory::new();
        let alice = Address::from([1u8; 20]);
        let bob = Address::from([2u8; 20]);

        history.push(record("QmA", alice));
        history.push(record("QmB", bob));
        history.push(record("QmC", alice));

        let mine = history.for_address(alice);
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.minted_by == alice));
    }
}
