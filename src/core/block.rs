//! Block implementation for the ledger
//!
//! A block records a batch of committed transfers, the miner that proposed
//! it, a deep copy of the ownership directory after the batch was applied,
//! and a Merkle root binding the two together.

use crate::core::directory::OwnerDirectory;
use crate::core::transaction::Transaction;
use crate::crypto::{compute_root, hash_record, leaves_for, MerkleProof};
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// =============================================================================
// Genesis Constants
// =============================================================================

/// `previous_hash` of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Miner identity recorded on the genesis block
pub const GENESIS_MINER: &str = "Genesis Block";

/// Marker stored in place of a transaction list on the genesis block
pub const NO_TRANSACTIONS: &str = "No Transactions";

/// Transactions carried by a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTransactions {
    /// The genesis block carries no transfers
    Genesis,
    /// A validated batch, in submission order
    Batch(Vec<Transaction>),
}

impl BlockTransactions {
    pub fn as_slice(&self) -> &[Transaction] {
        match self {
            BlockTransactions::Genesis => &[],
            BlockTransactions::Batch(txs) => txs,
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, BlockTransactions::Genesis)
    }
}

impl Serialize for BlockTransactions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockTransactions::Genesis => serializer.serialize_str(NO_TRANSACTIONS),
            BlockTransactions::Batch(txs) => txs.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BlockTransactions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Marker(String),
            Batch(Vec<Transaction>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Marker(marker) if marker == NO_TRANSACTIONS => Ok(BlockTransactions::Genesis),
            Repr::Marker(other) => Err(de::Error::custom(format!(
                "unexpected transactions marker: {}",
                other
            ))),
            Repr::Batch(txs) => Ok(BlockTransactions::Batch(txs)),
        }
    }
}

/// A block in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain
    pub index: u64,
    /// Commit time
    pub timestamp: DateTime<Utc>,
    /// Committed transfers
    pub transactions: BlockTransactions,
    /// Hash of the preceding block
    pub previous_hash: String,
    /// Root over the transaction leaves followed by the directory leaf
    pub merkle_root: String,
    /// Ownership state right after this block's transfers were applied
    pub directory: OwnerDirectory,
    /// Participant that proposed the block
    pub miner: String,
}

impl Block {
    /// Create a block committing `transactions` with the given snapshot
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        directory: OwnerDirectory,
        miner: &str,
    ) -> Self {
        let merkle_root = compute_root(&transactions, &directory);

        Self {
            index,
            timestamp: Utc::now(),
            transactions: BlockTransactions::Batch(transactions),
            previous_hash,
            merkle_root,
            directory,
            miner: miner.to_string(),
        }
    }

    /// Create the genesis block over the initial ownership state
    ///
    /// Its root is the digest of the directory alone.
    pub fn genesis(directory: OwnerDirectory) -> Self {
        Self {
            index: 1,
            timestamp: Utc::now(),
            transactions: BlockTransactions::Genesis,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            merkle_root: directory.hash(),
            directory,
            miner: GENESIS_MINER.to_string(),
        }
    }

    /// Canonical hash of the whole block
    pub fn hash(&self) -> String {
        hash_record(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.transactions.is_genesis()
    }

    /// Committed transfers (empty for genesis)
    pub fn transfers(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn tx_count(&self) -> usize {
        self.transfers().len()
    }

    /// Recompute the root from the stored transactions and snapshot
    pub fn calculate_merkle_root(&self) -> String {
        match &self.transactions {
            BlockTransactions::Genesis => self.directory.hash(),
            BlockTransactions::Batch(txs) => compute_root(txs, &self.directory),
        }
    }

    /// Verify the block's merkle root
    pub fn verify_merkle_root(&self) -> bool {
        self.calculate_merkle_root() == self.merkle_root
    }

    /// Inclusion proof for the transaction at `position`
    pub fn transaction_proof(&self, position: usize) -> Option<MerkleProof> {
        match &self.transactions {
            BlockTransactions::Genesis => None,
            BlockTransactions::Batch(txs) if position < txs.len() => {
                MerkleProof::build(&leaves_for(txs, &self.directory), position)
            }
            BlockTransactions::Batch(_) => None,
        }
    }
}
