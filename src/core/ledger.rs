//! Ledger engine
//!
//! Owns the participant registry, the ownership directory, the pending pool
//! and the chain, and runs mining cycles over them.
//!
//! A mining cycle asks the scheduler for a proposer order, then drains the
//! pool in batches of at most `max_batch_size`. Each transfer in a batch is
//! validated against the live directory and applied immediately, so a later
//! rejection in the same batch never rolls back an earlier transfer. Every
//! batch with at least one survivor becomes a block, proposed by the next
//! miner in the order (wrapping around). The pool is cleared at the end of
//! the cycle, discarding rejected transfers.

use crate::config::{ConfigError, LedgerConfig};
use crate::core::block::{Block, GENESIS_PREVIOUS_HASH};
use crate::core::directory::{
    check_registration, NodeRegistry, OwnerDirectory, RegistrationError,
};
use crate::core::transaction::Transaction;
use crate::core::validation::{TransactionValidator, ValidationFailure};
use crate::crypto::MerkleProof;
use crate::mining::{MinerScheduler, PoetLottery, TransactionPool};
use log::{info, warn};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

/// Miner recorded if a block is committed with an empty proposer order
pub const UNASSIGNED_MINER: &str = "unassigned";

/// Chain integrity violations; always fatal to the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Chain is empty")]
    EmptyChain,
    #[error("Invalid genesis block: {0}")]
    BadGenesis(String),
    #[error("Block at position {position} has index {found}")]
    IndexMismatch { position: u64, found: u64 },
    #[error("Block {index} does not link to its predecessor (expected {expected}, found {found})")]
    BrokenLink {
        index: u64,
        expected: String,
        found: String,
    },
    #[error("Block {index} merkle root mismatch")]
    MerkleMismatch { index: u64 },
    #[error("Block {index} is malformed: {reason}")]
    MalformedBlock { index: u64, reason: String },
}

/// Ledger-related errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// A transfer dropped during a mining cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedTransfer {
    pub transaction: Transaction,
    pub reason: ValidationFailure,
}

/// Outcome of one mining cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct MiningReport {
    /// Proposer order drawn for this cycle
    pub miner_order: Vec<String>,
    /// Indices of the blocks appended
    pub committed_blocks: Vec<u64>,
    /// Number of transfers applied
    pub accepted: usize,
    /// Transfers dropped, with the reason
    pub rejected: Vec<RejectedTransfer>,
    /// Wall-clock duration of the cycle
    pub duration_ms: u128,
}

/// Chain statistics
#[derive(Debug, Clone, Serialize)]
pub struct ChainStats {
    pub length: usize,
    pub committed_transfers: usize,
    pub pending_transfers: usize,
    pub participants: usize,
    pub properties: usize,
    pub latest_hash: String,
}

/// The ledger: registry, directory, pool and chain behind one owner
pub struct LedgerEngine {
    registry: NodeRegistry,
    directory: OwnerDirectory,
    pool: TransactionPool,
    chain: Vec<Block>,
    scheduler: Box<dyn MinerScheduler>,
    max_batch_size: usize,
}

impl LedgerEngine {
    /// Create an empty ledger with default settings
    pub fn new() -> Self {
        let config = LedgerConfig::default();
        Self {
            registry: NodeRegistry::new(),
            directory: OwnerDirectory::new(),
            pool: TransactionPool::new(),
            chain: vec![Block::genesis(OwnerDirectory::new())],
            scheduler: Box::new(PoetLottery::new()),
            max_batch_size: config.max_batch_size,
        }
    }

    /// Create a ledger whose genesis block records the configured participants
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;

        let mut registry = NodeRegistry::new();
        let mut directory = OwnerDirectory::new();
        for (identity, properties) in &config.genesis_directory {
            check_registration(&registry, &directory, identity, properties)?;
            registry.insert(identity);
            directory.install(identity, properties.clone());
        }

        let scheduler: Box<dyn MinerScheduler> = match config.seed {
            Some(seed) => Box::new(PoetLottery::with_seed(seed)),
            None => Box::new(PoetLottery::new()),
        };

        info!(
            "Ledger initialised with {} participant(s), batch size {}",
            registry.len(),
            config.max_batch_size
        );

        Ok(Self {
            chain: vec![Block::genesis(directory.snapshot())],
            registry,
            directory,
            pool: TransactionPool::new(),
            scheduler,
            max_batch_size: config.max_batch_size,
        })
    }

    /// Replace the proposer scheduling strategy
    pub fn with_scheduler(mut self, scheduler: Box<dyn MinerScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    // =========================================================================
    // Participants
    // =========================================================================

    /// Register a participant with its initial holdings
    pub fn register_participant(
        &mut self,
        identity: &str,
        properties: Vec<String>,
    ) -> Result<(), RegistrationError> {
        check_registration(&self.registry, &self.directory, identity, &properties)?;

        info!(
            "Registered participant {} with {} propert{}",
            identity,
            properties.len(),
            if properties.len() == 1 { "y" } else { "ies" }
        );

        self.registry.insert(identity);
        self.directory.install(identity, properties);
        Ok(())
    }

    pub fn is_registered(&self, identity: &str) -> bool {
        self.registry.contains(identity)
    }

    /// Registered identities in ascending order
    pub fn participants(&self) -> Vec<String> {
        self.registry.identities()
    }

    pub fn holdings(&self, identity: &str) -> Option<&[String]> {
        self.directory.holdings(identity)
    }

    pub fn owner_of(&self, property: &str) -> Option<&str> {
        self.directory.owner_of(property)
    }

    /// Live ownership state
    pub fn directory(&self) -> &OwnerDirectory {
        &self.directory
    }

    /// Copy of the current ownership state
    pub fn get_directory(&self) -> OwnerDirectory {
        self.directory.snapshot()
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Queue a transfer; validation is deferred to mining
    pub fn submit_transaction(&mut self, seller: &str, property: &str, buyer: &str) {
        self.submit(Transaction::new(seller, property, buyer));
    }

    pub fn submit(&mut self, tx: Transaction) {
        self.pool.submit(tx);
    }

    /// Pending transfers in submission order
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pool.pending()
    }

    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }

    /// Every committed transfer of `property`, oldest first
    pub fn transaction_history(&self, property: &str) -> Vec<Transaction> {
        self.chain
            .iter()
            .filter(|block| !block.is_genesis())
            .flat_map(|block| block.transfers())
            .filter(|tx| tx.concerns(property))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Mining
    // =========================================================================

    /// Run one full mining cycle
    pub fn mine(&mut self) -> MiningReport {
        let start = Instant::now();

        let miner_order = self.scheduler.assign_order(&self.registry.identities());
        info!("Miner order by time assigned: {:?}", miner_order);

        let mut report = MiningReport {
            miner_order,
            ..Default::default()
        };
        let mut commit_count = 0usize;

        while !self.pool.is_empty() {
            let batch = self.pool.drain_batch(self.max_batch_size);
            let mut survivors = Vec::with_capacity(batch.len());

            for tx in batch {
                let verdict = TransactionValidator::new(&self.registry, &self.directory).check(&tx);
                match verdict {
                    Ok(()) => {
                        self.directory.transfer(&tx.seller, &tx.property, &tx.buyer);
                        survivors.push(tx);
                    }
                    Err(reason) => {
                        warn!("Invalid transaction {}: {}; transaction aborted", tx, reason);
                        report.rejected.push(RejectedTransfer {
                            transaction: tx,
                            reason,
                        });
                    }
                }
            }

            if survivors.is_empty() {
                continue;
            }

            let miner = rotate(&report.miner_order, commit_count)
                .unwrap_or(UNASSIGNED_MINER)
                .to_string();
            report.accepted += survivors.len();

            let block = Block::new(
                self.chain.len() as u64 + 1,
                self.latest_block().hash(),
                survivors,
                self.directory.snapshot(),
                &miner,
            );

            info!(
                "Block {} committed by {} with {} transfer(s), merkle root {}",
                block.index,
                block.miner,
                block.tx_count(),
                &block.merkle_root[..16]
            );

            report.committed_blocks.push(block.index);
            self.chain.push(block);
            commit_count += 1;
        }

        self.pool.clear();
        report.duration_ms = start.elapsed().as_millis();

        info!(
            "Mining cycle finished: {} block(s), {} accepted, {} rejected in {}ms",
            report.committed_blocks.len(),
            report.accepted,
            report.rejected.len(),
            report.duration_ms
        );

        report
    }

    // =========================================================================
    // Chain access
    // =========================================================================

    /// All blocks, genesis first
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Blocks together with the chain length
    pub fn get_chain(&self) -> (&[Block], usize) {
        (&self.chain, self.chain.len())
    }

    /// Number of blocks, genesis included
    pub fn block_count(&self) -> usize {
        self.chain.len()
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Ledger should have at least genesis block")
    }

    /// Get a block by its 1-based index
    pub fn get_block(&self, index: u64) -> Option<&Block> {
        index
            .checked_sub(1)
            .and_then(|pos| self.chain.get(pos as usize))
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Inclusion proof for a committed transfer
    pub fn transaction_proof(&self, block_index: u64, position: usize) -> Option<MerkleProof> {
        self.get_block(block_index)
            .and_then(|block| block.transaction_proof(position))
    }

    /// Validate the entire chain
    pub fn verify_chain(&self) -> Result<(), IntegrityError> {
        verify_blocks(&self.chain, self.max_batch_size)
    }

    /// Get chain statistics
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            length: self.chain.len(),
            committed_transfers: self.chain.iter().map(Block::tx_count).sum(),
            pending_transfers: self.pool.len(),
            participants: self.registry.len(),
            properties: self.directory.property_count(),
            latest_hash: self.latest_block().hash(),
        }
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Proposer for the `n`th block of a cycle, wrapping around the order
fn rotate(order: &[String], n: usize) -> Option<&str> {
    if order.is_empty() {
        return None;
    }
    order.get(n % order.len()).map(String::as_str)
}

/// Check hash links, indices and merkle roots of a block sequence
pub fn verify_blocks(blocks: &[Block], max_batch_size: usize) -> Result<(), IntegrityError> {
    let genesis = blocks.first().ok_or(IntegrityError::EmptyChain)?;

    if !genesis.is_genesis() {
        return Err(IntegrityError::BadGenesis(
            "first block carries transactions".to_string(),
        ));
    }
    if genesis.previous_hash != GENESIS_PREVIOUS_HASH {
        return Err(IntegrityError::BadGenesis(format!(
            "previous hash is {}",
            genesis.previous_hash
        )));
    }

    for (position, block) in blocks.iter().enumerate() {
        let expected_index = position as u64 + 1;
        if block.index != expected_index {
            return Err(IntegrityError::IndexMismatch {
                position: expected_index,
                found: block.index,
            });
        }

        if position > 0 {
            let count = block.tx_count();
            if block.is_genesis() || count == 0 {
                return Err(IntegrityError::MalformedBlock {
                    index: block.index,
                    reason: "no transactions".to_string(),
                });
            }
            if count > max_batch_size {
                return Err(IntegrityError::MalformedBlock {
                    index: block.index,
                    reason: format!("{} transactions exceed cap of {}", count, max_batch_size),
                });
            }

            let expected = blocks[position - 1].hash();
            if block.previous_hash != expected {
                return Err(IntegrityError::BrokenLink {
                    index: block.index,
                    expected,
                    found: block.previous_hash.clone(),
                });
            }
        }

        if !block.verify_merkle_root() {
            return Err(IntegrityError::MerkleMismatch { index: block.index });
        }
    }

    Ok(())
}
