//! Property Ledger: a permissioned property ledger in Rust
//!
//! This crate provides:
//! - A registry of participants and a directory of who holds which property
//! - A FIFO pool of transfer requests, validated only when mined
//! - Mining cycles that batch transfers into hash-chained blocks
//! - Merkle roots committing to each batch and the resulting ownership state
//! - A PoET-style lottery choosing which participant proposes each block
//! - A REST API and WebSocket feed over a shared ledger
//!
//! # Example
//!
//! ```rust
//! use property_ledger::core::LedgerEngine;
//!
//! let mut ledger = LedgerEngine::new();
//! ledger.register_participant("alice", vec!["x".to_string()]).unwrap();
//! ledger.register_participant("bob", vec![]).unwrap();
//!
//! ledger.submit_transaction("alice", "x", "bob");
//! let report = ledger.mine();
//!
//! assert_eq!(report.committed_blocks, vec![2]);
//! assert_eq!(ledger.holdings("bob").unwrap(), ["x"]);
//! assert!(ledger.verify_chain().is_ok());
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod mining;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::{ConfigError, LedgerConfig, DEFAULT_MAX_BATCH_SIZE};
pub use core::{
    Block, IntegrityError, LedgerEngine, LedgerError, MiningReport, OwnerDirectory,
    RegistrationError, Transaction, ValidationFailure,
};
pub use crypto::{compute_root, hash_record, MerkleProof};
pub use mining::{FixedOrder, MinerScheduler, PoetLottery, TransactionPool};
