//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (property transfer requests)
//! - Participant registry and ownership directory
//! - Transfer validation
//! - Blocks (batch + directory snapshot + merkle commitment)
//! - Ledger engine (mining cycle, chain verification)

pub mod block;
pub mod directory;
pub mod ledger;
pub mod transaction;
pub mod validation;

pub use block::{Block, BlockTransactions, GENESIS_MINER, GENESIS_PREVIOUS_HASH, NO_TRANSACTIONS};
pub use directory::{check_registration, NodeRegistry, OwnerDirectory, RegistrationError};
pub use ledger::{
    verify_blocks, ChainStats, IntegrityError, LedgerEngine, LedgerError, MiningReport,
    RejectedTransfer, UNASSIGNED_MINER,
};
pub use transaction::Transaction;
pub use validation::{TransactionValidator, ValidationFailure};
