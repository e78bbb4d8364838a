//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - Canonical record hashing (sorted-key JSON + SHA-256)
//! - Merkle roots over transactions and the ownership directory

pub mod hash;
pub mod merkle;

pub use hash::{canonical_json, hash_record, sha256, sha256_hex, try_hash_record};
pub use merkle::{compute_root, hash_pair, leaves_for, merkle_root_from_leaves, MerkleProof};
