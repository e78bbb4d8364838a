//! Property transfer requests
//!
//! A transaction asks the ledger to move one property from a seller to a
//! buyer. Transactions carry no signature and are not validated on
//! submission; the mining cycle checks them against the registry and the
//! ownership directory at commit time.

use crate::crypto::hash_record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transfer request `{seller, property, buyer}`
///
/// Field names are serialized capitalized, which is the record shape every
/// committed transaction leaf was hashed with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// Current holder of the property
    #[serde(rename = "Seller")]
    pub seller: String,
    /// Property identifier being transferred
    #[serde(rename = "Property")]
    pub property: String,
    /// Identity receiving the property
    #[serde(rename = "Buyer")]
    pub buyer: String,
}

impl Transaction {
    /// Create a new transfer request
    pub fn new(seller: &str, property: &str, buyer: &str) -> Self {
        Self {
            seller: seller.to_string(),
            property: property.to_string(),
            buyer: buyer.to_string(),
        }
    }

    /// Canonical content hash, used as the Merkle leaf
    pub fn hash(&self) -> String {
        hash_record(self)
    }

    /// Check whether this transaction moves `property`
    pub fn concerns(&self, property: &str) -> bool {
        self.property == property
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.seller, self.buyer, self.property)
    }
}
