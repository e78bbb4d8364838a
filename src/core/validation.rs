//! Transfer validation
//!
//! A transfer is accepted only if both parties are registered and the
//! seller holds the property in the live directory at the moment of the
//! check. Rejections are informational: the mining cycle drops the
//! transaction and moves on.

use crate::core::directory::{NodeRegistry, OwnerDirectory};
use crate::core::transaction::Transaction;
use serde::Serialize;
use thiserror::Error;

/// Why a transfer was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail")]
pub enum ValidationFailure {
    #[error("Unknown seller: {0}")]
    UnknownSeller(String),
    #[error("Unknown buyer: {0}")]
    UnknownBuyer(String),
    #[error("{seller} does not hold {property}")]
    PropertyNotHeld { seller: String, property: String },
}

/// Checks transfers against the registry and the live directory
pub struct TransactionValidator<'a> {
    registry: &'a NodeRegistry,
    directory: &'a OwnerDirectory,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(registry: &'a NodeRegistry, directory: &'a OwnerDirectory) -> Self {
        Self {
            registry,
            directory,
        }
    }

    /// Validate a transfer, returning the first reason it fails
    pub fn validate(
        &self,
        seller: &str,
        property: &str,
        buyer: &str,
    ) -> Result<(), ValidationFailure> {
        if !self.registry.contains(seller) {
            return Err(ValidationFailure::UnknownSeller(seller.to_string()));
        }
        if !self.registry.contains(buyer) {
            return Err(ValidationFailure::UnknownBuyer(buyer.to_string()));
        }
        if !self.directory.holds(seller, property) {
            return Err(ValidationFailure::PropertyNotHeld {
                seller: seller.to_string(),
                property: property.to_string(),
            });
        }
        Ok(())
    }

    pub fn is_valid(&self, seller: &str, property: &str, buyer: &str) -> bool {
        self.validate(seller, property, buyer).is_ok()
    }

    pub fn check(&self, tx: &Transaction) -> Result<(), ValidationFailure> {
        self.validate(&tx.seller, &tx.property, &tx.buyer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (NodeRegistry, OwnerDirectory) {
        let mut registry = NodeRegistry::new();
        let mut directory = OwnerDirectory::new();
        for (name, props) in [("zia", vec!["usa", "uk"]), ("gia", vec!["delhi"])] {
            registry.insert(name);
            directory.install(name, props.into_iter().map(String::from).collect());
        }
        (registry, directory)
    }

    #[test]
    fn test_valid_transfer() {
        let (registry, directory) = setup();
        let validator = TransactionValidator::new(&registry, &directory);
        assert!(validator.is_valid("zia", "uk", "gia"));
        assert!(validator.check(&Transaction::new("gia", "delhi", "zia")).is_ok());
    }

    #[test]
    fn test_unregistered_parties() {
        let (registry, directory) = setup();
        let validator = TransactionValidator::new(&registry, &directory);

        assert_eq!(
            validator.validate("mia", "uk", "gia"),
            Err(ValidationFailure::UnknownSeller("mia".to_string()))
        );
        assert_eq!(
            validator.validate("zia", "uk", "mia"),
            Err(ValidationFailure::UnknownBuyer("mia".to_string()))
        );
    }

    #[test]
    fn test_property_not_held() {
        let (registry, directory) = setup();
        let validator = TransactionValidator::new(&registry, &directory);

        assert!(!validator.is_valid("gia", "uk", "zia"));
        assert!(!validator.is_valid("zia", "mars", "gia"));
    }

    #[test]
    fn test_checks_live_directory() {
        let (registry, mut directory) = setup();
        directory.transfer("zia", "uk", "gia");

        let validator = TransactionValidator::new(&registry, &directory);
        assert!(!validator.is_valid("zia", "uk", "gia"));
        assert!(validator.is_valid("gia", "uk", "zia"));
    }

    #[test]
    fn test_failure_serializes_with_reason() {
        let failure = ValidationFailure::UnknownBuyer("mia".to_string());
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(json, r#"{"reason":"UnknownBuyer","detail":"mia"}"#);
    }
}
