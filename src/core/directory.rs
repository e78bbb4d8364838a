//! Participant registry and ownership directory
//!
//! The registry is the set of known identities. The directory maps each
//! identity to the ordered list of properties it currently holds; a property
//! appears under at most one identity at any time.

use crate::crypto::hash_record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Registration errors, surfaced to the caller without retry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Participant already registered: {0}")]
    DuplicateIdentity(String),
    #[error("Malformed identity: {0:?}")]
    MalformedIdentity(String),
    #[error("Malformed property identifier: {0:?}")]
    MalformedProperty(String),
    #[error("Property listed more than once: {0}")]
    DuplicateProperty(String),
    #[error("Property {property} is already held by {owner}")]
    PropertyAlreadyHeld { property: String, owner: String },
}

/// A name or property token must be non-empty and free of whitespace
fn is_well_formed(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

/// Set of registered participant identities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRegistry {
    nodes: BTreeSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity; returns false if it was already present
    pub fn insert(&mut self, identity: &str) -> bool {
        self.nodes.insert(identity.to_string())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.nodes.contains(identity)
    }

    /// Identities in ascending order
    pub fn identities(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Current ownership state: identity -> ordered holdings
///
/// Serializes as a plain JSON object so its digest only depends on content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerDirectory {
    holdings: BTreeMap<String, Vec<String>>,
}

impl OwnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the holdings of an identity
    pub fn install(&mut self, identity: &str, properties: Vec<String>) {
        self.holdings.insert(identity.to_string(), properties);
    }

    /// Holdings of an identity, in acquisition order
    pub fn holdings(&self, identity: &str) -> Option<&[String]> {
        self.holdings.get(identity).map(Vec::as_slice)
    }

    /// Check whether `identity` currently holds `property`
    pub fn holds(&self, identity: &str, property: &str) -> bool {
        self.holdings
            .get(identity)
            .map(|props| props.iter().any(|p| p == property))
            .unwrap_or(false)
    }

    /// Find the current holder of a property
    pub fn owner_of(&self, property: &str) -> Option<&str> {
        self.holdings
            .iter()
            .find(|(_, props)| props.iter().any(|p| p == property))
            .map(|(identity, _)| identity.as_str())
    }

    /// Move a property from seller to buyer
    ///
    /// Callers validate first. Returns false, leaving the directory untouched,
    /// if the seller does not hold the property.
    pub fn transfer(&mut self, seller: &str, property: &str, buyer: &str) -> bool {
        let removed = match self.holdings.get_mut(seller) {
            Some(props) => match props.iter().position(|p| p == property) {
                Some(pos) => {
                    props.remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.holdings
                .entry(buyer.to_string())
                .or_default()
                .push(property.to_string());
        }

        removed
    }

    /// Deep copy for a block's historical record
    pub fn snapshot(&self) -> OwnerDirectory {
        self.clone()
    }

    /// Canonical digest of the ownership state
    pub fn hash(&self) -> String {
        hash_record(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.holdings.iter()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Total number of properties held across all identities
    pub fn property_count(&self) -> usize {
        self.holdings.values().map(Vec::len).sum()
    }
}

impl From<BTreeMap<String, Vec<String>>> for OwnerDirectory {
    fn from(holdings: BTreeMap<String, Vec<String>>) -> Self {
        Self { holdings }
    }
}

/// Check a registration request against the current registry and directory
pub fn check_registration(
    registry: &NodeRegistry,
    directory: &OwnerDirectory,
    identity: &str,
    properties: &[String],
) -> Result<(), RegistrationError> {
    if !is_well_formed(identity) {
        return Err(RegistrationError::MalformedIdentity(identity.to_string()));
    }

    if registry.contains(identity) {
        return Err(RegistrationError::DuplicateIdentity(identity.to_string()));
    }

    let mut seen = BTreeSet::new();
    for property in properties {
        if !is_well_formed(property) {
            return Err(RegistrationError::MalformedProperty(property.clone()));
        }
        if !seen.insert(property.as_str()) {
            return Err(RegistrationError::DuplicateProperty(property.clone()));
        }
        if let Some(owner) = directory.owner_of(property) {
            return Err(RegistrationError::PropertyAlreadyHeld {
                property: property.clone(),
                owner: owner.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> (NodeRegistry, OwnerDirectory) {
        let mut registry = NodeRegistry::new();
        let mut directory = OwnerDirectory::new();
        registry.insert("alice");
        registry.insert("bob");
        directory.install("alice", props(&["x", "y"]));
        directory.install("bob", vec![]);
        (registry, directory)
    }

    #[test]
    fn test_transfer_moves_property_to_tail() {
        let (_, mut directory) = sample();
        directory.install("bob", props(&["z"]));

        assert!(directory.transfer("alice", "x", "bob"));
        assert_eq!(directory.holdings("alice").unwrap(), ["y"]);
        assert_eq!(directory.holdings("bob").unwrap(), ["z", "x"]);
        assert_eq!(directory.owner_of("x"), Some("bob"));
    }

    #[test]
    fn test_transfer_of_unheld_property_is_noop() {
        let (_, mut directory) = sample();
        let before = directory.clone();

        assert!(!directory.transfer("bob", "x", "alice"));
        assert!(!directory.transfer("carol", "x", "alice"));
        assert_eq!(directory, before);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let (_, mut directory) = sample();
        let snapshot = directory.snapshot();

        directory.transfer("alice", "x", "bob");

        assert!(snapshot.holds("alice", "x"));
        assert!(!directory.holds("alice", "x"));
        assert_ne!(snapshot.hash(), directory.hash());
    }

    #[test]
    fn test_directory_serializes_as_plain_map() {
        let (_, directory) = sample();
        let json = serde_json::to_string(&directory).unwrap();
        assert_eq!(json, r#"{"alice":["x","y"],"bob":[]}"#);
        assert_eq!(directory.property_count(), 2);

        assert_eq!(
            crate::crypto::canonical_json(&directory).unwrap(),
            r#"{"alice": ["x", "y"], "bob": []}"#
        );
        assert_eq!(
            directory.hash(),
            "642ee3285fb01fa0dd0bf66ac7aef2e1214b4124ed61ebf6b1e23f53b2db0633"
        );
    }

    #[test]
    fn test_registration_checks() {
        let (registry, directory) = sample();

        assert!(check_registration(&registry, &directory, "carol", &props(&["w"])).is_ok());
        assert!(check_registration(&registry, &directory, "carol", &[]).is_ok());

        assert_eq!(
            check_registration(&registry, &directory, "alice", &[]),
            Err(RegistrationError::DuplicateIdentity("alice".to_string()))
        );
        assert_eq!(
            check_registration(&registry, &directory, "", &[]),
            Err(RegistrationError::MalformedIdentity(String::new()))
        );
        assert_eq!(
            check_registration(&registry, &directory, "carol", &props(&["w", ""])),
            Err(RegistrationError::MalformedProperty(String::new()))
        );
        assert_eq!(
            check_registration(&registry, &directory, "carol", &props(&["w", "w"])),
            Err(RegistrationError::DuplicateProperty("w".to_string()))
        );
        assert_eq!(
            check_registration(&registry, &directory, "carol", &props(&["y"])),
            Err(RegistrationError::PropertyAlreadyHeld {
                property: "y".to_string(),
                owner: "alice".to_string(),
            })
        );
        assert!(matches!(
            check_registration(&registry, &directory, "car ol", &[]),
            Err(RegistrationError::MalformedIdentity(_))
        ));
    }
}
