//! Merkle commitment over a block's transactions and ownership state
//!
//! Leaves are hex digests. Each level pairs leaves left to right and hashes
//! the concatenation of the two hex strings; an odd level first duplicates its
//! last leaf. The directory digest is always appended as the final leaf, which
//! binds every block to the ownership state it produced.

use super::hash::{hash_record, sha256_hex};
use serde::{Deserialize, Serialize};

/// Hash two child digests into their parent
pub fn hash_pair(left: &str, right: &str) -> String {
    let mut data = String::with_capacity(left.len() + right.len());
    data.push_str(left);
    data.push_str(right);
    sha256_hex(data.as_bytes())
}

/// Calculate the merkle root from a list of hex leaf digests
pub fn merkle_root_from_leaves(leaves: &[String]) -> String {
    if leaves.is_empty() {
        return sha256_hex(b"");
    }

    let mut current_level: Vec<String> = leaves.to_vec();

    while current_level.len() > 1 {
        if current_level.len() % 2 == 1 {
            if let Some(last) = current_level.last().cloned() {
                current_level.push(last);
            }
        }

        current_level = current_level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }

    current_level.remove(0)
}

/// Leaf digests for a batch: one per transaction, then the directory digest
pub fn leaves_for<T, D>(transactions: &[T], directory: &D) -> Vec<String>
where
    T: Serialize,
    D: Serialize + ?Sized,
{
    let mut leaves: Vec<String> = transactions.iter().map(|tx| hash_record(tx)).collect();
    leaves.push(hash_record(directory));
    leaves
}

/// Compute the root committing to `transactions` and the `directory` snapshot
pub fn compute_root<T, D>(transactions: &[T], directory: &D) -> String
where
    T: Serialize,
    D: Serialize + ?Sized,
{
    merkle_root_from_leaves(&leaves_for(transactions, directory))
}

/// Merkle proof for verifying that a leaf is committed under a root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Position of the proven leaf in the bottom level
    pub leaf_index: usize,
    /// Sibling digests from leaf to root with `true` when the sibling is on the left
    pub siblings: Vec<(String, bool)>,
}

impl MerkleProof {
    /// Build the proof for the leaf at `leaf_index`
    pub fn build(leaves: &[String], leaf_index: usize) -> Option<Self> {
        if leaf_index >= leaves.len() {
            return None;
        }

        let mut siblings = Vec::new();
        let mut level: Vec<String> = leaves.to_vec();
        let mut position = leaf_index;

        while level.len() > 1 {
            if level.len() % 2 == 1 {
                if let Some(last) = level.last().cloned() {
                    level.push(last);
                }
            }

            let sibling_is_left = position % 2 == 1;
            let sibling = if sibling_is_left {
                level[position - 1].clone()
            } else {
                level[position + 1].clone()
            };
            siblings.push((sibling, sibling_is_left));

            level = level
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            position /= 2;
        }

        Some(Self {
            leaf_index,
            siblings,
        })
    }

    /// Verify the proof against a root digest
    pub fn verify(&self, leaf: &str, root: &str) -> bool {
        let mut current = leaf.to_string();

        for (sibling, is_left) in &self.siblings {
            current = if *is_left {
                hash_pair(sibling, &current)
            } else {
                hash_pair(&current, sibling)
            };
        }

        current == root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_matches_reference_encoding() {
        use crate::core::{OwnerDirectory, Transaction};

        let txs = vec![
            Transaction::new("zia", "uk", "gia"),
            Transaction::new("gia", "hyd", "tia"),
        ];
        let mut directory = OwnerDirectory::new();
        directory.install("zia", vec!["usa".to_string(), "uae".to_string()]);
        directory.install(
            "gia",
            vec!["delhi".to_string(), "bombay".to_string(), "uk".to_string()],
        );
        directory.install(
            "tia",
            ["dc", "ny", "la", "hyd"].iter().map(|p| p.to_string()).collect(),
        );

        let leaves = leaves_for(&txs, &directory);
        assert_eq!(
            leaves,
            [
                "273779b26dd512cd54956c015af41c53926255fdef82b6c66c695d72952468f4",
                "ef20c50ddb1640ed07c5fc730320a119d302964b604552b16b6336fa0f1bc2ac",
                "07248fad58261f6af09a7a16109f6e1c126afe311426ce05776c67f9efad491d",
            ]
        );
        assert_eq!(
            compute_root(&txs, &directory),
            "e466ef406bcb3f95c0e30faa3d720bfa82f55f54bc66065dece4e029460bc62d"
        );
    }

    fn leaf(data: &str) -> String {
        sha256_hex(data.as_bytes())
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaves = vec![leaf("tx1")];
        assert_eq!(merkle_root_from_leaves(&leaves), leaves[0]);
    }

    #[test]
    fn test_pair_hashes_hex_text() {
        let (a, b) = (leaf("tx1"), leaf("tx2"));
        let expected = sha256_hex(format!("{}{}", a, b).as_bytes());
        assert_eq!(merkle_root_from_leaves(&[a, b]), expected);
    }

    #[test]
    fn test_odd_level_duplicates_last_leaf() {
        let (a, b, c) = (leaf("a"), leaf("b"), leaf("c"));
        let expected = hash_pair(&hash_pair(&a, &b), &hash_pair(&c, &c));
        assert_eq!(merkle_root_from_leaves(&[a, b, c]), expected);
    }

    #[test]
    fn test_five_leaves_duplicate_on_every_odd_level() {
        let leaves: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| leaf(s)).collect();
        let ab = hash_pair(&leaves[0], &leaves[1]);
        let cd = hash_pair(&leaves[2], &leaves[3]);
        let ee = hash_pair(&leaves[4], &leaves[4]);
        let abcd = hash_pair(&ab, &cd);
        let eeee = hash_pair(&ee, &ee);
        assert_eq!(merkle_root_from_leaves(&leaves), hash_pair(&abcd, &eeee));
    }

    #[test]
    fn test_empty_leaves() {
        assert_eq!(merkle_root_from_leaves(&[]), sha256_hex(b""));
    }

    #[test]
    fn test_directory_is_last_leaf() {
        let txs = vec![
            json!({"Seller": "zia", "Property": "uk", "Buyer": "gia"}),
            json!({"Seller": "gia", "Property": "hyd", "Buyer": "tia"}),
        ];
        let directory = json!({"gia": ["delhi"], "tia": ["dc"]});

        let expected = hash_pair(
            &hash_pair(&hash_record(&txs[0]), &hash_record(&txs[1])),
            &hash_pair(&hash_record(&directory), &hash_record(&directory)),
        );
        assert_eq!(compute_root(&txs, &directory), expected);
    }

    #[test]
    fn test_root_changes_with_directory() {
        let txs = vec![json!({"Seller": "zia", "Property": "uk", "Buyer": "gia"})];
        let before = compute_root(&txs, &json!({"gia": ["uk"]}));
        let after = compute_root(&txs, &json!({"gia": ["uae"]}));
        assert_ne!(before, after);
    }

    #[test]
    fn test_proof_roundtrip_for_every_leaf() {
        let leaves: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| leaf(s)).collect();
        let root = merkle_root_from_leaves(&leaves);

        for (index, leaf) in leaves.iter().enumerate() {
            let proof = MerkleProof::build(&leaves, index).unwrap();
            assert!(proof.verify(leaf, &root));
        }

        let proof = MerkleProof::build(&leaves, 0).unwrap();
        assert!(!proof.verify(&leaves[1], &root));
        assert!(MerkleProof::build(&leaves, 5).is_none());
    }
}
