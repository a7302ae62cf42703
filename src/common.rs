use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha3::{Digest as _, Keccak256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// A Keccak-256 output.
pub type Digest = [u8; 32];

/// Errors from tree construction and proof derivation.
#[derive(Debug, Error)]
pub enum MerkleError {
    /// The whitelist contained no addresses.
    #[error("Cannot build a Merkle tree from an empty address list")]
    EmptyInput,

    /// A proof was requested for a leaf that is not in the tree.
    #[error("Leaf {0} is not present in the tree")]
    LeafNotFound(String),

    /// A proof was requested by position past the leaf count.
    #[error("Leaf index {index} is out of bounds for tree with {total} leaves")]
    IndexOutOfBounds { index: usize, total: usize },

    /// A digest field in a stored record failed to parse.
    #[error("Invalid digest encoding: {0}")]
    InvalidDigest(String),
}

/// Hashes one whitelist address into a tree leaf.
///
/// The string bytes are hashed exactly as given, with no normalization of
/// checksum casing or whitespace. Two differently-cased renderings of the
/// same address produce different leaves; normalizing is the caller's
/// responsibility.
///
/// # Arguments
/// * `address` - The address string as it appears in the whitelist
///
/// # Returns
/// 32-byte Keccak-256 leaf digest
pub fn hash_leaf(address: &str) -> Digest {
    let hash = Keccak256::new().chain_update(address.as_bytes()).finalize();
    hash.into()
}

/// Hashes two sibling digests into their parent node.
///
/// The pair is concatenated in ascending byte order before hashing, so
/// verification never needs to know which side a sibling was on.
///
/// # Arguments
/// * `a` - First child digest
/// * `b` - Second child digest
///
/// # Returns
/// 32-byte parent digest
pub fn hash_pair(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let hash = Keccak256::new().chain_update(lo).chain_update(hi).finalize();
    hash.into()
}

/// A binary hash tree over whitelist leaves.
///
/// Every level is retained from leaves to root so inclusion proofs can be
/// derived after construction. The tree is built once and never mutated.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// levels[0] is the leaf level, levels[n-1] holds the root.
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up from leaf digests.
    ///
    /// Adjacent nodes are paired and hashed in sorted byte order; an
    /// unpaired trailing node is carried up to the next level unchanged.
    /// Leaves keep their input order.
    ///
    /// # Errors
    /// Returns `MerkleError::EmptyInput` when `leaves` is empty.
    pub fn from_leaves(leaves: Vec<Digest>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let mut levels = vec![leaves];
        let mut level = levels[0].clone();

        while level.len() > 1 {
            let mut next_level = Vec::new();

            for chunk in level.chunks(2) {
                if chunk.len() == 2 {
                    next_level.push(hash_pair(&chunk[0], &chunk[1]));
                } else {
                    // Odd node: carried up unchanged.
                    next_level.push(chunk[0]);
                }
            }

            levels.push(next_level.clone());
            level = next_level;
        }

        Ok(MerkleTree { levels })
    }

    /// Returns the root digest.
    pub fn root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0]
    }

    /// Returns the leaf level in input order.
    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    /// Returns the number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Returns the number of levels from leaves to root.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Derives the inclusion proof for the leaf at `leaf_index`.
    ///
    /// The proof is the sequence of same-level sibling digests from the
    /// leaf level upward. A level where the node was carried up contributes
    /// no entry.
    ///
    /// # Errors
    /// Returns `MerkleError::IndexOutOfBounds` when the index is past the
    /// leaf count.
    pub fn proof_for_index(&self, leaf_index: usize) -> Result<Vec<Digest>, MerkleError> {
        let total = self.leaf_count();
        if leaf_index >= total {
            return Err(MerkleError::IndexOutOfBounds {
                index: leaf_index,
                total,
            });
        }

        let mut proof = Vec::new();
        let mut current_index = leaf_index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = if current_index % 2 == 0 {
                current_index + 1
            } else {
                current_index - 1
            };

            // A carried-up node has no sibling at this level.
            if sibling_index < level.len() {
                proof.push(level[sibling_index]);
            }

            current_index /= 2;
        }

        Ok(proof)
    }

    /// Derives the inclusion proof for a leaf digest.
    ///
    /// Duplicate leaves resolve to the first occurrence; its proof verifies
    /// for every occurrence of the digest.
    ///
    /// # Errors
    /// Returns `MerkleError::LeafNotFound` when the digest is not in the
    /// leaf level.
    pub fn proof_for_leaf(&self, leaf: &Digest) -> Result<Vec<Digest>, MerkleError> {
        let index = self.levels[0]
            .iter()
            .position(|candidate| candidate == leaf)
            .ok_or_else(|| MerkleError::LeafNotFound(hex_encode(*leaf)))?;
        self.proof_for_index(index)
    }
}

/// Recomputes the root from a leaf and its inclusion proof.
///
/// Folds the sorted-pair hash over the sibling sequence starting at the
/// leaf. The proof is valid iff the result equals the claimed root.
pub fn verify_proof(leaf: &Digest, proof: &[Digest], root: &Digest) -> bool {
    let mut current = *leaf;
    for sibling in proof {
        current = hash_pair(&current, sibling);
    }
    &current == root
}

/// The persisted whitelist record: the root plus one proof per address.
///
/// Addresses are stored exactly as they appeared in the input. The proofs
/// map is keyed in sorted order so repeated runs over the same whitelist
/// serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistData {
    pub root: String,
    pub proofs: BTreeMap<String, Vec<String>>,
}

/// Builds the tree over an address list and derives every inclusion proof.
///
/// # Arguments
/// * `addresses` - Whitelist addresses, hashed as given
///
/// # Errors
/// Returns `MerkleError::EmptyInput` when the list is empty.
pub fn build_whitelist_data(addresses: &[String]) -> Result<WhitelistData, MerkleError> {
    let leaves: Vec<Digest> = addresses.iter().map(|addr| hash_leaf(addr)).collect();
    let tree = MerkleTree::from_leaves(leaves)?;

    let mut proofs = BTreeMap::new();
    for address in addresses {
        let proof = tree.proof_for_leaf(&hash_leaf(address))?;
        proofs.insert(
            address.clone(),
            proof.iter().copied().map(hex_encode).collect(),
        );
    }

    Ok(WhitelistData {
        root: hex_encode(tree.root()),
        proofs,
    })
}

/// Encodes bytes as a lowercase hex string with a `0x` prefix.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte digest from a hex string, with or without `0x` prefix.
///
/// # Errors
/// Returns `MerkleError::InvalidDigest` for a wrong length or invalid hex.
pub fn parse_digest(s: &str) -> Result<Digest, MerkleError> {
    let cleaned = s.trim().strip_prefix("0x").unwrap_or(s.trim());
    if cleaned.len() != 64 {
        return Err(MerkleError::InvalidDigest(format!(
            "expected 64 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut digest = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut digest)
        .map_err(|e| MerkleError::InvalidDigest(e.to_string()))?;
    Ok(digest)
}

/// Reads a whitelist file with one address per line.
///
/// Lines are trimmed and blank lines skipped; everything else is kept
/// verbatim, including casing.
pub fn read_address_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).context("Failed to open input file")?;
    let reader = BufReader::new(file);

    let mut addresses = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        addresses.push(trimmed.to_string());
    }

    Ok(addresses)
}

/// Writes `contents` to `path` through a temporary file and rename, so a
/// failed run never leaves a truncated record behind.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    std::fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}
