//! Binary Merkle tree over BIP-340 style tagged SHA-256 hashes.
//!
//! Items are hashed under a leaf tag, then adjacent pairs are combined level
//! by level under a branch tag until a single root remains:
//!
//! - leaf:   `sha256(sha256(leaf_tag) || sha256(leaf_tag) || item)`
//! - branch: `sha256(sha256(branch_tag) || sha256(branch_tag) || hex(left) ||
//!   hex(right))`
//!
//! An unpaired last node at an odd-length level is combined with itself.
//! Proofs record, per leaf, the sibling at every level and which side it
//! sits on, so a verifier holding only the root can replay the path.
//!
//! # Core types
//!
//! - [`TaggedHasher`] — SHA-256 bound to one domain tag.
//! - [`MerkleTreeBuilder`] — computes roots and per-leaf proofs.
//! - [`MerkleProofVerifier`] — replays proofs against a claimed root.
//! - [`MerkleProof`] / [`ProofStep`] — the inclusion proof.

#![warn(missing_docs)]

mod error;
mod hash;
mod proof;
mod tree;
mod verify;

#[cfg(test)]
mod tests;

pub use error::{Result, TaggedMerkleError};
pub use hash::{HASH_HEX_LENGTH, HASH_LENGTH, Hash, TaggedHasher, combine_hashes, tagged_hash};
pub use proof::{MAX_PROOF_STEPS, MerkleProof, ProofMap, ProofStep};
pub use tree::{MerkleTreeBuilder, calculate_merkle_proofs, calculate_merkle_root};
pub use verify::{MerkleProofVerifier, SelfPairPolicy, VerifyOptions, verify_merkle_proof};
