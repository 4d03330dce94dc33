//! Inclusion proofs for the tagged Merkle tree.
//!
//! A `MerkleProof` is the ordered list of steps from a leaf up to (but not
//! including) the root. Each step says where the sibling at that level sits,
//! so the verifier knows which side of the combine the running hash goes on.

use std::{collections::BTreeMap, slice};

use bincode::{Decode, Encode};

use crate::{Hash, TaggedMerkleError, error::Result};

/// Upper bound on proof length. A tree over at most `usize::MAX` leaves is
/// never deeper than this.
pub const MAX_PROOF_STEPS: usize = 64;

/// One level of an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProofStep {
    /// The sibling is the left child; the running hash is the right child.
    Left(Hash),
    /// The sibling is the right child; the running hash is the left child.
    Right(Hash),
    /// The node was the unpaired last node of an odd-length level and was
    /// combined with itself.
    Duplicate,
}

impl ProofStep {
    /// Whether the sibling sits to the right of the running hash.
    ///
    /// A `Duplicate` step counts as right: the node occupies the left slot
    /// and its copy the right one.
    pub fn sibling_is_right(&self) -> bool {
        !matches!(self, ProofStep::Left(_))
    }

    /// The sibling hash at this level, given the running hash `current`.
    pub fn sibling(&self, current: &Hash) -> Hash {
        match self {
            ProofStep::Left(hash) | ProofStep::Right(hash) => *hash,
            ProofStep::Duplicate => *current,
        }
    }

    /// Whether this step comes from self-pairing an odd node.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ProofStep::Duplicate)
    }
}

/// An inclusion proof for a single leaf, leaf level first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MerkleProof {
    steps: Vec<ProofStep>,
}

/// Proofs for every leaf, keyed by 0-based leaf index in input order.
pub type ProofMap = BTreeMap<usize, MerkleProof>;

impl MerkleProof {
    /// Construct a proof from steps ordered leaf level first.
    pub fn new(steps: Vec<ProofStep>) -> Self {
        MerkleProof { steps }
    }

    /// The steps, leaf level first.
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Iterate over the steps, leaf level first.
    pub fn iter(&self) -> slice::Iter<'_, ProofStep> {
        self.steps.iter()
    }

    /// Number of levels between the leaf and the root.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for the proof of a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of self-paired steps in this proof.
    pub fn duplicate_count(&self) -> usize {
        self.steps.iter().filter(|step| step.is_duplicate()).count()
    }

    /// Consume the proof and return its steps.
    pub fn into_steps(self) -> Vec<ProofStep> {
        self.steps
    }

    pub(crate) fn push(&mut self, step: ProofStep) {
        self.steps.push(step);
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| TaggedMerkleError::InvalidProof(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects trailing bytes and proofs longer than [`MAX_PROOF_STEPS`].
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 64 * 1024 }>();
        let (proof, consumed): (Self, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| TaggedMerkleError::InvalidProof(format!("decode error: {}", e)))?;
        if consumed != bytes.len() {
            return Err(TaggedMerkleError::InvalidProof(format!(
                "{} trailing bytes after proof",
                bytes.len() - consumed
            )));
        }
        if proof.len() > MAX_PROOF_STEPS {
            return Err(TaggedMerkleError::InvalidProof(format!(
                "proof has {} steps (max {})",
                proof.len(),
                MAX_PROOF_STEPS
            )));
        }
        Ok(proof)
    }
}

impl From<Vec<ProofStep>> for MerkleProof {
    fn from(steps: Vec<ProofStep>) -> Self {
        MerkleProof::new(steps)
    }
}

impl<'a> IntoIterator for &'a MerkleProof {
    type Item = &'a ProofStep;
    type IntoIter = slice::Iter<'a, ProofStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
