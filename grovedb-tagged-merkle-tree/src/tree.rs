//! Tree construction: roots and per-leaf inclusion proofs.

use std::ops::Range;

use tracing::{debug, trace};

use crate::{
    Hash, MerkleProof, ProofMap, ProofStep, TaggedHasher, TaggedMerkleError, error::Result,
};

/// Builds binary Merkle trees over tagged hashes.
///
/// Leaves are `leaf_tag`-hashed items in input order. Each level pairs
/// adjacent nodes `(2k, 2k + 1)` and combines them under `branch_tag`; an
/// unpaired last node is combined with itself. A level of `n` nodes yields
/// `ceil(n / 2)` parents, until one node, the root, remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleTreeBuilder {
    leaf: TaggedHasher,
    branch: TaggedHasher,
}

/// A node at some level together with the leaves it covers.
///
/// Subtrees always cover a contiguous run of input positions, so a range
/// stands in for the full leaf index set.
#[derive(Debug, Clone)]
struct Subtree {
    hash: Hash,
    leaves: Range<usize>,
}

impl MerkleTreeBuilder {
    /// Create a builder. Both tags must be non-empty.
    pub fn new(leaf_tag: &str, branch_tag: &str) -> Result<Self> {
        Ok(MerkleTreeBuilder {
            leaf: TaggedHasher::for_field(leaf_tag, "leaf tag")?,
            branch: TaggedHasher::for_field(branch_tag, "branch tag")?,
        })
    }

    /// Hasher applied to raw items.
    pub fn leaf_hasher(&self) -> &TaggedHasher {
        &self.leaf
    }

    /// Hasher applied when combining two children.
    pub fn branch_hasher(&self) -> &TaggedHasher {
        &self.branch
    }

    /// Compute the Merkle root of `items`.
    pub fn root<I: AsRef<[u8]>>(&self, items: &[I]) -> Result<Hash> {
        let mut level = self.leaf_hashes(items)?;
        let mut depth = 0usize;
        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    self.branch.combine(left, right)
                })
                .collect();
            depth += 1;
            trace!(depth, width = level.len(), "combined tree level");
        }
        debug!(leaves = items.len(), depth, "computed merkle root");
        level.pop().ok_or(TaggedMerkleError::EmptyInput)
    }

    /// Compute the inclusion proof of every item, keyed by item index.
    pub fn proofs<I: AsRef<[u8]>>(&self, items: &[I]) -> Result<ProofMap> {
        self.root_and_proofs(items).map(|(_, proofs)| proofs)
    }

    /// Compute the Merkle root and the inclusion proof of every item in a
    /// single upward pass.
    pub fn root_and_proofs<I: AsRef<[u8]>>(&self, items: &[I]) -> Result<(Hash, ProofMap)> {
        let mut level: Vec<Subtree> = self
            .leaf_hashes(items)?
            .into_iter()
            .enumerate()
            .map(|(index, hash)| Subtree {
                hash,
                leaves: index..index + 1,
            })
            .collect();
        let mut proofs: Vec<MerkleProof> = vec![MerkleProof::default(); level.len()];

        let mut depth = 0usize;
        while level.len() > 1 {
            let (next, steps) = self.combine_level(&level);
            for (leaves, step) in steps {
                for proof in &mut proofs[leaves] {
                    proof.push(step);
                }
            }
            level = next;
            depth += 1;
            trace!(depth, width = level.len(), "combined tree level");
        }
        debug!(leaves = items.len(), depth, "computed merkle root with proofs");

        let root = level
            .pop()
            .map(|subtree| subtree.hash)
            .ok_or(TaggedMerkleError::EmptyInput)?;
        Ok((root, proofs.into_iter().enumerate().collect()))
    }

    /// Hash every item under the leaf tag.
    fn leaf_hashes<I: AsRef<[u8]>>(&self, items: &[I]) -> Result<Vec<Hash>> {
        if items.is_empty() {
            return Err(TaggedMerkleError::EmptyInput);
        }
        items.iter().map(|item| self.leaf.hash(item)).collect()
    }

    /// Produce the next level up, along with the proof step each covered
    /// leaf range gains at this level.
    fn combine_level(
        &self,
        level: &[Subtree],
    ) -> (Vec<Subtree>, Vec<(Range<usize>, ProofStep)>) {
        let mut steps = Vec::with_capacity(level.len());
        let next = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => {
                    steps.push((left.leaves.clone(), ProofStep::Right(right.hash)));
                    steps.push((right.leaves.clone(), ProofStep::Left(left.hash)));
                    Subtree {
                        hash: self.branch.combine(&left.hash, &right.hash),
                        leaves: left.leaves.start..right.leaves.end,
                    }
                }
                _ => {
                    let only = &pair[0];
                    steps.push((only.leaves.clone(), ProofStep::Duplicate));
                    Subtree {
                        hash: self.branch.combine(&only.hash, &only.hash),
                        leaves: only.leaves.clone(),
                    }
                }
            })
            .collect();
        (next, steps)
    }
}

/// Compute the Merkle root of `items`.
///
/// Fails with `EmptyInput` if `items` is empty, checked before the tags,
/// and with `InvalidArgument` if either tag (or any item) is empty.
pub fn calculate_merkle_root<I: AsRef<[u8]>>(
    items: &[I],
    leaf_tag: &str,
    branch_tag: &str,
) -> Result<Hash> {
    if items.is_empty() {
        return Err(TaggedMerkleError::EmptyInput);
    }
    MerkleTreeBuilder::new(leaf_tag, branch_tag)?.root(items)
}

/// Compute the inclusion proof of every item in `items`.
///
/// Same failure conditions as [`calculate_merkle_root`].
pub fn calculate_merkle_proofs<I: AsRef<[u8]>>(
    items: &[I],
    leaf_tag: &str,
    branch_tag: &str,
) -> Result<ProofMap> {
    if items.is_empty() {
        return Err(TaggedMerkleError::EmptyInput);
    }
    MerkleTreeBuilder::new(leaf_tag, branch_tag)?.proofs(items)
}
