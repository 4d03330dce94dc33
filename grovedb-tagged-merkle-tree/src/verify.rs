//! Proof verification.
//!
//! Pure functions: the verifier replays a proof from the leaf upward and
//! compares the result with the claimed root. A proof that does not
//! reproduce the root is reported as `false`; only empty tags are errors.

use tracing::debug;

use crate::{Hash, MAX_PROOF_STEPS, MerkleProof, ProofStep, TaggedHasher, error::Result};

/// How a verifier treats [`ProofStep::Duplicate`] steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelfPairPolicy {
    /// Accept self-paired steps at any level.
    #[default]
    Allow,
    /// Reject any proof containing a self-paired step.
    Reject,
    /// Accept self-paired steps only at proof positions below the given
    /// level (level 0 is the leaf level).
    BelowLevel(usize),
}

impl SelfPairPolicy {
    fn permits(&self, level: usize) -> bool {
        match self {
            SelfPairPolicy::Allow => true,
            SelfPairPolicy::Reject => false,
            SelfPairPolicy::BelowLevel(max) => level < *max,
        }
    }
}

/// Verifier configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerifyOptions {
    /// Treatment of self-paired steps.
    pub self_pair_policy: SelfPairPolicy,
}

impl VerifyOptions {
    /// Replace the self-pair policy.
    pub fn with_self_pair_policy(mut self, policy: SelfPairPolicy) -> Self {
        self.self_pair_policy = policy;
        self
    }
}

/// Recomputes Merkle roots from inclusion proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleProofVerifier {
    leaf: TaggedHasher,
    branch: TaggedHasher,
    options: VerifyOptions,
}

impl MerkleProofVerifier {
    /// Create a verifier with default options. Both tags must be non-empty.
    pub fn new(leaf_tag: &str, branch_tag: &str) -> Result<Self> {
        Ok(MerkleProofVerifier {
            leaf: TaggedHasher::for_field(leaf_tag, "leaf tag")?,
            branch: TaggedHasher::for_field(branch_tag, "branch tag")?,
            options: VerifyOptions::default(),
        })
    }

    /// Replace the verifier options.
    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    /// The active options.
    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Replay `proof` from `item` and return the root it leads to.
    ///
    /// Returns `None` when the proof cannot be replayed: the item is empty,
    /// the proof is too long, or a self-paired step is not permitted by the
    /// configured policy.
    pub fn compute_root(&self, item: impl AsRef<[u8]>, proof: &MerkleProof) -> Option<Hash> {
        if proof.len() > MAX_PROOF_STEPS {
            debug!(steps = proof.len(), "proof exceeds maximum length");
            return None;
        }
        let mut current = self.leaf.hash(item).ok()?;
        for (level, step) in proof.iter().enumerate() {
            current = match step {
                ProofStep::Right(sibling) => self.branch.combine(&current, sibling),
                ProofStep::Left(sibling) => self.branch.combine(sibling, &current),
                ProofStep::Duplicate => {
                    if !self.options.self_pair_policy.permits(level) {
                        debug!(
                            level,
                            policy = ?self.options.self_pair_policy,
                            "self-paired proof step rejected"
                        );
                        return None;
                    }
                    self.branch.combine(&current, &current)
                }
            };
        }
        Some(current)
    }

    /// Whether `proof` leads from `item` to `root`.
    pub fn verify(&self, item: impl AsRef<[u8]>, proof: &MerkleProof, root: &Hash) -> bool {
        self.compute_root(item, proof)
            .is_some_and(|computed| &computed == root)
    }
}

impl MerkleProof {
    /// Whether this proof leads from `item` to `root` under `verifier`.
    pub fn verify(
        &self,
        item: impl AsRef<[u8]>,
        root: &Hash,
        verifier: &MerkleProofVerifier,
    ) -> bool {
        verifier.verify(item, self, root)
    }
}

/// Whether `proof` leads from `item` to `root`.
///
/// Fails only if `leaf_tag` or `branch_tag` is empty; every other mismatch
/// yields `Ok(false)`.
pub fn verify_merkle_proof(
    item: impl AsRef<[u8]>,
    proof: &MerkleProof,
    root: &Hash,
    leaf_tag: &str,
    branch_tag: &str,
) -> Result<bool> {
    Ok(MerkleProofVerifier::new(leaf_tag, branch_tag)?.verify(item, proof, root))
}
