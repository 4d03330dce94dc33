use proptest::{prelude::*, sample::Index};

use crate::{
    HASH_LENGTH, Hash, MerkleProof, MerkleProofVerifier, MerkleTreeBuilder, ProofStep,
    calculate_merkle_proofs, calculate_merkle_root, tagged_hash, verify_merkle_proof,
};

const BITCOIN_TAG: &str = "Bitcoin_Transaction";

fn items_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9]{1,12}", 1..48)
}

/// Flip one bit of the sibling hash carried by `step`, if it carries one.
fn corrupt(step: &ProofStep, byte: usize) -> Option<ProofStep> {
    let flip = |hash: &Hash| {
        let mut bytes = *hash.as_bytes();
        bytes[byte % HASH_LENGTH] ^= 0x01;
        Hash::from_bytes(bytes)
    };
    match step {
        ProofStep::Left(hash) => Some(ProofStep::Left(flip(hash))),
        ProofStep::Right(hash) => Some(ProofStep::Right(flip(hash))),
        ProofStep::Duplicate => None,
    }
}

// ── Pinned vectors ───────────────────────────────────────────────────

#[test]
fn test_pinned_vectors() {
    let hello = tagged_hash("hello", BITCOIN_TAG).expect("tagged hash");
    assert_eq!(
        hex::encode(hello.as_bytes()),
        "58c1fbfa2abe50bae8636f578a8ce2cf8c217da8ddaae6ce025a1ddf62efeab2"
    );

    let root = calculate_merkle_root(
        &["aaa", "bbb", "ccc", "ddd", "eee"],
        BITCOIN_TAG,
        BITCOIN_TAG,
    )
    .expect("root");
    assert_eq!(
        root.to_string(),
        "33ce01bab47b07c208ccc2e2adfa62949b0209c547fd01087e52c12c259ec30c"
    );
}

#[test]
fn test_single_item_tree() {
    let root = calculate_merkle_root(&["solo"], "leaf", "branch").expect("root");
    assert_eq!(root, tagged_hash("solo", "leaf").expect("leaf"));

    let proofs = calculate_merkle_proofs(&["solo"], "leaf", "branch").expect("proofs");
    assert!(proofs[&0].is_empty());
    assert!(verify_merkle_proof("solo", &proofs[&0], &root, "leaf", "branch").expect("verify"));
}

#[test]
fn test_bytes_and_strings_build_same_tree() {
    let strings = ["grove", "merk", "tree"];
    let bytes: Vec<Vec<u8>> = strings.iter().map(|s| s.as_bytes().to_vec()).collect();
    assert_eq!(
        calculate_merkle_root(&strings, "leaf", "branch").expect("strings"),
        calculate_merkle_root(&bytes, "leaf", "branch").expect("bytes")
    );
}

#[test]
fn test_proof_survives_encoding() {
    let items: Vec<String> = (0..11).map(|i| format!("entry {}", i)).collect();
    let builder = MerkleTreeBuilder::new("leaf", "branch").expect("tags");
    let (root, proofs) = builder.root_and_proofs(&items).expect("build");
    let verifier = MerkleProofVerifier::new("leaf", "branch").expect("tags");

    for (index, proof) in &proofs {
        let bytes = proof.encode_to_vec().expect("encode");
        let decoded = MerkleProof::decode_from_slice(&bytes).expect("decode");
        assert!(decoded.verify(&items[*index], &root, &verifier));
    }
}

#[test]
fn test_proof_for_one_leaf_rejects_another() {
    let items = ["a", "b", "c", "d"];
    let (root, proofs) = MerkleTreeBuilder::new("leaf", "branch")
        .expect("tags")
        .root_and_proofs(&items)
        .expect("build");
    let verifier = MerkleProofVerifier::new("leaf", "branch").expect("tags");
    for (index, proof) in &proofs {
        for (other, item) in items.iter().enumerate() {
            assert_eq!(verifier.verify(item, proof, &root), other == *index);
        }
    }
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_tagged_hash_deterministic(data in "\\PC{1,64}", tag in "\\PC{1,16}") {
        prop_assert_eq!(
            tagged_hash(&data, &tag).expect("first"),
            tagged_hash(&data, &tag).expect("second")
        );
    }

    #[test]
    fn prop_every_proof_verifies(items in items_strategy()) {
        let builder = MerkleTreeBuilder::new("leaf", "branch").expect("tags");
        let (root, proofs) = builder.root_and_proofs(&items).expect("build");
        prop_assert_eq!(builder.root(&items).expect("root"), root);
        prop_assert_eq!(proofs.len(), items.len());

        let depth = proofs[&0].len();
        for (index, proof) in &proofs {
            prop_assert_eq!(proof.len(), depth);
            prop_assert!(
                verify_merkle_proof(&items[*index], proof, &root, "leaf", "branch")
                    .expect("verify")
            );
        }
    }

    #[test]
    fn prop_corrupted_sibling_fails(
        items in items_strategy(),
        leaf in any::<Index>(),
        step in any::<Index>(),
        byte in 0usize..HASH_LENGTH,
    ) {
        let (root, proofs) = MerkleTreeBuilder::new("leaf", "branch")
            .expect("tags")
            .root_and_proofs(&items)
            .expect("build");
        let index = leaf.index(items.len());
        let proof = &proofs[&index];
        prop_assume!(!proof.is_empty());

        let position = step.index(proof.len());
        let corrupted = corrupt(&proof.steps()[position], byte);
        prop_assume!(corrupted.is_some());

        let mut steps = proof.steps().to_vec();
        if let Some(corrupted) = corrupted {
            steps[position] = corrupted;
        }
        let verifier = MerkleProofVerifier::new("leaf", "branch").expect("tags");
        prop_assert!(!verifier.verify(&items[index], &MerkleProof::new(steps), &root));
    }

    #[test]
    fn prop_reordered_steps_fail(
        items in prop::collection::vec("[a-z]{1,8}", 4..48),
        leaf in any::<Index>(),
    ) {
        let (root, proofs) = MerkleTreeBuilder::new("leaf", "branch")
            .expect("tags")
            .root_and_proofs(&items)
            .expect("build");
        let index = leaf.index(items.len());
        let mut steps = proofs[&index].steps().to_vec();
        prop_assume!(steps.len() >= 2 && steps[0] != steps[steps.len() - 1]);

        steps.reverse();
        let verifier = MerkleProofVerifier::new("leaf", "branch").expect("tags");
        prop_assert!(!verifier.verify(&items[index], &MerkleProof::new(steps), &root));
    }

    #[test]
    fn prop_swapped_adjacent_steps_fail(
        items in prop::collection::vec("[a-z]{1,8}", 4..48),
        leaf in any::<Index>(),
        at in any::<Index>(),
    ) {
        let (root, proofs) = MerkleTreeBuilder::new("leaf", "branch")
            .expect("tags")
            .root_and_proofs(&items)
            .expect("build");
        let index = leaf.index(items.len());
        let mut steps = proofs[&index].steps().to_vec();
        prop_assume!(steps.len() >= 2);

        let position = at.index(steps.len() - 1);
        let (first, second) = (steps[position], steps[position + 1]);
        prop_assume!(!first.is_duplicate() && !second.is_duplicate() && first != second);

        steps.swap(position, position + 1);
        let verifier = MerkleProofVerifier::new("leaf", "branch").expect("tags");
        prop_assert!(!verifier.verify(&items[index], &MerkleProof::new(steps), &root));
    }

    #[test]
    fn prop_wrong_root_fails(items in items_strategy(), bytes in any::<[u8; 32]>()) {
        let (root, proofs) = MerkleTreeBuilder::new("leaf", "branch")
            .expect("tags")
            .root_and_proofs(&items)
            .expect("build");
        let other = Hash::from_bytes(bytes);
        prop_assume!(other != root);
        prop_assert!(
            !verify_merkle_proof(&items[0], &proofs[&0], &other, "leaf", "branch")
                .expect("verify")
        );
    }
}
