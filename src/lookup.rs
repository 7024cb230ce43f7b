//! Membership arguments (component C5): proving that a single witness
//! value appears in a fixed, committed table.
//!
//! Deliberately restricted to pure membership (output = input) — range
//! checks and bit checks are expressed as pre-baked tables (e.g. every
//! value in `[0, 256)` for a byte range check) rather than as a more
//! general Plookup-style permutation argument over an entire witness
//! column. A `LookupTable` commits its values into a [`MerkleTree`]; a
//! `LookupProof` carries that commitment, the authentication path for the
//! queried value, and three channel-drawn challenges binding the proof to
//! its transcript position so one lookup instance can't be replayed in
//! place of another sharing the same channel.

use crate::channel::Channel;
use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};
use crate::hash::{Digest, DynSpongeHash};
use crate::merkle::{AuthPath, MerkleTree};

#[derive(Clone)]
pub struct LookupTable<F: PrimeField> {
    values: Vec<FieldElement<F>>,
    tree: MerkleTree,
}

impl<F: PrimeField> LookupTable<F> {
    /// Commits `values` into a Merkle tree over their big-endian byte
    /// encodings. Rejects an empty table: there is nothing a membership
    /// proof could ever demonstrate against it.
    pub fn new(values: Vec<FieldElement<F>>, hasher: &dyn DynSpongeHash) -> StarkResult<Self> {
        if values.is_empty() {
            return Err(StarkError::InvalidParameters(
                "LookupTable::new called with an empty table".to_string(),
            ));
        }
        let leaf_data: Vec<Vec<u8>> = values.iter().map(|v| v.to_bytes_be().to_vec()).collect();
        let tree = MerkleTree::build(&leaf_data, hasher)?;
        Ok(Self { values, tree })
    }

    /// The index of `value` in the table, if present.
    pub fn lookup(&self, value: &FieldElement<F>) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    pub fn merkle_root(&self) -> Digest {
        self.tree.root()
    }

    pub fn values(&self) -> &[FieldElement<F>] {
        &self.values
    }

    fn authentication_path(&self, index: usize) -> StarkResult<AuthPath> {
        self.tree.authentication_path(index)
    }
}

/// Asserts that a witness value belongs to `table` — the type tying a
/// single membership check to its table, composed by reference rather
/// than embedding the table by value.
#[derive(Clone, Copy, Debug)]
pub struct LookupConstraint<'a, F: PrimeField> {
    pub table: &'a LookupTable<F>,
}

impl<'a, F: PrimeField> LookupConstraint<'a, F> {
    pub fn new(table: &'a LookupTable<F>) -> Self {
        Self { table }
    }

    pub fn is_satisfied(&self, value: &FieldElement<F>) -> bool {
        self.table.lookup(value).is_some()
    }
}

#[derive(Clone, Debug)]
pub struct LookupProof<F: PrimeField> {
    pub table_commitment: Digest,
    pub index: usize,
    pub leaf_value: FieldElement<F>,
    pub path: AuthPath,
    pub challenges: [FieldElement<F>; 3],
}

/// Proves that `value` is a member of `table`. Fails immediately (no
/// proof produced) if `value` is absent — a dishonest prover has nothing
/// valid to submit.
pub fn prove<F: PrimeField>(
    value: FieldElement<F>,
    table: &LookupTable<F>,
    channel: &mut Channel,
) -> StarkResult<LookupProof<F>> {
    let index = table.lookup(&value).ok_or_else(|| {
        StarkError::LookupReject("witness value is absent from the table".to_string())
    })?;

    channel.send_digest(&table.merkle_root());
    channel.send_field_element(value);
    let challenges = [
        channel.receive_random_field_element::<F>(),
        channel.receive_random_field_element::<F>(),
        channel.receive_random_field_element::<F>(),
    ];

    Ok(LookupProof {
        table_commitment: table.merkle_root(),
        index,
        leaf_value: value,
        path: table.authentication_path(index)?,
        challenges,
    })
}

/// Recomputes the three challenges from the same transcript position the
/// proof claims to have drawn them from, then re-hashes the claimed leaf
/// and checks its authentication path against `expected_commitment`.
/// Mismatch at any step is `LookupReject`.
pub fn verify_proof<F: PrimeField>(
    proof: &LookupProof<F>,
    expected_commitment: Digest,
    hasher: &dyn DynSpongeHash,
    channel: &mut Channel,
) -> StarkResult<()> {
    if proof.table_commitment != expected_commitment {
        return Err(StarkError::LookupReject(
            "proof's table commitment does not match the expected root".to_string(),
        ));
    }

    channel.send_digest(&proof.table_commitment);
    channel.send_field_element(proof.leaf_value);
    let challenges = [
        channel.receive_random_field_element::<F>(),
        channel.receive_random_field_element::<F>(),
        channel.receive_random_field_element::<F>(),
    ];
    if challenges != proof.challenges {
        return Err(StarkError::TranscriptDesync(
            "lookup proof's challenges were not drawn from this channel".to_string(),
        ));
    }

    let leaf_digest = hasher.hash_leaf_dyn(&proof.leaf_value.to_bytes_be());
    MerkleTree::verify(
        proof.table_commitment,
        proof.index,
        leaf_digest,
        &proof.path,
        hasher,
    )
    .map_err(|_| {
        StarkError::LookupReject(format!(
            "authentication path failed at index {}",
            proof.index
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Goldilocks;
    use crate::hash::{build, HashTag};

    type Fp = FieldElement<Goldilocks>;

    fn table() -> LookupTable<Goldilocks> {
        let hasher = build(HashTag::Sha256);
        LookupTable::new((0..256).map(Fp::from_u64).collect(), hasher.as_ref()).unwrap()
    }

    #[test]
    fn membership_in_range_is_accepted() {
        let table = table();
        let root = table.merkle_root();
        let hasher = build(HashTag::Sha256);

        let mut prover_channel = Channel::new(HashTag::Sha256);
        let proof = prove(Fp::from_u64(42), &table, &mut prover_channel).unwrap();

        let mut verifier_channel = Channel::new(HashTag::Sha256);
        verify_proof(&proof, root, hasher.as_ref(), &mut verifier_channel).unwrap();
    }

    #[test]
    fn value_outside_the_range_is_rejected_at_proving_time() {
        let table = table();
        let mut channel = Channel::new(HashTag::Sha256);
        assert!(prove(Fp::from_u64(300), &table, &mut channel).is_err());
    }

    #[test]
    fn empty_table_is_rejected_at_construction() {
        let hasher = build(HashTag::Sha256);
        assert!(LookupTable::<Goldilocks>::new(Vec::new(), hasher.as_ref()).is_err());
    }

    #[test]
    fn tampered_leaf_value_is_rejected_at_verification() {
        let table = table();
        let root = table.merkle_root();
        let hasher = build(HashTag::Sha256);

        let mut prover_channel = Channel::new(HashTag::Sha256);
        let mut proof = prove(Fp::from_u64(42), &table, &mut prover_channel).unwrap();
        proof.leaf_value = proof.leaf_value + Fp::one();

        let mut verifier_channel = Channel::new(HashTag::Sha256);
        assert!(verify_proof(&proof, root, hasher.as_ref(), &mut verifier_channel).is_err());
    }

    #[test]
    fn mismatched_commitment_is_rejected() {
        let table = table();
        let hasher = build(HashTag::Sha256);

        let mut prover_channel = Channel::new(HashTag::Sha256);
        let proof = prove(Fp::from_u64(42), &table, &mut prover_channel).unwrap();

        let mut verifier_channel = Channel::new(HashTag::Sha256);
        let wrong_root = crate::hash::ZERO_DIGEST;
        assert!(verify_proof(&proof, wrong_root, hasher.as_ref(), &mut verifier_channel).is_err());
    }

    #[test]
    fn constraint_reports_membership_directly() {
        let table = table();
        let constraint = LookupConstraint::new(&table);
        assert!(constraint.is_satisfied(&Fp::from_u64(7)));
        assert!(!constraint.is_satisfied(&Fp::from_u64(9000)));
    }
}
