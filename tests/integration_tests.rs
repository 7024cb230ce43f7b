use stark_engine::channel::Channel;
use stark_engine::demo::fibonacci::{FibonacciConstraints, FibonacciTrace};
use stark_engine::field::{FieldElement, Goldilocks};
use stark_engine::hash::HashTag;
use stark_engine::hash::build;
use stark_engine::lookup::{self, LookupTable};
use stark_engine::proof::StarkProof;
use stark_engine::{Prover, STARKParameters, Verifier};

type Fp = FieldElement<Goldilocks>;

fn params() -> STARKParameters {
    STARKParameters {
        blowup_factor: 8,
        fri_number_of_queries: 30,
        coset_offset: 3,
        grinding_factor: 4,
        fri_stopping_degree: 2,
        hash_tag: HashTag::Poseidon,
        num_workers: 2,
        security_level: 80,
        num_trace_randomizers: 2,
    }
}

#[test_log::test]
fn honest_fibonacci_proof_is_accepted() {
    for trace_length in [8usize, 16, 64] {
        let trace = FibonacciTrace::<Goldilocks>::new(trace_length);
        let constraints = FibonacciConstraints::<Goldilocks>::new(trace_length);
        let prover = Prover::with_fixed_seed(params(), [1u8; 32]).unwrap();
        let proof = prover.prove(&trace, &constraints).unwrap();

        let verifier = Verifier::new(params()).unwrap();
        verifier.verify(&proof, &constraints).unwrap();
    }
}

#[test_log::test]
fn proof_roundtrips_through_the_wire_format() {
    let trace = FibonacciTrace::<Goldilocks>::new(32);
    let constraints = FibonacciConstraints::<Goldilocks>::new(32);
    let prover = Prover::with_fixed_seed(params(), [2u8; 32]).unwrap();
    let proof = prover.prove(&trace, &constraints).unwrap();

    let bytes = proof.to_bytes();
    let recovered = StarkProof::<Goldilocks>::from_bytes(
        &bytes,
        params().fri_number_of_queries,
        constraints.num_columns(),
    )
    .unwrap();

    let verifier = Verifier::new(params()).unwrap();
    verifier.verify(&recovered, &constraints).unwrap();
}

#[test_log::test]
fn tampering_with_the_trace_commitment_is_rejected() {
    let trace = FibonacciTrace::<Goldilocks>::new(16);
    let constraints = FibonacciConstraints::<Goldilocks>::new(16);
    let prover = Prover::with_fixed_seed(params(), [3u8; 32]).unwrap();
    let mut proof = prover.prove(&trace, &constraints).unwrap();
    proof.trace_root[0] ^= 1;

    let verifier = Verifier::new(params()).unwrap();
    assert!(verifier.verify(&proof, &constraints).is_err());
}

#[test_log::test]
fn tampering_with_a_fri_query_opening_is_rejected() {
    let trace = FibonacciTrace::<Goldilocks>::new(16);
    let constraints = FibonacciConstraints::<Goldilocks>::new(16);
    let prover = Prover::with_fixed_seed(params(), [4u8; 32]).unwrap();
    let mut proof = prover.prove(&trace, &constraints).unwrap();
    proof.fri_proof.query_decommitments[0].layers[0].value_x =
        proof.fri_proof.query_decommitments[0].layers[0].value_x + Fp::one();

    let verifier = Verifier::new(params()).unwrap();
    assert!(verifier.verify(&proof, &constraints).is_err());
}

#[test_log::test]
fn proof_for_one_trace_is_rejected_against_a_different_one() {
    let trace_a = FibonacciTrace::<Goldilocks>::new(16);
    let constraints = FibonacciConstraints::<Goldilocks>::new(16);
    let prover = Prover::with_fixed_seed(params(), [5u8; 32]).unwrap();
    let proof = prover.prove(&trace_a, &constraints).unwrap();

    let larger_constraints = FibonacciConstraints::<Goldilocks>::new(32);
    let verifier = Verifier::new(params()).unwrap();
    assert!(verifier.verify(&proof, &larger_constraints).is_err());
}

#[test_log::test]
fn malformed_parameters_are_rejected_before_proving() {
    let mut bad = params();
    bad.blowup_factor = 5;
    assert!(Prover::new(bad.clone()).is_err());
    assert!(Verifier::new(bad).is_err());
}

#[test_log::test]
fn lookup_argument_accepts_honest_membership_and_rejects_tampering() {
    let hasher = build(HashTag::Sha3);
    let table = LookupTable::new((0..64).map(Fp::from_u64).collect(), hasher.as_ref()).unwrap();
    let root = table.merkle_root();

    let mut prover_channel = Channel::new(HashTag::Sha3);
    let proof = lookup::prove(Fp::from_u64(17), &table, &mut prover_channel).unwrap();

    let mut verifier_channel = Channel::new(HashTag::Sha3);
    lookup::verify_proof(&proof, root, hasher.as_ref(), &mut verifier_channel).unwrap();

    assert!(lookup::prove(Fp::from_u64(200), &table, &mut Channel::new(HashTag::Sha3)).is_err());

    let mut tampered_channel = Channel::new(HashTag::Sha3);
    let mut tampered_proof = proof.clone();
    tampered_proof.leaf_value = tampered_proof.leaf_value + Fp::one();
    assert!(lookup::verify_proof(&tampered_proof, root, hasher.as_ref(), &mut tampered_channel).is_err());
}
