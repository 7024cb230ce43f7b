//! The verification pipeline (component C8): mirrors [`crate::prover`] step
//! for step, reconstructing the Fiat-Shamir channel purely from the proof's
//! own items and never trusting a value the prover claims without a path
//! back to a commitment.
//!
//! Every quotient-consistency check here is the pointwise twin of a
//! polynomial identity the prover built: since polynomial division
//! commutes with evaluation at a point that isn't a root of the divisor,
//! checking e.g. `composition(z) == sum_c coeff_c * constraint_c(z) /
//! zerofier(z) + ...` at the single out-of-domain point `z` is equivalent
//! to the prover's full-polynomial construction, without the verifier ever
//! holding a polynomial of its own.

use log::debug;

use crate::air::{BoundaryConstraint, ConstraintSet, Frame};
use crate::channel::Channel;
use crate::config::STARKParameters;
use crate::domain::{sample_ood_point, ArithmeticDomain};
use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};
use crate::fri;
use crate::grinding;
use crate::hash;
use crate::merkle::MerkleTree;
use crate::proof::StarkProof;

pub struct Verifier {
    params: STARKParameters,
}

impl Verifier {
    pub fn new(params: STARKParameters) -> StarkResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn verify<F: PrimeField>(
        &self,
        proof: &StarkProof<F>,
        constraints: &dyn ConstraintSet<F>,
    ) -> StarkResult<()> {
        let trace_length = constraints.trace_length();
        if trace_length < 2 || !trace_length.is_power_of_two() {
            return Err(StarkError::InvalidParameters(format!(
                "trace_length must be a power of two >= 2, got {trace_length}"
            )));
        }
        let num_columns = constraints.num_columns();
        if proof.ood_trace_current.len() != num_columns || proof.ood_trace_next.len() != num_columns {
            return Err(StarkError::ProofMalformed(
                "out-of-domain trace evaluation count does not match the constraint set's column count"
                    .to_string(),
            ));
        }

        let trace_domain = ArithmeticDomain::<F>::new(FieldElement::one(), trace_length)?;
        let lde_domain = ArithmeticDomain::<F>::new(
            FieldElement::from_u64(self.params.coset_offset),
            trace_length * self.params.blowup_factor,
        )?;

        let hasher = hash::build(self.params.hash_tag);
        let mut channel = Channel::new(self.params.hash_tag);

        // Step 1: claim shape, then trace commitment.
        channel.send_usize(trace_length.trailing_zeros() as usize);
        channel.send_digest(&proof.trace_root);
        debug!("verifier: replayed trace commitment");

        // Step 2: composition coefficients, one per transition constraint
        // and one per boundary constraint.
        let boundary_constraints = constraints.boundary_constraints();
        for constraint in &boundary_constraints {
            if constraint.row >= trace_length || constraint.column >= num_columns {
                return Err(StarkError::InvalidParameters(format!(
                    "boundary constraint references row {} column {} outside the trace",
                    constraint.row, constraint.column
                )));
            }
        }
        let num_transition = constraints.num_transition_constraints();
        let num_coeffs = num_transition + boundary_constraints.len();
        let coeffs: Vec<FieldElement<F>> = (0..num_coeffs)
            .map(|_| channel.receive_random_field_element::<F>())
            .collect();

        // Step 3: composition commitment.
        channel.send_digest(&proof.composition_root);

        // Step 4: out-of-domain point and the prover's claimed evaluations.
        let z = sample_ood_point(&mut channel, &trace_domain);
        let z_next = z * trace_domain.generator();
        for v in &proof.ood_trace_current {
            channel.send_field_element(*v);
        }
        for v in &proof.ood_trace_next {
            channel.send_field_element(*v);
        }
        channel.send_field_element(proof.ood_composition);

        // Step 5: the claimed composition evaluation must equal what the
        // constraint set and boundary conditions force it to be at `z`.
        if !composition_identity_holds(
            constraints,
            &boundary_constraints,
            &trace_domain,
            z,
            &proof.ood_trace_current,
            &proof.ood_trace_next,
            proof.ood_composition,
            &coeffs,
        )? {
            return Err(StarkError::FriReject(
                "out-of-domain composition evaluation does not match the constraint set".to_string(),
            ));
        }
        debug!("verifier: composition identity at the OOD point holds");

        // Step 6: DEEP coefficients.
        let deep_coeffs: Vec<FieldElement<F>> = (0..num_columns * 2 + 1)
            .map(|_| channel.receive_random_field_element::<F>())
            .collect();

        // Step 7: FRI commit-phase replay, with the grinding check inserted
        // at exactly the point the prover ran it — between the commit
        // phase's last transcript entry (the final polynomial) and the
        // query phase's first squeeze.
        let replay = fri::verify_commit_phase(
            &proof.fri_proof,
            lde_domain.clone(),
            self.params.fri_stopping_degree,
            &mut channel,
        )?;

        let transcript_so_far = channel.transcript().to_vec();
        grinding::verify_grind(
            &transcript_so_far,
            proof.pow_nonce,
            self.params.hash_tag,
            self.params.grinding_factor,
        )?;
        channel.send_usize(proof.pow_nonce as usize);

        let query_indices = fri::verify_queries(
            &proof.fri_proof,
            &replay,
            self.params.fri_number_of_queries,
            hasher.as_ref(),
            &mut channel,
        )?;
        debug!("verifier: FRI proof accepted");

        // Step 8: every trace/composition opening authenticates to its
        // root, and the DEEP identity holds at every point FRI actually
        // queried (the indices derived above — never `proof`'s own
        // `query_indices` field, which is only the prover's bookkeeping).
        if proof.trace_query_openings.len() != self.params.fri_number_of_queries
            || proof.composition_query_openings.len() != self.params.fri_number_of_queries
        {
            return Err(StarkError::ProofMalformed(
                "query opening count does not match fri_number_of_queries".to_string(),
            ));
        }

        let first_layer_len = lde_domain.length();
        let half = first_layer_len / 2;

        for (i, idx) in query_indices.iter().enumerate() {
            let trace_opening = &proof.trace_query_openings[i];
            if trace_opening.values.len() != num_columns {
                return Err(StarkError::ProofMalformed(
                    "trace query opening column count mismatch".to_string(),
                ));
            }
            let trace_leaf = batched_leaf_bytes(&trace_opening.values);
            MerkleTree::verify(
                proof.trace_root,
                *idx,
                hasher.hash_leaf_dyn(&trace_leaf),
                &trace_opening.path,
                hasher.as_ref(),
            )?;

            let composition_opening = &proof.composition_query_openings[i];
            if composition_opening.values.len() != 1 {
                return Err(StarkError::ProofMalformed(
                    "composition query opening must carry exactly one value".to_string(),
                ));
            }
            MerkleTree::verify(
                proof.composition_root,
                *idx,
                hasher.hash_leaf_dyn(&composition_opening.values[0].to_bytes_be()),
                &composition_opening.path,
                hasher.as_ref(),
            )?;

            let x = lde_domain.offset() * lde_domain.generator().pow(*idx as u64);
            let expected_deep = reconstruct_deep_value(
                &trace_opening.values,
                composition_opening.values[0],
                x,
                z,
                z_next,
                &proof.ood_trace_current,
                &proof.ood_trace_next,
                proof.ood_composition,
                &deep_coeffs,
            )?;

            let opening = proof
                .fri_proof
                .query_decommitments
                .get(i)
                .and_then(|d| d.layers.first())
                .ok_or_else(|| {
                    StarkError::ProofMalformed(
                        "FRI proof carries no first-layer opening for a queried index".to_string(),
                    )
                })?;
            let fri_value = if *idx < half {
                opening.value_x
            } else {
                opening.value_minus_x
            };

            if expected_deep != fri_value {
                return Err(StarkError::FriReject(format!(
                    "DEEP identity failed at query index {idx}"
                )));
            }
        }
        debug!("verifier: DEEP identity holds at every queried index");

        Ok(())
    }
}

fn batched_leaf_bytes<F: PrimeField>(values: &[FieldElement<F>]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for v in values {
        bytes.extend_from_slice(&v.to_bytes_be());
    }
    bytes
}

/// Checks `composition(z) == sum_c coeffs[c] * constraint_c(z)/Z(z) +
/// sum_j coeffs[nt+j] * (trace_{col_j}(z) - value_j)/(z - domain_point_j)`,
/// the pointwise twin of [`crate::prover`]'s composition-polynomial build.
#[allow(clippy::too_many_arguments)]
fn composition_identity_holds<F: PrimeField>(
    constraints: &dyn ConstraintSet<F>,
    boundary_constraints: &[BoundaryConstraint<F>],
    trace_domain: &ArithmeticDomain<F>,
    z: FieldElement<F>,
    ood_trace_current: &[FieldElement<F>],
    ood_trace_next: &[FieldElement<F>],
    ood_composition: FieldElement<F>,
    coeffs: &[FieldElement<F>],
) -> StarkResult<bool> {
    let n = trace_domain.length() as u64;
    let num_transition = constraints.num_transition_constraints();

    let frame = Frame {
        current: ood_trace_current,
        next: ood_trace_next,
    };
    let constraint_values = constraints.evaluate_transition(&frame);
    if constraint_values.len() != num_transition {
        return Err(StarkError::InvalidParameters(
            "constraint set returned a different number of transition values than it advertises"
                .to_string(),
        ));
    }

    let last_point = trace_domain.generator().pow(n - 1);
    let zerofier_at_z = (z.pow(n) - FieldElement::one()) * (z - last_point).inv()?;
    let zerofier_inv = zerofier_at_z.inv()?;

    let mut expected = FieldElement::zero();
    for c in 0..num_transition {
        expected = expected + coeffs[c] * constraint_values[c] * zerofier_inv;
    }

    let domain_points = trace_domain.elements();
    for (j, constraint) in boundary_constraints.iter().enumerate() {
        let point = domain_points[constraint.row];
        let denom_inv = (z - point).inv()?;
        let numerator = ood_trace_current[constraint.column] - constraint.value;
        expected = expected + coeffs[num_transition + j] * numerator * denom_inv;
    }

    Ok(expected == ood_composition)
}

/// Reconstructs the DEEP codeword value at `x`, the pointwise twin of
/// [`crate::prover`]'s DEEP polynomial build: `deep(x) = sum_c g_c *
/// (trace_c(x) - trace_c(z))/(x-z) + sum_c g'_c * (trace_c(x) -
/// trace_c(z*generator))/(x - z*generator) + g_last * (composition(x) -
/// composition(z))/(x-z)`.
#[allow(clippy::too_many_arguments)]
fn reconstruct_deep_value<F: PrimeField>(
    trace_values: &[FieldElement<F>],
    composition_value: FieldElement<F>,
    x: FieldElement<F>,
    z: FieldElement<F>,
    z_next: FieldElement<F>,
    ood_trace_current: &[FieldElement<F>],
    ood_trace_next: &[FieldElement<F>],
    ood_composition: FieldElement<F>,
    deep_coeffs: &[FieldElement<F>],
) -> StarkResult<FieldElement<F>> {
    let num_columns = trace_values.len();
    let inv_x_minus_z = (x - z).inv()?;
    let inv_x_minus_z_next = (x - z_next).inv()?;

    let mut acc = FieldElement::zero();
    for c in 0..num_columns {
        acc = acc + deep_coeffs[c] * (trace_values[c] - ood_trace_current[c]) * inv_x_minus_z;
        acc = acc
            + deep_coeffs[num_columns + c] * (trace_values[c] - ood_trace_next[c]) * inv_x_minus_z_next;
    }
    acc = acc + deep_coeffs[num_columns * 2] * (composition_value - ood_composition) * inv_x_minus_z;
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::fibonacci::{FibonacciConstraints, FibonacciTrace};
    use crate::field::Goldilocks;
    use crate::hash::HashTag;
    use crate::prover::Prover;

    fn params() -> STARKParameters {
        STARKParameters {
            blowup_factor: 8,
            fri_number_of_queries: 30,
            coset_offset: 3,
            grinding_factor: 0,
            fri_stopping_degree: 2,
            hash_tag: HashTag::Sha256,
            num_workers: 1,
            security_level: 80,
            num_trace_randomizers: 2,
        }
    }

    #[test]
    fn verifies_a_valid_proof() {
        let trace = FibonacciTrace::<Goldilocks>::new(16);
        let constraints = FibonacciConstraints::<Goldilocks>::new(16);
        let prover = Prover::with_fixed_seed(params(), [7u8; 32]).unwrap();
        let proof = prover.prove(&trace, &constraints).unwrap();

        let verifier = Verifier::new(params()).unwrap();
        verifier.verify(&proof, &constraints).unwrap();
    }

    #[test]
    fn rejects_a_tampered_trace_root() {
        let trace = FibonacciTrace::<Goldilocks>::new(16);
        let constraints = FibonacciConstraints::<Goldilocks>::new(16);
        let prover = Prover::with_fixed_seed(params(), [7u8; 32]).unwrap();
        let mut proof = prover.prove(&trace, &constraints).unwrap();
        proof.trace_root[0] ^= 0xFF;

        let verifier = Verifier::new(params()).unwrap();
        assert!(verifier.verify(&proof, &constraints).is_err());
    }

    #[test]
    fn rejects_a_tampered_ood_composition_value() {
        let trace = FibonacciTrace::<Goldilocks>::new(16);
        let constraints = FibonacciConstraints::<Goldilocks>::new(16);
        let prover = Prover::with_fixed_seed(params(), [7u8; 32]).unwrap();
        let mut proof = prover.prove(&trace, &constraints).unwrap();
        proof.ood_composition = proof.ood_composition + FieldElement::one();

        let verifier = Verifier::new(params()).unwrap();
        assert!(verifier.verify(&proof, &constraints).is_err());
    }

    #[test]
    fn rejects_a_missing_grinding_nonce() {
        let mut hard_params = params();
        hard_params.grinding_factor = 8;
        let trace = FibonacciTrace::<Goldilocks>::new(16);
        let constraints = FibonacciConstraints::<Goldilocks>::new(16);
        let prover = Prover::with_fixed_seed(hard_params.clone(), [7u8; 32]).unwrap();
        let mut proof = prover.prove(&trace, &constraints).unwrap();
        proof.pow_nonce = proof.pow_nonce.wrapping_add(1);

        let verifier = Verifier::new(hard_params).unwrap();
        assert!(verifier.verify(&proof, &constraints).is_err());
    }
}
