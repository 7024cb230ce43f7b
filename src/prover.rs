//! The proving pipeline (component C7): trace commitment, constraint
//! composition, DEEP-ALI out-of-domain sampling, and a FRI low-degree
//! proof over the resulting combination — in that order, each step's
//! randomness drawn from the transcript the previous steps fed.
//!
//! The transition term of the composition polynomial is built by
//! evaluating `evaluate_transition` over the LDE domain (from the
//! already-committed `trace_lde`) and interpolating there, not over the
//! smaller trace domain — see `build_composition_polynomial` for why.
//! Boundary terms divide `trace_polys` directly and need no sampling
//! step. Both assume transition degree 1 (true of every `ConstraintSet`
//! shipped in `demo`); a general-degree AIR compiler would need a wider
//! LDE domain to keep the combined transition polynomial's degree inside
//! it. Out of scope here — see DESIGN.md.

use log::debug;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::air::{ConstraintSet, Frame, TraceSource};
use crate::channel::Channel;
use crate::config::STARKParameters;
use crate::domain::{sample_ood_point, ArithmeticDomain};
use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};
use crate::fri;
use crate::grinding;
use crate::hash;
use crate::merkle::MerkleTree;
use crate::polynomial::Polynomial;
use crate::proof::{ColumnOpening, StarkProof};

pub struct Prover {
    params: STARKParameters,
    fixed_seed: Option<[u8; 32]>,
}

impl Prover {
    pub fn new(params: STARKParameters) -> StarkResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            fixed_seed: None,
        })
    }

    /// Fixes the zero-knowledge blinding randomness to a known seed rather
    /// than drawing it from the OS. This makes proof bytes reproducible for
    /// golden-file tests, at the cost of zero-knowledge: anyone who learns
    /// `seed` can unmask the trace polynomials this prover commits to.
    /// Never use this outside test code.
    pub fn with_fixed_seed(params: STARKParameters, seed: [u8; 32]) -> StarkResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            fixed_seed: Some(seed),
        })
    }

    pub fn prove<F: PrimeField>(
        &self,
        trace: &dyn TraceSource<F>,
        constraints: &dyn ConstraintSet<F>,
    ) -> StarkResult<StarkProof<F>> {
        // Step 1: shape validation.
        constraints.validate_against(trace)?;
        let trace_length = trace.trace_length();
        if trace_length < 2 || !trace_length.is_power_of_two() {
            return Err(StarkError::InvalidParameters(format!(
                "trace_length must be a power of two >= 2, got {trace_length}"
            )));
        }

        // Step 2: trace domain (the natural, offset-1 subgroup).
        let trace_domain = ArithmeticDomain::<F>::new(FieldElement::one(), trace_length)?;

        // Step 3: interpolate each column into a polynomial.
        let mut trace_polys: Vec<Polynomial<F>> = (0..trace.num_columns())
            .map(|c| trace_domain.interpolate(trace.column(c)))
            .collect::<StarkResult<_>>()?;

        // Step 4: zero-knowledge blinding — add a random multiple of the
        // trace vanishing polynomial to every column. Leaves the column's
        // values on the trace domain untouched (the vanishing polynomial
        // is zero there) while masking the polynomial's higher
        // coefficients, which are what the LDE evaluations and FRI queries
        // would otherwise expose.
        let mut rng = self.blinding_rng();
        let trace_vanishing = &Polynomial::new_monomial(FieldElement::one(), trace_length)
            - &Polynomial::new(vec![FieldElement::one()]);
        for poly in trace_polys.iter_mut() {
            let blind = FieldElement::from_u64(rng.next_u64());
            *poly = &*poly + &(&trace_vanishing * &Polynomial::new(vec![blind]));
        }

        // Step 5: LDE domain, batched Merkle commitment to every column.
        let lde_domain =
            ArithmeticDomain::<F>::new(FieldElement::from_u64(self.params.coset_offset), trace_length * self.params.blowup_factor)?;
        let trace_lde: Vec<Vec<FieldElement<F>>> = trace_polys
            .iter()
            .map(|p| lde_domain.evaluate(p))
            .collect::<StarkResult<_>>()?;

        let hasher = hash::build(self.params.hash_tag);
        let mut channel = Channel::new(self.params.hash_tag);

        // Absorb the claim shape (log2 padded height) before any
        // commitment, so every later challenge is bound to the trace
        // length the verifier will independently check it against.
        channel.send_usize(trace_length.trailing_zeros() as usize);

        let trace_leaves = batched_leaves(&trace_lde, lde_domain.length());
        let trace_tree = MerkleTree::build(&trace_leaves, hasher.as_ref())?;
        channel.send_digest(&trace_tree.root());
        debug!("prover: committed trace, root sent");

        // Step 6: composition coefficients — one per transition constraint,
        // one per boundary constraint.
        let boundary_constraints = constraints.boundary_constraints();
        let num_coeffs = constraints.num_transition_constraints() + boundary_constraints.len();
        let coeffs: Vec<FieldElement<F>> = (0..num_coeffs)
            .map(|_| channel.receive_random_field_element::<F>())
            .collect();

        // Step 7: composition polynomial, LDE evaluation, commitment.
        let composition_poly = build_composition_polynomial(
            &trace_polys,
            &trace_lde,
            &trace_domain,
            &lde_domain,
            constraints,
            &boundary_constraints,
            &coeffs,
        )?;
        let composition_lde = lde_domain.evaluate(&composition_poly)?;
        let composition_leaves: Vec<Vec<u8>> = composition_lde
            .iter()
            .map(|e| e.to_bytes_be().to_vec())
            .collect();
        let composition_tree = MerkleTree::build(&composition_leaves, hasher.as_ref())?;
        channel.send_digest(&composition_tree.root());

        // Step 8: out-of-domain sampling.
        let z = sample_ood_point(&mut channel, &trace_domain);
        let z_next = z * trace_domain.generator();
        let ood_trace_current: Vec<FieldElement<F>> =
            trace_polys.iter().map(|p| p.evaluate(&z)).collect();
        let ood_trace_next: Vec<FieldElement<F>> =
            trace_polys.iter().map(|p| p.evaluate(&z_next)).collect();
        let ood_composition = composition_poly.evaluate(&z);
        for v in &ood_trace_current {
            channel.send_field_element(*v);
        }
        for v in &ood_trace_next {
            channel.send_field_element(*v);
        }
        channel.send_field_element(ood_composition);

        // Step 9: DEEP composition polynomial. The transcript has now
        // absorbed both commitment roots and the OOD point/values, so the
        // coefficients sampled here (and every FRI fold challenge derived
        // downstream) are bound to the quotient commitment, not just to
        // the out-of-domain point alone.
        let deep_coeffs: Vec<FieldElement<F>> = (0..trace_polys.len() * 2 + 1)
            .map(|_| channel.receive_random_field_element::<F>())
            .collect();
        let deep_poly = build_deep_polynomial(
            &trace_polys,
            &composition_poly,
            z,
            z_next,
            &deep_coeffs,
        )?;

        // Step 10: FRI commit phase over the DEEP polynomial's LDE.
        let deep_lde = lde_domain.evaluate(&deep_poly)?;
        let commitment = fri::commit_phase(
            deep_lde,
            lde_domain.clone(),
            self.params.fri_stopping_degree,
            hasher.as_ref(),
            &mut channel,
            self.params.num_workers,
        )?;

        // Step 11: grinding, then FRI query phase + matching trace/composition openings.
        let pow_nonce = grinding::grind(&mut channel, self.params.hash_tag, self.params.grinding_factor)?;
        let (query_indices, fri_decommitments) =
            fri::query_phase(&commitment, &mut channel, self.params.fri_number_of_queries)?;

        let trace_query_openings = query_indices
            .iter()
            .map(|idx| {
                Ok(ColumnOpening {
                    values: trace_lde.iter().map(|col| col[*idx]).collect(),
                    path: trace_tree.authentication_path(*idx)?,
                })
            })
            .collect::<StarkResult<Vec<_>>>()?;
        let composition_query_openings = query_indices
            .iter()
            .map(|idx| {
                Ok(ColumnOpening {
                    values: vec![composition_lde[*idx]],
                    path: composition_tree.authentication_path(*idx)?,
                })
            })
            .collect::<StarkResult<Vec<_>>>()?;

        // Step 12: assemble.
        Ok(StarkProof {
            trace_root: trace_tree.root(),
            composition_root: composition_tree.root(),
            ood_trace_current,
            ood_trace_next,
            ood_composition,
            pow_nonce,
            fri_proof: fri::FriProof {
                layer_roots: commitment.layer_trees.iter().map(MerkleTree::root).collect(),
                final_polynomial_coefficients: commitment.final_polynomial.coefficients().to_vec(),
                query_indices,
                query_decommitments: fri_decommitments,
            },
            trace_query_openings,
            composition_query_openings,
        })
    }

    fn blinding_rng(&self) -> ChaCha20Rng {
        match self.fixed_seed {
            Some(seed) => ChaCha20Rng::from_seed(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

fn batched_leaves<F: PrimeField>(columns: &[Vec<FieldElement<F>>], domain_len: usize) -> Vec<Vec<u8>> {
    (0..domain_len)
        .map(|row| {
            let mut bytes = Vec::with_capacity(columns.len() * 8);
            for col in columns {
                bytes.extend_from_slice(&col[row].to_bytes_be());
            }
            bytes
        })
        .collect()
}

fn transition_zerofier<F: PrimeField>(trace_domain: &ArithmeticDomain<F>) -> StarkResult<Polynomial<F>> {
    let n = trace_domain.length();
    let full = &Polynomial::new_monomial(FieldElement::one(), n) - &Polynomial::new(vec![FieldElement::one()]);
    let last_point = trace_domain.generator().pow((n - 1) as u64);
    let divisor = Polynomial::new(vec![-last_point, FieldElement::one()]);
    full.divide_exact(&divisor)
}

fn boundary_divisor<F: PrimeField>(point: FieldElement<F>) -> Polynomial<F> {
    Polynomial::new(vec![-point, FieldElement::one()])
}

/// `composition(X) = sum_c coeff_c * transition_c(X)/Z_transition(X) +
/// sum_j coeff_j * (trace_poly[col_j](X) - value_j)/(X - domain_point(row_j))`.
///
/// The transition term cannot be built by sampling `evaluate_transition` at
/// the `n` trace-domain points and interpolating over that same `n`-point
/// domain: step 4's zero-knowledge blinding raises every trace polynomial's
/// degree to `n`, so a linear combination of them reaches degree `n` too,
/// and an `n`-point interpolation can only recover a degree-`<n` polynomial
/// — it silently aliases away the blinded term. Sampling over the (much
/// larger) LDE domain instead, where the combined transition polynomial's
/// true degree comfortably fits, and interpolating there recovers it
/// exactly. Every transition constraint divides the same zerofier here, so
/// the coefficients are folded in before the single interpolation and
/// division rather than one pair per constraint.
fn build_composition_polynomial<F: PrimeField>(
    trace_polys: &[Polynomial<F>],
    trace_lde: &[Vec<FieldElement<F>>],
    trace_domain: &ArithmeticDomain<F>,
    lde_domain: &ArithmeticDomain<F>,
    constraints: &dyn ConstraintSet<F>,
    boundary_constraints: &[crate::air::BoundaryConstraint<F>],
    coeffs: &[FieldElement<F>],
) -> StarkResult<Polynomial<F>> {
    let mut composition = Polynomial::zero();
    let zerofier = transition_zerofier(trace_domain)?;
    let num_transition = constraints.num_transition_constraints();

    if num_transition > 0 {
        let lde_len = lde_domain.length();
        let blowup_factor = lde_len / trace_domain.length();
        let mut combined = vec![FieldElement::zero(); lde_len];
        for (i, slot) in combined.iter_mut().enumerate() {
            let next_i = (i + blowup_factor) % lde_len;
            let current: Vec<FieldElement<F>> = trace_lde.iter().map(|col| col[i]).collect();
            let next: Vec<FieldElement<F>> = trace_lde.iter().map(|col| col[next_i]).collect();
            let frame = Frame {
                current: &current,
                next: &next,
            };
            for (c, value) in constraints.evaluate_transition(&frame).into_iter().enumerate() {
                *slot = *slot + coeffs[c] * value;
            }
        }
        let combined_poly = lde_domain.interpolate(&combined)?;
        composition = &composition + &combined_poly.divide_exact(&zerofier)?;
    }

    let domain_points = trace_domain.elements();
    for (j, constraint) in boundary_constraints.iter().enumerate() {
        let point = domain_points[constraint.row];
        let numerator = &trace_polys[constraint.column] - &Polynomial::new(vec![constraint.value]);
        let quotient = numerator.divide_exact(&boundary_divisor(point))?;
        let coeff = coeffs[num_transition + j];
        composition = &composition + &(&quotient * &Polynomial::new(vec![coeff]));
    }

    Ok(composition)
}

/// `deep(X) = sum_c g_c * (trace_c(X) - trace_c(z))/(X - z)
///          + sum_c g'_c * (trace_c(X) - trace_c(z*g))/(X - z*g)
///          + g_last * (composition(X) - composition(z))/(X - z)`.
fn build_deep_polynomial<F: PrimeField>(
    trace_polys: &[Polynomial<F>],
    composition_poly: &Polynomial<F>,
    z: FieldElement<F>,
    z_next: FieldElement<F>,
    coeffs: &[FieldElement<F>],
) -> StarkResult<Polynomial<F>> {
    let mut deep = Polynomial::zero();
    let divisor_z = boundary_divisor(z);
    let divisor_z_next = boundary_divisor(z_next);

    for (c, poly) in trace_polys.iter().enumerate() {
        let value_z = poly.evaluate(&z);
        let quotient_z = (poly - &Polynomial::new(vec![value_z])).divide_exact(&divisor_z)?;
        deep = &deep + &(&quotient_z * &Polynomial::new(vec![coeffs[c]]));

        let value_z_next = poly.evaluate(&z_next);
        let quotient_z_next =
            (poly - &Polynomial::new(vec![value_z_next])).divide_exact(&divisor_z_next)?;
        deep = &deep + &(&quotient_z_next * &Polynomial::new(vec![coeffs[trace_polys.len() + c]]));
    }

    let value_z = composition_poly.evaluate(&z);
    let quotient = (composition_poly - &Polynomial::new(vec![value_z])).divide_exact(&divisor_z)?;
    deep = &deep + &(&quotient * &Polynomial::new(vec![coeffs[trace_polys.len() * 2]]));

    Ok(deep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::fibonacci::{FibonacciConstraints, FibonacciTrace};
    use crate::field::Goldilocks;
    use crate::hash::HashTag;

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
    fn proves_a_small_fibonacci_trace() {
        let trace = FibonacciTrace::<Goldilocks>::new(16);
        let constraints = FibonacciConstraints::<Goldilocks>::new(16);
        let prover = Prover::with_fixed_seed(params(), [7u8; 32]).unwrap();
        let proof = prover.prove(&trace, &constraints).unwrap();
        assert!(!proof.fri_proof.layer_roots.is_empty());
        assert_eq!(proof.trace_query_openings.len(), 12);
    }

    #[test]
    fn rejects_malformed_parameters_at_construction() {
        let mut bad = params();
        bad.blowup_factor = 3;
        assert!(Prover::new(bad).is_err());
    }
}
