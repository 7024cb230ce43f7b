//! FRI engine orchestration (component C6): commit phase, query phase, and
//! verification, built on [`super::fold::fold_layer`].

use crate::channel::Channel;
use crate::domain::ArithmeticDomain;
use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};
use crate::hash::DynSpongeHash;
use crate::merkle::MerkleTree;
use crate::polynomial::Polynomial;

use super::decommitment::{FriLayerQueryOpening, FriProof, FriQueryDecommitment};
use super::fold::fold_layer;

/// Everything the prover needs to retain between the commit phase and the
/// query phase: every intermediate layer's domain, evaluations and Merkle
/// tree, plus the final polynomial sent in the clear.
pub struct FriCommitment<F: PrimeField> {
    pub layer_domains: Vec<ArithmeticDomain<F>>,
    pub layer_evaluations: Vec<Vec<FieldElement<F>>>,
    pub layer_trees: Vec<MerkleTree>,
    pub final_polynomial: Polynomial<F>,
}

/// Repeatedly folds `evaluations` (TR17-134) until the domain shrinks to
/// `stopping_degree` or smaller, committing to every intermediate layer and
/// sending its root through `channel`, then interpolates and sends the
/// remaining small polynomial directly.
pub fn commit_phase<F: PrimeField>(
    mut evaluations: Vec<FieldElement<F>>,
    mut domain: ArithmeticDomain<F>,
    stopping_degree: usize,
    hasher: &dyn DynSpongeHash,
    channel: &mut Channel,
    num_workers: usize,
) -> StarkResult<FriCommitment<F>> {
    if evaluations.len() != domain.length() {
        return Err(StarkError::DomainMismatch(
            "commit_phase: evaluation count does not match the domain".to_string(),
        ));
    }

    let mut layer_domains = Vec::new();
    let mut layer_evaluations = Vec::new();
    let mut layer_trees = Vec::new();

    loop {
        if domain.length() <= stopping_degree {
            let final_polynomial = domain.interpolate(&evaluations)?;
            for c in final_polynomial.coefficients() {
                channel.send_field_element(*c);
            }
            return Ok(FriCommitment {
                layer_domains,
                layer_evaluations,
                layer_trees,
                final_polynomial,
            });
        }

        let leaf_data: Vec<Vec<u8>> = evaluations
            .iter()
            .map(|e| e.to_bytes_be().to_vec())
            .collect();
        let tree = MerkleTree::build(&leaf_data, hasher)?;
        channel.send_digest(&tree.root());

        layer_domains.push(domain.clone());
        layer_evaluations.push(evaluations.clone());
        layer_trees.push(tree);

        let alpha = channel.receive_random_field_element::<F>();
        evaluations = fold_layer(&evaluations, &domain, alpha, num_workers)?;
        domain = domain.halve()?;
    }
}

/// Samples `num_queries` indices into the first layer's domain and opens
/// every committed layer at the corresponding pair of points.
pub fn query_phase<F: PrimeField>(
    commitment: &FriCommitment<F>,
    channel: &mut Channel,
    num_queries: usize,
) -> StarkResult<(Vec<usize>, Vec<FriQueryDecommitment<F>>)> {
    let first_domain_len = commitment
        .layer_domains
        .first()
        .ok_or_else(|| {
            StarkError::InvalidParameters(
                "query_phase: no committed FRI layers (domain already at the stopping degree)"
                    .to_string(),
            )
        })?
        .length();

    let mut indices = Vec::with_capacity(num_queries);
    let mut decommitments = Vec::with_capacity(num_queries);

    for _ in 0..num_queries {
        let idx = channel.receive_random_usize(first_domain_len);
        indices.push(idx);

        let mut layers = Vec::with_capacity(commitment.layer_trees.len());
        for (evals, tree) in commitment.layer_evaluations.iter().zip(&commitment.layer_trees) {
            let half = evals.len() / 2;
            let local = idx % half;
            layers.push(FriLayerQueryOpening {
                value_x: evals[local],
                path_x: tree.authentication_path(local)?,
                value_minus_x: evals[local + half],
                path_minus_x: tree.authentication_path(local + half)?,
            });
        }
        decommitments.push(FriQueryDecommitment { layers });
    }

    Ok((indices, decommitments))
}

/// What the commit-phase replay recovers: every layer's domain, its fold
/// challenge, and the claimed final polynomial. Handed back to the caller
/// (rather than folded into one monolithic `verify`) so a STARK-level
/// verifier can insert its own checks — grinding, in this engine's case —
/// between the commit-phase replay and the query phase, exactly where the
/// prover inserted them.
pub struct FriCommitmentReplay<F: PrimeField> {
    layer_domains: Vec<ArithmeticDomain<F>>,
    alphas: Vec<FieldElement<F>>,
    final_polynomial: Polynomial<F>,
}

/// Replays the commit-phase transcript against `proof`'s committed roots
/// to recover every fold challenge, and checks the claimed final
/// polynomial respects the stopping degree.
pub fn verify_commit_phase<F: PrimeField>(
    proof: &FriProof<F>,
    domain: ArithmeticDomain<F>,
    stopping_degree: usize,
    channel: &mut Channel,
) -> StarkResult<FriCommitmentReplay<F>> {
    let mut layer_domains = Vec::with_capacity(proof.layer_roots.len());
    let mut alphas = Vec::with_capacity(proof.layer_roots.len());
    let mut current = domain;

    for root in &proof.layer_roots {
        if current.length() <= stopping_degree {
            return Err(StarkError::FriReject(
                "more committed layers than the stopping degree allows".to_string(),
            ));
        }
        channel.send_digest(root);
        layer_domains.push(current.clone());
        alphas.push(channel.receive_random_field_element::<F>());
        current = current.halve()?;
    }

    if current.length() > stopping_degree {
        return Err(StarkError::FriReject(
            "fewer committed layers than the domain requires".to_string(),
        ));
    }

    for c in &proof.final_polynomial_coefficients {
        channel.send_field_element(*c);
    }
    let final_polynomial = Polynomial::new(proof.final_polynomial_coefficients.clone());
    if final_polynomial
        .degree()
        .is_some_and(|d| d + 1 > stopping_degree)
    {
        return Err(StarkError::FriReject(
            "final polynomial exceeds the stopping degree".to_string(),
        ));
    }

    Ok(FriCommitmentReplay {
        layer_domains,
        alphas,
        final_polynomial,
    })
}

/// Samples query indices from `channel` (picking up wherever the caller
/// left the transcript after [`verify_commit_phase`], and any grinding
/// check in between), checks every opened pair against `replay`, and
/// returns the indices it derived — the only authoritative source for
/// which domain points were queried. A caller that also needs to check
/// trace/composition openings against the same queries (as
/// [`crate::verifier`] does) must index by this return value, not by
/// `proof.query_indices`: that field is the prover's own record and is
/// never trusted on its own.
pub fn verify_queries<F: PrimeField>(
    proof: &FriProof<F>,
    replay: &FriCommitmentReplay<F>,
    num_queries: usize,
    hasher: &dyn DynSpongeHash,
    channel: &mut Channel,
) -> StarkResult<Vec<usize>> {
    let layer_domains = &replay.layer_domains;
    let alphas = &replay.alphas;
    let final_polynomial = &replay.final_polynomial;

    if proof.query_decommitments.len() != num_queries {
        return Err(StarkError::FriReject(format!(
            "expected {num_queries} query decommitments, got {}",
            proof.query_decommitments.len()
        )));
    }

    let first_domain_len = layer_domains.first().map(ArithmeticDomain::length).ok_or_else(|| {
        StarkError::FriReject("FRI proof commits zero layers".to_string())
    })?;

    let mut derived_indices = Vec::with_capacity(proof.query_decommitments.len());
    for decommitment in &proof.query_decommitments {
        let idx = channel.receive_random_usize(first_domain_len);
        derived_indices.push(idx);

        if decommitment.layers.len() != layer_domains.len() {
            return Err(StarkError::FriReject(
                "query decommitment does not cover every committed layer".to_string(),
            ));
        }

        for (k, opening) in decommitment.layers.iter().enumerate() {
            let layer_domain = &layer_domains[k];
            let half = layer_domain.length() / 2;
            let local = idx % half;

            MerkleTree::verify(
                proof.layer_roots[k],
                local,
                hasher.hash_leaf_dyn(&opening.value_x.to_bytes_be()),
                &opening.path_x,
                hasher,
            )?;
            MerkleTree::verify(
                proof.layer_roots[k],
                local + half,
                hasher.hash_leaf_dyn(&opening.value_minus_x.to_bytes_be()),
                &opening.path_minus_x,
                hasher,
            )?;

            let x = layer_domain.offset() * layer_domain.generator().pow(local as u64);
            let folded = fold_point(opening.value_x, opening.value_minus_x, x, alphas[k])?;

            let next_half = half / 2;
            let next_local = local; // local already < half == next layer's length
            let expected = if k + 1 < decommitment.layers.len() {
                let next = &decommitment.layers[k + 1];
                if next_local < next_half {
                    next.value_x
                } else {
                    next.value_minus_x
                }
            } else {
                let next_domain = layer_domains[k].halve()?;
                let point = next_domain.offset() * next_domain.generator().pow(local as u64);
                final_polynomial.evaluate(&point)
            };

            if folded != expected {
                return Err(StarkError::FriReject(format!(
                    "fold inconsistency at layer {k}, query index {idx}"
                )));
            }
        }
    }

    Ok(derived_indices)
}

/// Convenience wrapper for callers with no STARK-level step to insert
/// between the commit-phase replay and the query phase (every test in
/// this module; a bare FRI proof with no surrounding protocol).
pub fn verify<F: PrimeField>(
    proof: &FriProof<F>,
    domain: ArithmeticDomain<F>,
    stopping_degree: usize,
    num_queries: usize,
    hasher: &dyn DynSpongeHash,
    channel: &mut Channel,
) -> StarkResult<()> {
    let replay = verify_commit_phase(proof, domain, stopping_degree, channel)?;
    verify_queries(proof, &replay, num_queries, hasher, channel).map(|_| ())
}

fn fold_point<F: PrimeField>(
    value_x: FieldElement<F>,
    value_minus_x: FieldElement<F>,
    x: FieldElement<F>,
    alpha: FieldElement<F>,
) -> StarkResult<FieldElement<F>> {
    let two_inv = FieldElement::<F>::from_u64(2).inv()?;
    let two_x_inv = (x * FieldElement::from_u64(2)).inv()?;
    let even_part = (value_x + value_minus_x) * two_inv;
    let odd_part = (value_x - value_minus_x) * two_x_inv;
    Ok(even_part + alpha * odd_part)
}
