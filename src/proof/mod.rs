//! The rich in-memory proof object the prover assembles and the verifier
//! consumes, plus its flattening into the typed wire format (component
//! "proof & wire format").

pub mod wire;

use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};
use crate::fri::FriProof;
use crate::hash::Digest;
use crate::merkle::AuthPath;

pub use wire::{Proof, ProofItem};

#[derive(Clone, Debug)]
pub struct ColumnOpening<F: PrimeField> {
    pub values: Vec<FieldElement<F>>,
    pub path: AuthPath,
}

#[derive(Clone, Debug)]
pub struct StarkProof<F: PrimeField> {
    pub trace_root: Digest,
    pub composition_root: Digest,
    pub ood_trace_current: Vec<FieldElement<F>>,
    pub ood_trace_next: Vec<FieldElement<F>>,
    pub ood_composition: FieldElement<F>,
    pub pow_nonce: u64,
    pub fri_proof: FriProof<F>,
    /// One opening per FRI query index, over every trace column at once
    /// (a single batched Merkle tree rather than one tree per column).
    pub trace_query_openings: Vec<ColumnOpening<F>>,
    pub composition_query_openings: Vec<ColumnOpening<F>>,
}

impl<F: PrimeField> StarkProof<F> {
    /// Flattens this proof into the typed wire sequence, in the exact order
    /// the verifier expects to read them back.
    pub fn to_wire(&self) -> Proof {
        let mut proof = Proof::new();
        proof.push(ProofItem::MerkleRoot(self.trace_root));
        proof.push(ProofItem::MerkleRoot(self.composition_root));
        proof.push(ProofItem::FieldElementVector(
            self.ood_trace_current.iter().map(FieldElement::value).collect(),
        ));
        proof.push(ProofItem::FieldElementVector(
            self.ood_trace_next.iter().map(FieldElement::value).collect(),
        ));
        proof.push(ProofItem::FieldElement(self.ood_composition.value()));
        proof.push(ProofItem::FieldElement(self.pow_nonce));

        proof.push(ProofItem::Log2Height(self.fri_proof.layer_roots.len() as u32));
        for root in &self.fri_proof.layer_roots {
            proof.push(ProofItem::MerkleRoot(*root));
        }
        proof.push(ProofItem::FieldElementVector(
            self.fri_proof
                .final_polynomial_coefficients
                .iter()
                .map(FieldElement::value)
                .collect(),
        ));
        proof.push(ProofItem::FieldElementVector(
            self.fri_proof.query_indices.iter().map(|i| *i as u64).collect(),
        ));
        for decommitment in &self.fri_proof.query_decommitments {
            for layer in &decommitment.layers {
                proof.push(ProofItem::FieldElement(layer.value_x.value()));
                proof.push(ProofItem::AuthPath(layer.path_x.clone()));
                proof.push(ProofItem::FieldElement(layer.value_minus_x.value()));
                proof.push(ProofItem::AuthPath(layer.path_minus_x.clone()));
            }
        }

        for opening in &self.trace_query_openings {
            proof.push(ProofItem::FieldElementVector(
                opening.values.iter().map(FieldElement::value).collect(),
            ));
            proof.push(ProofItem::AuthPath(opening.path.clone()));
        }
        for opening in &self.composition_query_openings {
            proof.push(ProofItem::FieldElementVector(
                opening.values.iter().map(FieldElement::value).collect(),
            ));
            proof.push(ProofItem::AuthPath(opening.path.clone()));
        }

        proof
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_wire().to_bytes()
    }

    /// Rebuilds a proof from its wire form. `num_layers`, `num_queries`,
    /// `num_columns` describe the shape agreed on by `STARKParameters` and
    /// the `ConstraintSet` — the wire format itself carries no schema, so
    /// the reader must already know how many of each item to expect, save
    /// for the explicit `Log2Height` layer count.
    pub fn from_bytes(bytes: &[u8], num_queries: usize, num_columns: usize) -> StarkResult<Self> {
        let wire = Proof::from_bytes(bytes)?;
        let items = wire.items();
        let mut cursor = 0usize;

        let trace_root = expect_root(items, &mut cursor)?;
        let composition_root = expect_root(items, &mut cursor)?;
        let ood_trace_current = expect_vector(items, &mut cursor)?;
        let ood_trace_next = expect_vector(items, &mut cursor)?;
        let ood_composition = FieldElement::from_u64(expect_scalar(items, &mut cursor)?);
        let pow_nonce = expect_scalar(items, &mut cursor)?;

        let num_layers = match items.get(cursor) {
            Some(ProofItem::Log2Height(n)) => *n as usize,
            _ => {
                return Err(StarkError::ProofMalformed(
                    "expected a Log2Height item for the FRI layer count".to_string(),
                ))
            }
        };
        cursor += 1;

        let mut layer_roots = Vec::with_capacity(num_layers);
        for _ in 0..num_layers {
            layer_roots.push(expect_root(items, &mut cursor)?);
        }
        let final_polynomial_coefficients = expect_vector(items, &mut cursor)?;
        let query_indices: Vec<usize> = expect_vector_raw(items, &mut cursor)?
            .into_iter()
            .map(|v| v as usize)
            .collect();

        let mut query_decommitments = Vec::with_capacity(num_queries);
        for _ in 0..num_queries {
            let mut layers = Vec::with_capacity(num_layers);
            for _ in 0..num_layers {
                let value_x = FieldElement::from_u64(expect_scalar(items, &mut cursor)?);
                let path_x = expect_path(items, &mut cursor)?;
                let value_minus_x = FieldElement::from_u64(expect_scalar(items, &mut cursor)?);
                let path_minus_x = expect_path(items, &mut cursor)?;
                layers.push(crate::fri::FriLayerQueryOpening {
                    value_x,
                    path_x,
                    value_minus_x,
                    path_minus_x,
                });
            }
            query_decommitments.push(crate::fri::FriQueryDecommitment { layers });
        }

        let mut trace_query_openings = Vec::with_capacity(num_queries);
        for _ in 0..num_queries {
            let values = expect_vector(items, &mut cursor)?;
            if values.len() != num_columns {
                return Err(StarkError::ProofMalformed(
                    "trace query opening column count mismatch".to_string(),
                ));
            }
            let path = expect_path(items, &mut cursor)?;
            trace_query_openings.push(ColumnOpening { values, path });
        }

        let mut composition_query_openings = Vec::with_capacity(num_queries);
        for _ in 0..num_queries {
            let values = expect_vector(items, &mut cursor)?;
            let path = expect_path(items, &mut cursor)?;
            composition_query_openings.push(ColumnOpening { values, path });
        }

        Ok(Self {
            trace_root,
            composition_root,
            ood_trace_current,
            ood_trace_next,
            ood_composition,
            pow_nonce,
            fri_proof: FriProof {
                layer_roots,
                final_polynomial_coefficients,
                query_indices,
                query_decommitments,
            },
            trace_query_openings,
            composition_query_openings,
        })
    }
}

fn expect_root(items: &[ProofItem], cursor: &mut usize) -> StarkResult<Digest> {
    match items.get(*cursor) {
        Some(ProofItem::MerkleRoot(digest)) => {
            *cursor += 1;
            Ok(*digest)
        }
        _ => Err(StarkError::ProofMalformed(
            "expected a MerkleRoot item".to_string(),
        )),
    }
}

fn expect_scalar(items: &[ProofItem], cursor: &mut usize) -> StarkResult<u64> {
    match items.get(*cursor) {
        Some(ProofItem::FieldElement(value)) => {
            *cursor += 1;
            Ok(*value)
        }
        _ => Err(StarkError::ProofMalformed(
            "expected a FieldElement item".to_string(),
        )),
    }
}

fn expect_vector_raw(items: &[ProofItem], cursor: &mut usize) -> StarkResult<Vec<u64>> {
    match items.get(*cursor) {
        Some(ProofItem::FieldElementVector(values)) => {
            *cursor += 1;
            Ok(values.clone())
        }
        _ => Err(StarkError::ProofMalformed(
            "expected a FieldElementVector item".to_string(),
        )),
    }
}

fn expect_vector<F: PrimeField>(
    items: &[ProofItem],
    cursor: &mut usize,
) -> StarkResult<Vec<FieldElement<F>>> {
    Ok(expect_vector_raw(items, cursor)?
        .into_iter()
        .map(FieldElement::from_u64)
        .collect())
}

fn expect_path(items: &[ProofItem], cursor: &mut usize) -> StarkResult<AuthPath> {
    match items.get(*cursor) {
        Some(ProofItem::AuthPath(path)) => {
            *cursor += 1;
            Ok(path.clone())
        }
        _ => Err(StarkError::ProofMalformed(
            "expected an AuthPath item".to_string(),
        )),
    }
}
