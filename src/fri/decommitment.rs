//! Wire-level FRI proof structures.
//!
//! A real sibling authentication path is attached to every opened value at
//! every layer — earlier lineages of this engine were known to ship a
//! placeholder Merkle root for one decommitment path under certain code
//! paths, silently waiving the check it was supposed to perform. There is
//! no shortcut here: `FriLayerQueryOpening` always carries both openings'
//! full `AuthPath`, and [`super::engine::verify`] always walks them.

use crate::field::{FieldElement, PrimeField};
use crate::hash::Digest;
use crate::merkle::AuthPath;

#[derive(Clone, Debug)]
pub struct FriLayerQueryOpening<F: PrimeField> {
    pub value_x: FieldElement<F>,
    pub path_x: AuthPath,
    pub value_minus_x: FieldElement<F>,
    pub path_minus_x: AuthPath,
}

#[derive(Clone, Debug)]
pub struct FriQueryDecommitment<F: PrimeField> {
    /// One opening per committed layer, outermost (largest domain) first.
    pub layers: Vec<FriLayerQueryOpening<F>>,
}

#[derive(Clone, Debug)]
pub struct FriProof<F: PrimeField> {
    pub layer_roots: Vec<Digest>,
    pub final_polynomial_coefficients: Vec<FieldElement<F>>,
    pub query_indices: Vec<usize>,
    pub query_decommitments: Vec<FriQueryDecommitment<F>>,
}
