//! Binary Merkle commitments over a pluggable [`SpongeHash`] backend
//! (component C3). Built once per committed vector and never mutated
//! afterward — the tree only ever answers authentication-path queries.

use crate::error::{StarkError, StarkResult};
use crate::hash::{Digest, DynSpongeHash, ZERO_DIGEST};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One step of an authentication path: the sibling digest, and whether that
/// sibling sits to the left of the node being proven (so the verifier knows
/// which order to feed the pair into `hash_node`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthStep {
    pub sibling: Digest,
    pub sibling_is_left: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthPath {
    pub steps: Vec<AuthStep>,
}

#[derive(Clone)]
pub struct MerkleTree {
    /// `layers[0]` holds the (padded) leaf digests, `layers.last()` the root.
    layers: Vec<Vec<Digest>>,
    /// Number of real leaves before sentinel padding, needed to reject
    /// out-of-range queries.
    num_leaves: usize,
}

impl MerkleTree {
    /// Hashes every entry of `leaf_data` with `hasher.hash_leaf_dyn`, pads
    /// the result up to the next power of two with [`ZERO_DIGEST`] sentinel
    /// leaves, and builds every level up to the root.
    pub fn build(leaf_data: &[Vec<u8>], hasher: &dyn DynSpongeHash) -> StarkResult<Self> {
        if leaf_data.is_empty() {
            return Err(StarkError::InvalidParameters(
                "MerkleTree::build called with no leaves".to_string(),
            ));
        }

        let mut leaves: Vec<Digest> = leaf_data
            .iter()
            .map(|bytes| hasher.hash_leaf_dyn(bytes))
            .collect();
        let padded_len = leaves.len().next_power_of_two();
        leaves.resize(padded_len, ZERO_DIGEST);

        let mut layers = vec![leaves];
        while layers.last().unwrap().len() > 1 {
            let prev = layers.last().unwrap();
            let next = hash_layer(prev, hasher);
            layers.push(next);
        }

        Ok(Self {
            layers,
            num_leaves: leaf_data.len(),
        })
    }

    pub fn root(&self) -> Digest {
        *self.layers.last().unwrap().first().unwrap()
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// The authentication path from leaf `index` up to (but not including)
    /// the root.
    pub fn authentication_path(&self, index: usize) -> StarkResult<AuthPath> {
        if index >= self.num_leaves {
            return Err(StarkError::ProofMalformed(format!(
                "authentication path requested for out-of-range leaf {index}"
            )));
        }
        let mut steps = Vec::with_capacity(self.layers.len() - 1);
        let mut idx = index;
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_idx = idx ^ 1;
            steps.push(AuthStep {
                sibling: layer[sibling_idx],
                sibling_is_left: sibling_idx < idx,
            });
            idx /= 2;
        }
        Ok(AuthPath { steps })
    }

    /// Verifies that `leaf_digest` at `index` authenticates to `root` under
    /// `path`, without needing the tree itself — this is what the verifier
    /// runs against the value it recomputed independently.
    ///
    /// Orientation at each level is derived from `index`'s bits, never from
    /// `AuthStep::sibling_is_left` — a path is proof of membership *at
    /// `index`* only if the verifier supplies that binding itself, rather
    /// than trusting whatever side the prover claims the sibling sits on.
    pub fn verify(
        root: Digest,
        index: usize,
        leaf_digest: Digest,
        path: &AuthPath,
        hasher: &dyn DynSpongeHash,
    ) -> StarkResult<()> {
        let mut current = leaf_digest;
        let mut idx = index;
        for step in &path.steps {
            current = if idx % 2 == 0 {
                hasher.hash_node_dyn(&current, &step.sibling)
            } else {
                hasher.hash_node_dyn(&step.sibling, &current)
            };
            idx /= 2;
        }
        if current == root {
            Ok(())
        } else {
            Err(StarkError::MerkleAuthFail { index })
        }
    }
}

fn hash_layer(prev: &[Digest], hasher: &dyn DynSpongeHash) -> Vec<Digest> {
    #[cfg(feature = "parallel")]
    {
        prev.par_chunks(2)
            .map(|pair| hasher.hash_node_dyn(&pair[0], &pair[1]))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        prev.chunks(2)
            .map(|pair| hasher.hash_node_dyn(&pair[0], &pair[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{build, HashTag};

    fn sample_leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| i.to_be_bytes().to_vec()).collect()
    }

    #[test]
    fn authentication_path_verifies_for_every_leaf() {
        let hasher = build(HashTag::Sha3);
        let leaves = sample_leaves(5); // exercises sentinel padding up to 8
        let tree = MerkleTree::build(&leaves, hasher.as_ref()).unwrap();
        let root = tree.root();
        for (i, leaf) in leaves.iter().enumerate() {
            let digest = hasher.hash_leaf_dyn(leaf);
            let path = tree.authentication_path(i).unwrap();
            MerkleTree::verify(root, i, digest, &path, hasher.as_ref()).unwrap();
        }
    }

    #[test]
    fn tampered_leaf_is_rejected() {
        let hasher = build(HashTag::Poseidon);
        let leaves = sample_leaves(4);
        let tree = MerkleTree::build(&leaves, hasher.as_ref()).unwrap();
        let root = tree.root();
        let path = tree.authentication_path(2).unwrap();
        let wrong_digest = hasher.hash_leaf_dyn(b"not the real leaf");
        let result = MerkleTree::verify(root, 2, wrong_digest, &path, hasher.as_ref());
        assert!(matches!(result, Err(StarkError::MerkleAuthFail { index: 2 })));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let hasher = build(HashTag::Sha256);
        let leaves = sample_leaves(3);
        let tree = MerkleTree::build(&leaves, hasher.as_ref()).unwrap();
        assert!(tree.authentication_path(10).is_err());
    }
}
