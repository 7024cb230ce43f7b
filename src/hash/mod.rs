//! `SpongeHash` — the hash-primitive boundary the protocol logic is
//! abstracted behind. The protocol only ever calls `absorb`,
//! `squeeze`, `hash_leaf`, `hash_node`; which concrete permutation backs
//! them is a configuration choice (the `HashTag`), never baked into the
//! `Channel` or `MerkleTree` code.

mod poseidon;
mod rescue;
mod sha256;
mod sha3;

use crate::error::{StarkError, StarkResult};

/// A 32-byte digest, used uniformly as the Merkle leaf/node output size
/// regardless of which backend produced it.
pub type Digest = [u8; 32];

pub const ZERO_DIGEST: Digest = [0u8; 32];

/// Selects a concrete hash backend. Unknown tags are a fatal configuration
/// error at construction, never a silent fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashTag {
    Sha256,
    Sha3,
    Poseidon,
    Rescue,
}

impl HashTag {
    pub fn parse(tag: &str) -> StarkResult<Self> {
        match tag {
            "sha256" => Ok(Self::Sha256),
            "sha3" => Ok(Self::Sha3),
            "poseidon" => Ok(Self::Poseidon),
            "rescue" => Ok(Self::Rescue),
            other => Err(StarkError::InvalidParameters(format!(
                "unrecognized hash tag '{other}'"
            ))),
        }
    }
}

/// A duplex sponge: bytes go in via `absorb`, bytes come out via `squeeze`,
/// and `hash_leaf`/`hash_node` are the two fixed-arity hashes the Merkle
/// tree needs. The default implementations of the latter two run a fresh
/// sponge instance through absorb-then-squeeze, so a concrete backend only
/// has to supply the permutation driving `absorb`/`squeeze`.
pub trait SpongeHash: Clone + Send + Sync + Default {
    fn absorb(&mut self, bytes: &[u8]);
    fn squeeze(&mut self, n: usize) -> Vec<u8>;

    fn hash_leaf(bytes: &[u8]) -> Digest
    where
        Self: Sized,
    {
        let mut sponge = Self::default();
        sponge.absorb(bytes);
        digest_from_vec(sponge.squeeze(32))
    }

    fn hash_node(left: &Digest, right: &Digest) -> Digest
    where
        Self: Sized,
    {
        let mut sponge = Self::default();
        sponge.absorb(left);
        sponge.absorb(right);
        digest_from_vec(sponge.squeeze(32))
    }
}

fn digest_from_vec(bytes: Vec<u8>) -> Digest {
    let mut digest = ZERO_DIGEST;
    let len = bytes.len().min(32);
    digest[..len].copy_from_slice(&bytes[..len]);
    digest
}

pub use poseidon::PoseidonSponge;
pub use rescue::RescueSponge;
pub use sha256::Sha256Sponge;
pub use sha3::Sha3Sponge;

/// A dynamically dispatched sponge, used by `Channel` and `MerkleTree` so
/// the hash backend is a runtime choice (the `HashTag`) rather than a type
/// parameter threaded through the whole proving pipeline.
pub trait DynSpongeHash: Send + Sync {
    fn absorb(&mut self, bytes: &[u8]);
    fn squeeze(&mut self, n: usize) -> Vec<u8>;
    fn clone_box(&self) -> Box<dyn DynSpongeHash>;
    fn hash_leaf_dyn(&self, bytes: &[u8]) -> Digest;
    fn hash_node_dyn(&self, left: &Digest, right: &Digest) -> Digest;
}

impl<T: SpongeHash + 'static> DynSpongeHash for T {
    fn absorb(&mut self, bytes: &[u8]) {
        SpongeHash::absorb(self, bytes)
    }
    fn squeeze(&mut self, n: usize) -> Vec<u8> {
        SpongeHash::squeeze(self, n)
    }
    fn clone_box(&self) -> Box<dyn DynSpongeHash> {
        Box::new(self.clone())
    }
    fn hash_leaf_dyn(&self, bytes: &[u8]) -> Digest {
        T::hash_leaf(bytes)
    }
    fn hash_node_dyn(&self, left: &Digest, right: &Digest) -> Digest {
        T::hash_node(left, right)
    }
}

impl Clone for Box<dyn DynSpongeHash> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub fn build(tag: HashTag) -> Box<dyn DynSpongeHash> {
    match tag {
        HashTag::Sha256 => Box::<Sha256Sponge>::default(),
        HashTag::Sha3 => Box::<Sha3Sponge>::default(),
        HashTag::Poseidon => Box::<PoseidonSponge>::default(),
        HashTag::Rescue => Box::<RescueSponge>::default(),
    }
}
