//! FRI: the Fast Reed-Solomon IOP of Proximity (component C6), the
//! engine's core low-degree test. See [`fold`] for the per-layer fold
//! formula, [`engine`] for commit/query/verify orchestration, and
//! [`security`] for the soundness-bit estimate used to pick
//! `fri_number_of_queries`.

pub mod decommitment;
pub mod engine;
pub mod fold;
pub mod security;

pub use decommitment::{FriLayerQueryOpening, FriProof, FriQueryDecommitment};
pub use engine::{
    commit_phase, query_phase, verify, verify_commit_phase, verify_queries, FriCommitment,
    FriCommitmentReplay,
};
pub use fold::fold_layer;
pub use security::security_level;
