//! Error taxonomy for the proving engine.
//!
//! Every kind below is distinct on purpose: the prover and verifier never
//! collapse a cryptographic failure into a generic "something went wrong".
//! Propagation is always via `Result`; nothing here is thrown and caught.

use thiserror::Error;

/// Errors raised while validating configuration or running the prover.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StarkError {
    /// A `STARKParameters` value failed validation. Always fatal, always at
    /// construction time, never mid-proof.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Division or inversion of the zero element, including a zero entry
    /// reaching `batch_inversion`.
    #[error("field arithmetic error: {0}")]
    FieldArithmetic(String),

    /// Two objects that should share a domain length disagree (e.g. a
    /// codeword vs. the FRI domain it is supposed to live on).
    #[error("domain mismatch: {0}")]
    DomainMismatch(String),

    /// The verifier's channel diverged from the proof's item stream.
    #[error("transcript desynchronized: {0}")]
    TranscriptDesync(String),

    /// A Merkle authentication path did not recompute the committed root.
    #[error("merkle authentication failed at index {index}")]
    MerkleAuthFail { index: usize },

    /// The FRI fold identity or final polynomial check failed.
    #[error("FRI rejected: {0}")]
    FriReject(String),

    /// A lookup membership path failed to verify.
    #[error("lookup rejected: {0}")]
    LookupReject(String),

    /// The proof's wire format could not be parsed.
    #[error("proof malformed: {0}")]
    ProofMalformed(String),

    /// A secure source of randomness was unavailable.
    #[error("randomness unavailable: {0}")]
    RandomnessFailure(String),
}

pub type StarkResult<T> = Result<T, StarkError>;
