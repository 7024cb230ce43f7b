//! A STARK proving engine: finite-field arithmetic and low-degree
//! extension over power-of-two cosets, Merkle commitment, a Fiat-Shamir
//! transcript abstracted over a pluggable sponge hash, Plookup-style
//! membership arguments, and a FRI low-degree test tying it all together
//! behind [`prover::Prover`] and [`verifier::Verifier`].
//!
//! External callers implement [`air::TraceSource`] and [`air::ConstraintSet`]
//! for the computation they want to prove — see [`demo::fibonacci`] for a
//! complete worked example — and hand both to `Prover::prove` /
//! `Verifier::verify`. Everything below that boundary (domain arithmetic,
//! commitment, the transcript, FRI) is this crate's concern, not the
//! caller's.

pub mod air;
pub mod channel;
pub mod config;
pub mod demo;
pub mod domain;
pub mod error;
pub mod field;
pub mod fri;
pub mod grinding;
pub mod hash;
pub mod lookup;
pub mod merkle;
pub mod polynomial;
pub mod proof;
pub mod prover;
pub mod verifier;

pub use config::STARKParameters;
pub use error::{StarkError, StarkResult};
pub use field::{FieldElement, Goldilocks, PrimeField};
pub use prover::Prover;
pub use verifier::Verifier;
