//! The Fiat-Shamir transcript (component C4). Prover and verifier each
//! drive their own `Channel`; as long as both send the exact same bytes in
//! the exact same order, they derive the exact same sequence of challenges
//! without any interaction.

use crate::error::StarkResult;
use crate::field::{FieldElement, PrimeField};
use crate::hash::{self, Digest, DynSpongeHash, HashTag};

pub struct Channel {
    hasher: Box<dyn DynSpongeHash>,
    /// Every byte ever sent, in order — the prover serializes this directly
    /// into the proof; the verifier accumulates the same bytes as it
    /// re-derives challenges, purely so the two code paths stay identical.
    transcript: Vec<u8>,
}

impl Channel {
    pub fn new(tag: HashTag) -> Self {
        Self {
            hasher: hash::build(tag),
            transcript: Vec::new(),
        }
    }

    pub fn from_tag_str(tag: &str) -> StarkResult<Self> {
        Ok(Self::new(HashTag::parse(tag)?))
    }

    pub fn send_bytes(&mut self, bytes: &[u8]) {
        self.hasher.absorb(bytes);
        self.transcript.extend_from_slice(bytes);
    }

    pub fn send_digest(&mut self, digest: &Digest) {
        self.send_bytes(digest);
    }

    pub fn send_field_element<F: PrimeField>(&mut self, x: FieldElement<F>) {
        self.send_bytes(&x.to_bytes_be());
    }

    pub fn send_usize(&mut self, value: usize) {
        self.send_bytes(&(value as u64).to_be_bytes());
    }

    /// Squeezes a fresh field element. Reducing an 8-byte squeeze mod `p`
    /// over-represents the low residues very slightly (`p` is not a power
    /// of two); negligible at the security levels this engine targets.
    pub fn receive_random_field_element<F: PrimeField>(&mut self) -> FieldElement<F> {
        let bytes = self.hasher.squeeze(8);
        let value = u64::from_be_bytes(bytes.try_into().unwrap());
        FieldElement::from_u64(value)
    }

    /// Squeezes a random index in `[0, bound)`. `bound` must be nonzero.
    pub fn receive_random_usize(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        let bytes = self.hasher.squeeze(8);
        let value = u64::from_be_bytes(bytes.try_into().unwrap());
        (value % bound as u64) as usize
    }

    pub fn transcript(&self) -> &[u8] {
        &self.transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Goldilocks;

    type Fp = FieldElement<Goldilocks>;

    #[test]
    fn identical_send_sequences_derive_identical_challenges() {
        let mut prover = Channel::new(HashTag::Poseidon);
        let mut verifier = Channel::new(HashTag::Poseidon);

        prover.send_field_element(Fp::from_u64(42));
        verifier.send_field_element(Fp::from_u64(42));
        assert_eq!(
            prover.receive_random_field_element::<Goldilocks>(),
            verifier.receive_random_field_element::<Goldilocks>()
        );

        prover.send_usize(7);
        verifier.send_usize(7);
        assert_eq!(
            prover.receive_random_usize(1024),
            verifier.receive_random_usize(1024)
        );
    }

    #[test]
    fn diverging_send_sequences_derive_different_challenges() {
        let mut a = Channel::new(HashTag::Sha3);
        let mut b = Channel::new(HashTag::Sha3);
        a.send_usize(1);
        b.send_usize(2);
        assert_ne!(
            a.receive_random_field_element::<Goldilocks>(),
            b.receive_random_field_element::<Goldilocks>()
        );
    }

    #[test]
    fn unknown_tag_string_is_rejected() {
        assert!(Channel::from_tag_str("md5").is_err());
    }
}
