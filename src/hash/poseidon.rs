use crate::field::{FieldElement, Goldilocks, PrimeField};

use super::SpongeHash;

type Fp = FieldElement<Goldilocks>;

const WIDTH: usize = 4;
const RATE: usize = 3;
const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 22;
const ALPHA: u64 = 7;

/// A Goldilocks-lane Poseidon permutation, structured the way
/// `lambda_elliptic_curves`'s `crypto::hash::poseidon` does it: round
/// constants are added (`ark`), an S-box is applied (full rounds hit every
/// lane, partial rounds hit only the first), and an MDS matrix mixes the
/// state (`mix`), repeated for `FULL_ROUNDS + PARTIAL_ROUNDS` rounds.
///
/// The round constants and MDS matrix here are generated deterministically
/// from a fixed seed rather than drawn from a published Poseidon instance —
/// there is no canonical Goldilocks Poseidon parameter set in this engine's
/// lineage, so this is a from-scratch instantiation, not a standardized one.
#[derive(Clone)]
pub struct PoseidonSponge {
    state: [Fp; WIDTH],
    buffer: Vec<u8>,
}

impl Default for PoseidonSponge {
    fn default() -> Self {
        Self {
            state: [Fp::zero(); WIDTH],
            buffer: Vec::new(),
        }
    }
}

impl PoseidonSponge {
    fn absorb_block(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), RATE * 8);
        for i in 0..RATE {
            let lane = u64::from_be_bytes(block[i * 8..i * 8 + 8].try_into().unwrap());
            self.state[i] = self.state[i] + Fp::from_u64(lane);
        }
        permute(&mut self.state);
    }
}

impl SpongeHash for PoseidonSponge {
    fn absorb(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        while self.buffer.len() >= RATE * 8 {
            let block: Vec<u8> = self.buffer.drain(0..RATE * 8).collect();
            self.absorb_block(&block);
        }
    }

    fn squeeze(&mut self, n: usize) -> Vec<u8> {
        if !self.buffer.is_empty() {
            let mut padded = std::mem::take(&mut self.buffer);
            padded.resize(RATE * 8, 0);
            self.absorb_block(&padded);
        }

        let mut out = Vec::with_capacity(n);
        loop {
            for lane in &self.state[0..RATE] {
                if out.len() >= n {
                    break;
                }
                out.extend_from_slice(&lane.to_bytes_be());
            }
            if out.len() >= n {
                break;
            }
            permute(&mut self.state);
        }
        out.truncate(n);
        out
    }
}

fn permute(state: &mut [Fp; WIDTH]) {
    let total_rounds = FULL_ROUNDS + PARTIAL_ROUNDS;
    let half_full = FULL_ROUNDS / 2;
    for round in 0..total_rounds {
        ark(state, round);
        if round < half_full || round >= half_full + PARTIAL_ROUNDS {
            for lane in state.iter_mut() {
                *lane = lane.pow(ALPHA);
            }
        } else {
            state[0] = state[0].pow(ALPHA);
        }
        mix(state);
    }
}

fn ark(state: &mut [Fp; WIDTH], round: usize) {
    for (i, lane) in state.iter_mut().enumerate() {
        *lane = *lane + round_constant(round, i);
    }
}

fn mix(state: &mut [Fp; WIDTH]) {
    let mds = mds_matrix();
    let mut next = [Fp::zero(); WIDTH];
    for (i, row) in mds.iter().enumerate() {
        next[i] = row
            .iter()
            .zip(state.iter())
            .fold(Fp::zero(), |acc, (m, s)| acc + *m * *s);
    }
    *state = next;
}

fn round_constant(round: usize, lane: usize) -> Fp {
    Fp::from_u64(splitmix64(0x504f5345_49444f4e ^ ((round as u64) << 8) ^ lane as u64))
}

fn mds_matrix() -> [[Fp; WIDTH]; WIDTH] {
    let mut matrix = [[Fp::zero(); WIDTH]; WIDTH];
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = Fp::from_u64(splitmix64(0x4d4453_4d4154 ^ ((i as u64) << 16) ^ j as u64));
        }
    }
    matrix
}

/// Nothing-up-my-sleeve constant generator: deterministic, reproducible,
/// and good enough diffusion to decorrelate the round constants/MDS entries
/// from each other without pulling in a PRNG crate just for this.
fn splitmix64(mut seed: u64) -> u64 {
    seed = seed.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = seed;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differs_from_byte_oriented_backends() {
        use super::super::Sha3Sponge;
        let a = PoseidonSponge::hash_leaf(b"field-native input");
        let b = Sha3Sponge::hash_leaf(b"field-native input");
        assert_ne!(a, b);
    }

    #[test]
    fn absorbing_more_than_one_block_changes_the_digest() {
        let short = PoseidonSponge::hash_leaf(b"short");
        let long = PoseidonSponge::hash_leaf(b"a message long enough to span more than one rate-sized block of absorption");
        assert_ne!(short, long);
    }

    #[test]
    fn squeeze_past_one_block_keeps_permuting() {
        let mut sponge = PoseidonSponge::default();
        sponge.absorb(b"seed");
        let out = sponge.squeeze(64);
        assert_ne!(&out[0..24], &out[24..48]);
    }
}
