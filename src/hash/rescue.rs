use crate::field::{FieldElement, Goldilocks, PrimeField};

use super::SpongeHash;

type Fp = FieldElement<Goldilocks>;

const WIDTH: usize = 4;
const RATE: usize = 3;
const ROUNDS: usize = 10;
const ALPHA: u64 = 7;

/// Rescue's distinguishing feature versus Poseidon is its S-box: every round
/// applies the *forward* power map to every lane, then the very next round
/// applies its *inverse* (`x -> x^(1/alpha)`), alternating forward/inverse
/// rather than Poseidon's full-round/partial-round split. Everything else
/// here — the `ark`/`mix` structure, the deterministic constant generation —
/// mirrors [`super::poseidon::PoseidonSponge`].
#[derive(Clone)]
pub struct RescueSponge {
    state: [Fp; WIDTH],
    buffer: Vec<u8>,
}

impl Default for RescueSponge {
    fn default() -> Self {
        Self {
            state: [Fp::zero(); WIDTH],
            buffer: Vec::new(),
        }
    }
}

impl RescueSponge {
    fn absorb_block(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), RATE * 8);
        for i in 0..RATE {
            let lane = u64::from_be_bytes(block[i * 8..i * 8 + 8].try_into().unwrap());
            self.state[i] = self.state[i] + Fp::from_u64(lane);
        }
        permute(&mut self.state);
    }
}

impl SpongeHash for RescueSponge {
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
    let alpha_inv = alpha_inverse();
    for round in 0..ROUNDS {
        ark(state, round);
        if round % 2 == 0 {
            for lane in state.iter_mut() {
                *lane = lane.pow(ALPHA);
            }
        } else {
            for lane in state.iter_mut() {
                *lane = lane.pow(alpha_inv);
            }
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
    Fp::from_u64(splitmix64(0x5245534355_45 ^ ((round as u64) << 8) ^ lane as u64))
}

fn mds_matrix() -> [[Fp; WIDTH]; WIDTH] {
    let mut matrix = [[Fp::zero(); WIDTH]; WIDTH];
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = Fp::from_u64(splitmix64(0x5245534d4453 ^ ((i as u64) << 16) ^ j as u64));
        }
    }
    matrix
}

/// `alpha`'s inverse exponent modulo `p - 1`, computed once per permutation
/// via the extended Euclidean algorithm rather than hardcoded, since it
/// depends only on `ALPHA` and the field's multiplicative group order.
fn alpha_inverse() -> u64 {
    let modulus_minus_one = (Goldilocks::MODULUS - 1) as i128;
    mod_inverse(ALPHA as i128, modulus_minus_one) as u64
}

fn mod_inverse(a: i128, m: i128) -> i128 {
    let (mut old_r, mut r) = (a, m);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let quotient = old_r / r;
        let (new_r, new_s) = (old_r - quotient * r, old_s - quotient * s);
        old_r = r;
        r = new_r;
        old_s = s;
        s = new_s;
    }
    ((old_s % m) + m) % m
}

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
    fn differs_from_poseidon_on_same_input() {
        use super::super::PoseidonSponge;
        let a = RescueSponge::hash_leaf(b"same lanes, different permutation");
        let b = PoseidonSponge::hash_leaf(b"same lanes, different permutation");
        assert_ne!(a, b);
    }

    #[test]
    fn alpha_and_its_inverse_round_trip() {
        let x = Fp::from_u64(123456789);
        let forward = x.pow(ALPHA);
        let back = forward.pow(alpha_inverse());
        assert_eq!(back, x);
    }
}
