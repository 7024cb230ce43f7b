//! `ArithmeticDomain` — power-of-two multiplicative cosets, and the NTT
//! that evaluates/interpolates polynomials over them (component C2).

use crate::channel::Channel;
use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};
use crate::polynomial::Polynomial;

/// A coset `{offset * generator^i : 0 <= i < length}` of a power-of-two
/// multiplicative subgroup. Immutable once built.
#[derive(Clone, Debug)]
pub struct ArithmeticDomain<F: PrimeField> {
    offset: FieldElement<F>,
    generator: FieldElement<F>,
    length: usize,
}

impl<F: PrimeField> ArithmeticDomain<F> {
    pub fn new(offset: FieldElement<F>, length: usize) -> StarkResult<Self> {
        if length == 0 || (length & (length - 1)) != 0 {
            return Err(StarkError::InvalidParameters(format!(
                "domain length {length} is not a power of two"
            )));
        }
        let generator = FieldElement::primitive_root_of_unity(length as u64)?;
        Ok(Self {
            offset,
            generator,
            length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn offset(&self) -> FieldElement<F> {
        self.offset
    }

    pub fn generator(&self) -> FieldElement<F> {
        self.generator
    }

    pub fn elements(&self) -> Vec<FieldElement<F>> {
        let mut out = Vec::with_capacity(self.length);
        let mut current = self.offset;
        for _ in 0..self.length {
            out.push(current);
            current = current * self.generator;
        }
        out
    }

    /// Squared-generator, half-length domain used by every FRI fold round.
    pub fn halve(&self) -> StarkResult<Self> {
        if self.length < 2 {
            return Err(StarkError::DomainMismatch(
                "cannot halve a domain of length < 2".to_string(),
            ));
        }
        Ok(Self {
            offset: self.offset.square(),
            generator: self.generator.square(),
            length: self.length / 2,
        })
    }

    /// Evaluates `poly` at every point of the domain via a coset NTT.
    /// `poly` may have fewer coefficients than `length`; it is implicitly
    /// zero-padded.
    pub fn evaluate(&self, poly: &Polynomial<F>) -> StarkResult<Vec<FieldElement<F>>> {
        if poly.coefficients().len() > self.length {
            return Err(StarkError::DomainMismatch(format!(
                "polynomial of degree {} does not fit in a domain of length {}",
                poly.coefficients().len() - 1,
                self.length
            )));
        }

        let mut scaled = vec![FieldElement::zero(); self.length];
        let mut offset_power = FieldElement::one();
        for (i, c) in poly.coefficients().iter().enumerate() {
            scaled[i] = *c * offset_power;
            offset_power = offset_power * self.offset;
        }

        ntt_in_place(&mut scaled, self.generator);
        Ok(scaled)
    }

    /// Inverse of `evaluate`: recovers the unique polynomial of degree
    /// `< length` matching the given evaluations over this domain.
    pub fn interpolate(&self, evaluations: &[FieldElement<F>]) -> StarkResult<Polynomial<F>> {
        if evaluations.len() != self.length {
            return Err(StarkError::DomainMismatch(format!(
                "expected {} evaluations, got {}",
                self.length,
                evaluations.len()
            )));
        }

        let mut scaled = evaluations.to_vec();
        let inv_generator = self.generator.inv()?;
        ntt_in_place(&mut scaled, inv_generator);

        let length_inv = FieldElement::<F>::from_u64(self.length as u64).inv()?;
        let offset_inv = self.offset.inv()?;
        let mut offset_power = FieldElement::one();
        for c in scaled.iter_mut() {
            *c = *c * length_inv * offset_power;
            offset_power = offset_power * offset_inv;
        }
        Ok(Polynomial::new(scaled))
    }
}

/// Draws the out-of-domain point the prover and verifier tie trace
/// evaluations to algebraically: squeezed from the same channel both
/// sides share, rejected and resampled on the vanishingly unlikely chance
/// it lands on a trace-domain point (where the DEEP divisor `X - z` would
/// coincide with a trace-domain factor of the transition zerofier).
pub fn sample_ood_point<F: PrimeField>(
    channel: &mut Channel,
    trace_domain: &ArithmeticDomain<F>,
) -> FieldElement<F> {
    let trace_points = trace_domain.elements();
    loop {
        let candidate = channel.receive_random_field_element::<F>();
        if !trace_points.contains(&candidate) {
            return candidate;
        }
    }
}

/// Iterative Cooley-Tukey NTT, decimation-in-time, in place. `values.len()`
/// must be a power of two and `root` must have that exact multiplicative
/// order. Deterministic and size-invariant: no architecture-specific
/// vectorization, just the textbook butterfly network.
fn ntt_in_place<F: PrimeField>(values: &mut [FieldElement<F>], root: FieldElement<F>) {
    let n = values.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two());

    bit_reverse_permute(values);

    let mut twiddles_cache: Vec<FieldElement<F>> = Vec::new();
    let mut len = 2;
    while len <= n {
        let step_root = root.pow((n / len) as u64);
        twiddles_cache.clear();
        twiddles_cache.reserve(len / 2);
        let mut twiddle = FieldElement::one();
        for _ in 0..(len / 2) {
            twiddles_cache.push(twiddle);
            twiddle = twiddle * step_root;
        }

        for chunk_start in (0..n).step_by(len) {
            for i in 0..(len / 2) {
                let even = values[chunk_start + i];
                let odd = values[chunk_start + i + len / 2] * twiddles_cache[i];
                values[chunk_start + i] = even + odd;
                values[chunk_start + i + len / 2] = even - odd;
            }
        }
        len *= 2;
    }
}

fn bit_reverse_permute<T>(values: &mut [T]) {
    let n = values.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = (i as u32).reverse_bits() >> (u32::BITS - bits);
        let j = j as usize;
        if i < j {
            values.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Goldilocks;

    type Fp = FieldElement<Goldilocks>;
    type Poly = Polynomial<Goldilocks>;

    #[test]
    fn evaluate_then_interpolate_roundtrips() {
        let domain = ArithmeticDomain::<Goldilocks>::new(Fp::one(), 8).unwrap();
        let poly = Poly::new((0..8).map(Fp::from_u64).collect());
        let evals = domain.evaluate(&poly).unwrap();
        let recovered = domain.interpolate(&evals).unwrap();
        assert_eq!(recovered, poly);
    }

    #[test]
    fn coset_evaluation_matches_direct_evaluation() {
        let offset = Fp::from_u64(3);
        let domain = ArithmeticDomain::<Goldilocks>::new(offset, 4).unwrap();
        let poly = Poly::new(vec![Fp::from_u64(3), Fp::from_u64(5), Fp::from_u64(7), Fp::from_u64(11)]);
        let evals = domain.evaluate(&poly).unwrap();
        for (x, y) in domain.elements().iter().zip(evals.iter()) {
            assert_eq!(poly.evaluate(x), *y);
        }
    }

    #[test]
    fn halve_squares_generator_and_offset() {
        let domain = ArithmeticDomain::<Goldilocks>::new(Fp::from_u64(3), 8).unwrap();
        let halved = domain.halve().unwrap();
        assert_eq!(halved.length(), 4);
        assert_eq!(halved.generator(), domain.generator().square());
        assert_eq!(halved.offset(), domain.offset().square());
    }
}
