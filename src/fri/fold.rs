//! The FRI fold step (the TR17-134 formula): given evaluations of `f` over
//! a size-`n` coset domain `D`, produces evaluations of a degree-halved
//! `f'` over the size-`n/2` domain `D^2 = {x^2 : x in D}`.
//!
//! `D`'s points pair up as `(x, -x)` at indices `(i, i + n/2)` because the
//! domain generator's `n/2`-th power has order 2, i.e. equals `-1`. Given
//! that pairing,
//!
//! ```text
//! f'(x^2) = (f(x) + f(-x)) / 2  +  alpha * (f(x) - f(-x)) / (2x)
//! ```
//!
//! recovers the even/odd-coefficient split of `f` and combines it with the
//! verifier-chosen `alpha`.

use crate::domain::ArithmeticDomain;
use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Folds one FRI layer. `num_workers` bounds how finely the fold is sharded
/// across threads when the `parallel` feature is enabled; `0` lets rayon's
/// global pool pick its own granularity. Passed explicitly rather than
/// drawn from a global, so two callers in the same process can use
/// different sharding without racing each other's configuration.
pub fn fold_layer<F: PrimeField>(
    evaluations: &[FieldElement<F>],
    domain: &ArithmeticDomain<F>,
    alpha: FieldElement<F>,
    num_workers: usize,
) -> StarkResult<Vec<FieldElement<F>>> {
    let n = evaluations.len();
    if n != domain.length() {
        return Err(StarkError::DomainMismatch(format!(
            "fold_layer: {n} evaluations does not match domain length {}",
            domain.length()
        )));
    }
    if n < 2 || n % 2 != 0 {
        return Err(StarkError::DomainMismatch(
            "fold_layer: domain length must be even and at least 2".to_string(),
        ));
    }

    let half = n / 2;
    let elements = domain.elements();
    let two_inv = FieldElement::<F>::from_u64(2).inv()?;

    let two_x: Vec<FieldElement<F>> = elements[..half]
        .iter()
        .map(|x| *x * FieldElement::from_u64(2))
        .collect();
    let two_x_inv = FieldElement::batch_inversion(&two_x)?;

    let compute = |i: usize| {
        let f_x = evaluations[i];
        let f_minus_x = evaluations[i + half];
        let even_part = (f_x + f_minus_x) * two_inv;
        let odd_part = (f_x - f_minus_x) * two_x_inv[i];
        even_part + alpha * odd_part
    };

    #[cfg(feature = "parallel")]
    {
        let min_len = if num_workers == 0 {
            1
        } else {
            half.div_ceil(num_workers).max(1)
        };
        Ok((0..half)
            .into_par_iter()
            .with_min_len(min_len)
            .map(compute)
            .collect())
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = num_workers;
        Ok((0..half).map(compute).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Goldilocks;
    use crate::polynomial::Polynomial;

    type Fp = FieldElement<Goldilocks>;

    #[test]
    fn folding_a_constant_polynomial_preserves_it() {
        let domain = ArithmeticDomain::<Goldilocks>::new(Fp::one(), 8).unwrap();
        let poly = Polynomial::new(vec![Fp::from_u64(5)]);
        let evals = domain.evaluate(&poly).unwrap();
        let folded = fold_layer(&evals, &domain, Fp::from_u64(99), 1).unwrap();
        let half_domain = domain.halve().unwrap();
        for e in half_domain.elements().iter().zip(folded.iter()) {
            assert_eq!(*e.1, Fp::from_u64(5));
        }
    }

    #[test]
    fn folding_matches_even_odd_decomposition() {
        // f(x) = 1 + 2x + 3x^2 + 4x^3: even part 1 + 3x^2, odd part 2x + 4x^3.
        let domain = ArithmeticDomain::<Goldilocks>::new(Fp::from_u64(3), 8).unwrap();
        let poly = Polynomial::new(vec![
            Fp::from_u64(1),
            Fp::from_u64(2),
            Fp::from_u64(3),
            Fp::from_u64(4),
        ]);
        let evals = domain.evaluate(&poly).unwrap();
        let alpha = Fp::from_u64(11);
        let folded = fold_layer(&evals, &domain, alpha, 2).unwrap();

        // g(y) = (even coeffs) + alpha * (odd coeffs), evaluated at y = x^2.
        let expected_poly = Polynomial::new(vec![
            Fp::from_u64(1) + alpha * Fp::from_u64(2),
            Fp::from_u64(3) + alpha * Fp::from_u64(4),
        ]);
        let half_domain = domain.halve().unwrap();
        for (y, folded_value) in half_domain.elements().iter().zip(folded.iter()) {
            assert_eq!(expected_poly.evaluate(y), *folded_value);
        }
    }

    #[test]
    fn rejects_mismatched_domain_length() {
        let domain = ArithmeticDomain::<Goldilocks>::new(Fp::one(), 8).unwrap();
        let evals = vec![Fp::zero(); 4];
        assert!(fold_layer(&evals, &domain, Fp::one(), 1).is_err());
    }
}
