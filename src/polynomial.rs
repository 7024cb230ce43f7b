//! Dense univariate polynomials over a `PrimeField`.
//!
//! Coefficients are stored little-endian (the coefficient of `X^0` first).
//! The zero polynomial is represented by an empty coefficient vector; its
//! degree is reported as `None`.

use std::ops::{Add, Mul, Sub};

use crate::error::{StarkError, StarkResult};
use crate::field::{FieldElement, PrimeField};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial<F: PrimeField> {
    coefficients: Vec<FieldElement<F>>,
}

impl<F: PrimeField> Polynomial<F> {
    pub fn new(mut coefficients: Vec<FieldElement<F>>) -> Self {
        while coefficients.last().is_some_and(FieldElement::is_zero) {
            coefficients.pop();
        }
        Self { coefficients }
    }

    pub fn zero() -> Self {
        Self {
            coefficients: Vec::new(),
        }
    }

    pub fn new_monomial(coefficient: FieldElement<F>, degree: usize) -> Self {
        if coefficient.is_zero() {
            return Self::zero();
        }
        let mut coefficients = vec![FieldElement::zero(); degree + 1];
        coefficients[degree] = coefficient;
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[FieldElement<F>] {
        &self.coefficients
    }

    /// `None` for the zero polynomial, the usual `-infinity` convention.
    pub fn degree(&self) -> Option<usize> {
        if self.coefficients.is_empty() {
            None
        } else {
            Some(self.coefficients.len() - 1)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn evaluate(&self, x: &FieldElement<F>) -> FieldElement<F> {
        // Horner's method.
        self.coefficients
            .iter()
            .rev()
            .fold(FieldElement::zero(), |acc, c| acc * *x + *c)
    }

    /// Lagrange interpolation through `(xs[i], ys[i])`. `xs` must be
    /// pairwise distinct and the same length as `ys`.
    pub fn interpolate(xs: &[FieldElement<F>], ys: &[FieldElement<F>]) -> StarkResult<Self> {
        if xs.len() != ys.len() {
            return Err(StarkError::DomainMismatch(
                "interpolate: xs and ys must have equal length".to_string(),
            ));
        }
        if xs.is_empty() {
            return Ok(Self::zero());
        }

        let mut result = Self::zero();
        for i in 0..xs.len() {
            let mut numerator = Self::new(vec![FieldElement::one()]);
            let mut denominator = FieldElement::one();
            for j in 0..xs.len() {
                if i == j {
                    continue;
                }
                numerator = &numerator * &Self::new(vec![-xs[j], FieldElement::one()]);
                denominator = denominator * (xs[i] - xs[j]);
            }
            let scale = ys[i] * denominator.inv()?;
            let term = &numerator * &Self::new(vec![scale]);
            result = &result + &term;
        }
        Ok(result)
    }

    /// Exact polynomial division; errors with `FieldArithmetic` if `rhs`
    /// does not divide `self` evenly (a non-zero remainder).
    pub fn divide_exact(&self, rhs: &Self) -> StarkResult<Self> {
        if rhs.is_zero() {
            return Err(StarkError::FieldArithmetic(
                "division by the zero polynomial".to_string(),
            ));
        }
        let mut remainder = self.clone();
        let mut quotient = vec![FieldElement::zero(); 0];
        let rhs_degree = rhs.degree().unwrap();
        let rhs_lead_inv = rhs.coefficients[rhs_degree].inv()?;

        while let Some(rem_degree) = remainder.degree() {
            if rem_degree < rhs_degree {
                break;
            }
            let shift = rem_degree - rhs_degree;
            let coeff = remainder.coefficients[rem_degree] * rhs_lead_inv;
            if quotient.len() <= shift {
                quotient.resize(shift + 1, FieldElement::zero());
            }
            quotient[shift] = coeff;

            let term = Self::new_monomial(coeff, shift);
            remainder = &remainder - &(&term * rhs);
        }

        if !remainder.is_zero() {
            return Err(StarkError::FieldArithmetic(
                "divide_exact: non-zero remainder".to_string(),
            ));
        }
        Ok(Self::new(quotient))
    }
}

impl<F: PrimeField> Add for &Polynomial<F> {
    type Output = Polynomial<F>;
    fn add(self, rhs: Self) -> Polynomial<F> {
        let len = self.coefficients.len().max(rhs.coefficients.len());
        let mut out = vec![FieldElement::zero(); len];
        for (i, c) in self.coefficients.iter().enumerate() {
            out[i] = out[i] + *c;
        }
        for (i, c) in rhs.coefficients.iter().enumerate() {
            out[i] = out[i] + *c;
        }
        Polynomial::new(out)
    }
}

impl<F: PrimeField> Sub for &Polynomial<F> {
    type Output = Polynomial<F>;
    fn sub(self, rhs: Self) -> Polynomial<F> {
        let len = self.coefficients.len().max(rhs.coefficients.len());
        let mut out = vec![FieldElement::zero(); len];
        for (i, c) in self.coefficients.iter().enumerate() {
            out[i] = out[i] + *c;
        }
        for (i, c) in rhs.coefficients.iter().enumerate() {
            out[i] = out[i] - *c;
        }
        Polynomial::new(out)
    }
}

impl<F: PrimeField> Mul for &Polynomial<F> {
    type Output = Polynomial<F>;
    fn mul(self, rhs: Self) -> Polynomial<F> {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut out = vec![FieldElement::zero(); self.coefficients.len() + rhs.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in rhs.coefficients.iter().enumerate() {
                out[i + j] = out[i + j] + (*a * *b);
            }
        }
        Polynomial::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Goldilocks;

    type Fp = FieldElement<Goldilocks>;
    type Poly = Polynomial<Goldilocks>;

    #[test]
    fn evaluate_matches_direct_computation() {
        // 3 + 5x + 7x^2 + 11x^3
        let p = Poly::new(vec![
            Fp::from_u64(3),
            Fp::from_u64(5),
            Fp::from_u64(7),
            Fp::from_u64(11),
        ]);
        let x = Fp::from_u64(2);
        let expected = Fp::from_u64(3) + Fp::from_u64(5) * x + Fp::from_u64(7) * x.pow(2)
            + Fp::from_u64(11) * x.pow(3);
        assert_eq!(p.evaluate(&x), expected);
    }

    #[test]
    fn interpolate_recovers_original_polynomial() {
        let p = Poly::new(vec![Fp::from_u64(1), Fp::from_u64(2), Fp::from_u64(3)]);
        let xs: Vec<Fp> = (0..3).map(Fp::from_u64).collect();
        let ys: Vec<Fp> = xs.iter().map(|x| p.evaluate(x)).collect();
        let recovered = Poly::interpolate(&xs, &ys).unwrap();
        for x in &xs {
            assert_eq!(recovered.evaluate(x), p.evaluate(x));
        }
    }

    #[test]
    fn divide_exact_roundtrips_through_multiplication() {
        let a = Poly::new(vec![Fp::from_u64(1), Fp::from_u64(1)]); // 1 + x
        let b = Poly::new(vec![Fp::from_u64(2), Fp::from_u64(1)]); // 2 + x
        let product = &a * &b;
        let quotient = product.divide_exact(&b).unwrap();
        assert_eq!(quotient, a);
    }
}
