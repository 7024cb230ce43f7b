//! Prime-field arithmetic (component C1).
//!
//! The source this engine grew from carried two parallel field
//! implementations — a generic multi-prime field and a Goldilocks-tuned
//! one — with conversion helpers wherever they met a Merkle or FRI
//! boundary. That split is collapsed here into a single `FieldElement<F>`
//! parameterized by the `PrimeField` trait, with `Goldilocks` as the one
//! shipped specialization. Any prime with enough two-adicity to host the
//! FRI domain can implement `PrimeField`; nothing downstream cares which.

mod goldilocks;

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub use goldilocks::Goldilocks;

use crate::error::{StarkError, StarkResult};

/// A prime `p` suitable as the ground field of the proving engine.
///
/// `GENERATOR` must generate the full multiplicative group `(Z/pZ)^*`, and
/// `MODULUS - 1` must be divisible by `2^TWO_ADICITY`, i.e. `p` supports
/// power-of-two subgroups up to that size — the FRI domain and every
/// arithmetic domain derived from it live inside this subgroup.
pub trait PrimeField: Copy + Clone + Eq + fmt::Debug + Send + Sync + 'static {
    const MODULUS: u64;
    const GENERATOR: u64;
    const TWO_ADICITY: u32;
}

/// A residue in `Z/pZ`, always held in canonical form (`0 <= value < MODULUS`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement<F: PrimeField> {
    value: u64,
    _field: std::marker::PhantomData<F>,
}

impl<F: PrimeField> FieldElement<F> {
    pub fn zero() -> Self {
        Self::from_canonical(0)
    }

    pub fn one() -> Self {
        Self::from_canonical(1)
    }

    /// Builds an element from an already-reduced value. Only used internally
    /// and by callers who have already taken the value mod `MODULUS`.
    fn from_canonical(value: u64) -> Self {
        debug_assert!(value < F::MODULUS);
        Self {
            value,
            _field: std::marker::PhantomData,
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_canonical(value % F::MODULUS)
    }

    pub fn from_i64(value: i64) -> Self {
        if value >= 0 {
            Self::from_u64(value as u64)
        } else {
            -Self::from_u64((-value) as u64)
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn to_bytes_be(&self) -> [u8; 8] {
        self.value.to_be_bytes()
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    pub fn pow(&self, mut exp: u64) -> Self {
        let mut base = *self;
        let mut acc = Self::one();
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc * base;
            }
            base = base * base;
            exp >>= 1;
        }
        acc
    }

    /// Multiplicative inverse via Fermat's little theorem (`a^(p-2)`).
    pub fn inv(&self) -> StarkResult<Self> {
        if self.is_zero() {
            return Err(StarkError::FieldArithmetic(
                "cannot invert the zero element".to_string(),
            ));
        }
        Ok(self.pow(F::MODULUS - 2))
    }

    pub fn div(&self, rhs: &Self) -> StarkResult<Self> {
        Ok(*self * rhs.inv()?)
    }

    /// A primitive `n`-th root of unity, i.e. an element of multiplicative
    /// order exactly `n`. `n` must be a power of two no larger than
    /// `2^F::TWO_ADICITY`, the largest power-of-two subgroup `F` supports.
    pub fn primitive_root_of_unity(n: u64) -> StarkResult<Self> {
        if n == 0 || (n & (n - 1)) != 0 {
            return Err(StarkError::InvalidParameters(format!(
                "{n} is not a power of two"
            )));
        }
        let log2_n = n.trailing_zeros();
        if log2_n > F::TWO_ADICITY {
            return Err(StarkError::InvalidParameters(format!(
                "{n} does not divide p - 1: field only supports 2^{} roots",
                F::TWO_ADICITY
            )));
        }
        let generator = Self::from_canonical(F::GENERATOR % F::MODULUS);
        // generator^((p-1)/n) has order exactly n, since p - 1 = 2^TWO_ADICITY * odd.
        let exponent = (F::MODULUS - 1) >> log2_n;
        Ok(generator.pow(exponent))
    }

    /// Montgomery's trick: inverts every element of `xs` with a single field
    /// inversion plus `3(n-1)` multiplications. Fails if any entry is zero.
    pub fn batch_inversion(xs: &[Self]) -> StarkResult<Vec<Self>> {
        if xs.is_empty() {
            return Ok(Vec::new());
        }
        if xs.iter().any(FieldElement::is_zero) {
            return Err(StarkError::FieldArithmetic(
                "batch_inversion called with a zero element".to_string(),
            ));
        }

        let mut prefix = Vec::with_capacity(xs.len());
        let mut running = Self::one();
        for x in xs {
            running = running * *x;
            prefix.push(running);
        }

        let mut tail_inv = running.inv()?;
        let mut result = vec![Self::zero(); xs.len()];
        for i in (0..xs.len()).rev() {
            let prefix_before = if i == 0 { Self::one() } else { prefix[i - 1] };
            result[i] = prefix_before * tail_inv;
            tail_inv = tail_inv * xs[i];
        }
        Ok(result)
    }

    /// In-place variant used by the prover/verifier hot paths.
    pub fn inplace_batch_inverse(xs: &mut [Self]) -> StarkResult<()> {
        let inverted = Self::batch_inversion(xs)?;
        xs.clone_from_slice(&inverted);
        Ok(())
    }
}

impl<F: PrimeField> fmt::Debug for FieldElement<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.value)
    }
}

impl<F: PrimeField> fmt::Display for FieldElement<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<F: PrimeField> From<u64> for FieldElement<F> {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl<F: PrimeField> Add for FieldElement<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let sum = self.value as u128 + rhs.value as u128;
        Self::from_canonical((sum % F::MODULUS as u128) as u64)
    }
}

impl<F: PrimeField> Sub for FieldElement<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl<F: PrimeField> Neg for FieldElement<F> {
    type Output = Self;
    fn neg(self) -> Self {
        if self.is_zero() {
            self
        } else {
            Self::from_canonical(F::MODULUS - self.value)
        }
    }
}

impl<F: PrimeField> Mul for FieldElement<F> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let product = self.value as u128 * rhs.value as u128;
        Self::from_canonical((product % F::MODULUS as u128) as u64)
    }
}

impl<F: PrimeField> Div for FieldElement<F> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        self.div(&rhs).expect("division by zero field element")
    }
}

// Reference overloads so call sites can write `&a + &b` as the constraint
// evaluator and verifier do throughout this crate, even though this type
// is small enough to be plain `Copy` and never strictly needs them.
impl<F: PrimeField> Add for &FieldElement<F> {
    type Output = FieldElement<F>;
    fn add(self, rhs: Self) -> FieldElement<F> {
        *self + *rhs
    }
}

impl<F: PrimeField> Sub for &FieldElement<F> {
    type Output = FieldElement<F>;
    fn sub(self, rhs: Self) -> FieldElement<F> {
        *self - *rhs
    }
}

impl<F: PrimeField> Mul for &FieldElement<F> {
    type Output = FieldElement<F>;
    fn mul(self, rhs: Self) -> FieldElement<F> {
        *self * *rhs
    }
}

impl<F: PrimeField> Neg for &FieldElement<F> {
    type Output = FieldElement<F>;
    fn neg(self) -> FieldElement<F> {
        -*self
    }
}

impl<F: PrimeField> std::iter::Sum for FieldElement<F> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<F: PrimeField> std::ops::AddAssign for FieldElement<F> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Fp = FieldElement<Goldilocks>;

    #[test]
    fn batch_inversion_matches_scalar_inversion() {
        let xs: Vec<Fp> = (1..=1024u64).map(Fp::from_u64).collect();
        let batch = Fp::batch_inversion(&xs).unwrap();
        for (x, x_inv) in xs.iter().zip(batch.iter()) {
            assert_eq!(*x * *x_inv, Fp::one());
            assert_eq!(x.inv().unwrap(), *x_inv);
        }
    }

    #[test]
    fn batch_inversion_rejects_zero() {
        let xs = vec![Fp::one(), Fp::zero()];
        assert!(Fp::batch_inversion(&xs).is_err());
    }

    #[test]
    fn primitive_root_has_expected_order() {
        let n = 1u64 << 10;
        let root = Fp::primitive_root_of_unity(n).unwrap();
        assert_eq!(root.pow(n), Fp::one());
        assert_ne!(root.pow(n / 2), Fp::one());
    }

    #[test]
    fn inverse_of_inverse_is_identity() {
        let a = Fp::from_u64(12345);
        assert_eq!(a.inv().unwrap().inv().unwrap(), a);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Montgomery's-trick batch inversion must agree with inverting
            /// every element on its own, for any nonzero residues.
            #[test]
            fn batch_inversion_agrees_with_scalar_inversion(raw in prop::collection::vec(1u64..Goldilocks::MODULUS, 1..64)) {
                let xs: Vec<Fp> = raw.into_iter().map(Fp::from_u64).collect();
                prop_assume!(xs.iter().all(|x| !x.is_zero()));
                let batch = Fp::batch_inversion(&xs).unwrap();
                for (x, x_inv) in xs.iter().zip(batch.iter()) {
                    prop_assert_eq!(*x * *x_inv, Fp::one());
                }
            }

            /// `a / a == 1` for any nonzero `a`, however it was constructed.
            #[test]
            fn self_division_is_one(raw in 1u64..Goldilocks::MODULUS) {
                let a = Fp::from_u64(raw);
                prop_assume!(!a.is_zero());
                prop_assert_eq!(a.div(&a).unwrap(), Fp::one());
            }
        }
    }
}
