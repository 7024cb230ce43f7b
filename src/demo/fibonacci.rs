//! A two-column Fibonacci `TraceSource`/`ConstraintSet`: column 0 holds
//! `a_i`, column 1 holds `b_i`, with `a_0 = b_0 = 1` and the transition
//! `a_{i+1} = b_i`, `b_{i+1} = a_i + b_i` (so column 1 is the usual
//! Fibonacci sequence).

use crate::air::{BoundaryConstraint, ConstraintSet, Frame, TraceSource};
use crate::field::{FieldElement, PrimeField};

pub struct FibonacciTrace<F: PrimeField> {
    a: Vec<FieldElement<F>>,
    b: Vec<FieldElement<F>>,
}

impl<F: PrimeField> FibonacciTrace<F> {
    /// `length` must be a power of two and at least 2.
    pub fn new(length: usize) -> Self {
        let mut a = Vec::with_capacity(length);
        let mut b = Vec::with_capacity(length);
        a.push(FieldElement::one());
        b.push(FieldElement::one());
        for i in 1..length {
            a.push(b[i - 1]);
            b.push(a[i - 1] + b[i - 1]);
        }
        Self { a, b }
    }
}

impl<F: PrimeField> TraceSource<F> for FibonacciTrace<F> {
    fn trace_length(&self) -> usize {
        self.a.len()
    }

    fn num_columns(&self) -> usize {
        2
    }

    fn column(&self, index: usize) -> &[FieldElement<F>] {
        match index {
            0 => &self.a,
            1 => &self.b,
            other => panic!("FibonacciTrace has only 2 columns, got index {other}"),
        }
    }
}

pub struct FibonacciConstraints<F: PrimeField> {
    trace_length: usize,
    _marker: std::marker::PhantomData<F>,
}

impl<F: PrimeField> FibonacciConstraints<F> {
    pub fn new(trace_length: usize) -> Self {
        Self {
            trace_length,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<F: PrimeField> ConstraintSet<F> for FibonacciConstraints<F> {
    fn trace_length(&self) -> usize {
        self.trace_length
    }

    fn num_columns(&self) -> usize {
        2
    }

    fn num_transition_constraints(&self) -> usize {
        2
    }

    fn transition_degree(&self) -> usize {
        1
    }

    fn boundary_constraints(&self) -> Vec<BoundaryConstraint<F>> {
        vec![
            BoundaryConstraint {
                column: 0,
                row: 0,
                value: FieldElement::one(),
            },
            BoundaryConstraint {
                column: 1,
                row: 0,
                value: FieldElement::one(),
            },
        ]
    }

    fn evaluate_transition(&self, frame: &Frame<F>) -> Vec<FieldElement<F>> {
        vec![
            frame.next[0] - frame.current[1],
            frame.next[1] - (frame.current[0] + frame.current[1]),
        ]
    }
}
