//! The external interface boundary: `TraceSource` supplies the execution
//! trace, `ConstraintSet` supplies the algebraic constraints checked
//! against it. Neither trait references the other's concrete implementor —
//! a lookup argument is just another `ConstraintSet` built by composition
//! (see `demo::fibonacci` for a worked boundary constraint and `lookup` for
//! the membership check itself), never a second trait layered on top of
//! the first with a cyclic dependency back to it.

use crate::error::StarkResult;
use crate::field::{FieldElement, PrimeField};

/// A single row-pair window into the trace: the only context a transition
/// constraint is allowed to look at.
pub struct Frame<'a, F: PrimeField> {
    pub current: &'a [FieldElement<F>],
    pub next: &'a [FieldElement<F>],
}

/// Supplies the execution trace the prover commits to. A `TraceSource` is
/// built once (typically by running the program/computation being proven)
/// and never mutated.
pub trait TraceSource<F: PrimeField>: Sync {
    /// Number of rows. Must be a power of two.
    fn trace_length(&self) -> usize;
    fn num_columns(&self) -> usize;
    /// All rows of column `index`, `trace_length()` long.
    fn column(&self, index: usize) -> &[FieldElement<F>];

    fn row(&self, index: usize) -> Vec<FieldElement<F>> {
        (0..self.num_columns())
            .map(|c| self.column(c)[index])
            .collect()
    }

    fn frame_at(&self, row: usize) -> (Vec<FieldElement<F>>, Vec<FieldElement<F>>) {
        let next_row = (row + 1) % self.trace_length();
        (self.row(row), self.row(next_row))
    }
}

/// A boundary constraint: column `column` must equal `value` at row `row`.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryConstraint<F: PrimeField> {
    pub column: usize,
    pub row: usize,
    pub value: FieldElement<F>,
}

/// The algebraic constraints a trace must satisfy. Transition constraints
/// are evaluated once per consecutive row pair (wrapping at the trace
/// boundary); their count and individual degrees bound the degree of the
/// composition polynomial the prover commits to.
pub trait ConstraintSet<F: PrimeField>: Sync {
    /// The trace shape this constraint set expects; public knowledge the
    /// verifier needs without ever seeing the witness itself.
    fn trace_length(&self) -> usize;
    fn num_columns(&self) -> usize;

    fn num_transition_constraints(&self) -> usize;
    fn transition_degree(&self) -> usize;
    fn boundary_constraints(&self) -> Vec<BoundaryConstraint<F>>;

    /// Evaluates every transition constraint against one row-pair frame,
    /// returning one value per constraint (zero iff satisfied).
    fn evaluate_transition(&self, frame: &Frame<F>) -> Vec<FieldElement<F>>;

    fn validate_against(&self, trace: &dyn TraceSource<F>) -> StarkResult<()> {
        if trace.trace_length() != self.trace_length() || trace.num_columns() != self.num_columns() {
            return Err(crate::error::StarkError::InvalidParameters(format!(
                "trace shape ({}x{}) does not match the constraint set's expected shape ({}x{})",
                trace.trace_length(),
                trace.num_columns(),
                self.trace_length(),
                self.num_columns()
            )));
        }
        for constraint in self.boundary_constraints() {
            if constraint.row >= trace.trace_length() || constraint.column >= trace.num_columns() {
                return Err(crate::error::StarkError::InvalidParameters(format!(
                    "boundary constraint references row {} column {} outside the trace",
                    constraint.row, constraint.column
                )));
            }
        }
        Ok(())
    }
}
