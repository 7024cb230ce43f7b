//! Worked `TraceSource`/`ConstraintSet` examples exercising the full
//! prove/verify pipeline end to end.

pub mod fibonacci;
