//! Field-level validation for check records.
//!
//! Rules are independent per field except the CPV number, which is required
//! for settlement statuses. On update that rule runs against the merged
//! record through [`validate_settlement`]. Results come back in field declaration order so
//! callers can compare them exactly.

pub mod evaluator;
pub mod rules;

pub use evaluator::{validate_check, validate_settlement};
pub use rules::{FieldError, ValidationMode};
