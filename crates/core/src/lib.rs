//! Domain logic for the bounced-check tracker.
//!
//! Everything in this crate is pure: the record model, the derived-field
//! calculator, field validation, dashboard statistics and list filtering.
//! Storage and HTTP concerns live in `bounce-store` and `bounce-api`.

pub mod check;
pub mod error;
pub mod follow_up;
pub mod search;
pub mod stats;
pub mod types;
pub mod validation;
