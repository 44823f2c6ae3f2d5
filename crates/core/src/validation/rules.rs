//! Validation result types, field order and limits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single failed field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Whether the candidate is a whole new record or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Required fields must be present.
    Create,
    /// Only the fields present are checked.
    Update,
}

/// Wire field names in declaration order. Errors are reported in this order.
pub const FIELD_ORDER: [&str; 17] = [
    "id",
    "date",
    "checkNumber",
    "reason",
    "amount",
    "name",
    "building",
    "unitNumber",
    "paymentWay",
    "status",
    "staff",
    "email",
    "phone",
    "followUpDate",
    "returnDate",
    "cpvNumber",
    "notes",
];

pub const MAX_CHECK_NUMBER_LENGTH: usize = 20;
pub const MAX_NAME_LENGTH: usize = 150;
pub const MAX_BUILDING_LENGTH: usize = 100;
pub const MAX_UNIT_NUMBER_LENGTH: usize = 50;
pub const MAX_CPV_NUMBER_LENGTH: usize = 50;

pub const CPV_REQUIRED_MESSAGE: &str = "CPV Number is required for this status";

/// Digits a phone number must contain, ignoring separators.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Allowed phone characters: digits, whitespace, `-`, `+`, `(`, `)`.
pub const PHONE_PATTERN: &str = r"^[\d\s\-\+\(\)]+$";
