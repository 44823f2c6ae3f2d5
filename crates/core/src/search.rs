//! List filtering by free-text search and status.

use crate::check::{CheckRecord, CheckStatus};

/// Filter applied to a list of checks. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct CheckFilter {
    /// Case-insensitive substring matched against name, building, unit
    /// number and check number.
    pub q: Option<String>,
    pub status: Option<CheckStatus>,
}

impl CheckFilter {
    pub fn is_empty(&self) -> bool {
        self.term().is_none() && self.status.is_none()
    }

    fn term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, record: &CheckRecord) -> bool {
        let fields = &record.fields;
        if self.status.is_some_and(|s| s != fields.status) {
            return false;
        }
        match self.term() {
            None => true,
            Some(term) => [
                &fields.name,
                &fields.building,
                &fields.unit_number,
                &fields.check_number,
            ]
            .iter()
            .any(|text| text.to_lowercase().contains(&term)),
        }
    }

    /// Keep only matching records, preserving order.
    pub fn apply(&self, records: Vec<CheckRecord>) -> Vec<CheckRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
