//! Dashboard statistics over a set of checks.

use serde::Serialize;

use crate::check::{CheckRecord, CheckStatus};
use crate::follow_up::is_overdue;
use crate::types::Day;

/// Counts per status, total outstanding amount and overdue follow-ups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStats {
    pub total: usize,
    pub bounced: usize,
    pub retrieved: usize,
    pub pending: usize,
    pub resolved: usize,
    pub deal_close: usize,
    pub partial_paid: usize,
    pub total_amount: f64,
    /// Overdue follow-ups on records that are not resolved.
    pub due_follow_ups: usize,
}

impl CheckStats {
    pub fn compute(records: &[CheckRecord], today: Day) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            let fields = &record.fields;
            stats.total += 1;
            stats.total_amount += fields.amount;
            match fields.status {
                CheckStatus::Bounced => stats.bounced += 1,
                CheckStatus::Retrieved => stats.retrieved += 1,
                CheckStatus::Pending => stats.pending += 1,
                CheckStatus::Resolved => stats.resolved += 1,
                CheckStatus::DealClose => stats.deal_close += 1,
                CheckStatus::PartialPaid => stats.partial_paid += 1,
            }
            if fields.status != CheckStatus::Resolved && is_overdue(fields.follow_up_date, today) {
                stats.due_follow_ups += 1;
            }
            stats
        })
    }
}
