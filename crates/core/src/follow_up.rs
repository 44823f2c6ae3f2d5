//! Derived follow-up dates and reminder classification.
//!
//! All functions are pure: the caller supplies "today" so results are
//! deterministic in tests.

use serde::Serialize;

use crate::check::{CheckPatch, CheckRecord, CheckStatus};
use crate::types::Day;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Days between a return (or creation) and the next follow-up.
pub const FOLLOW_UP_INTERVAL_DAYS: u64 = 14;

/// A follow-up this many days away, in either direction, counts as due soon.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

// ---------------------------------------------------------------------------
// Date arithmetic
// ---------------------------------------------------------------------------

/// The follow-up date for a given basis day: exactly two weeks later.
pub fn compute_follow_up(basis: Day) -> Day {
    basis + chrono::Days::new(FOLLOW_UP_INTERVAL_DAYS)
}

/// The day a new record's follow-up is counted from: the return date when
/// one was supplied, otherwise the creation day.
pub fn follow_up_basis(return_date: Option<Day>, created: Day) -> Day {
    return_date.unwrap_or(created)
}

/// Signed number of days from `today` until `follow_up` (negative once past).
pub fn days_until(follow_up: Day, today: Day) -> i64 {
    (follow_up - today).num_days()
}

/// True when the follow-up date is strictly before `today`.
pub fn is_overdue(follow_up: Day, today: Day) -> bool {
    follow_up < today
}

/// True when the follow-up date is within three days of `today` in either
/// direction.
///
/// A record four or more days overdue is not "due soon"; combine with
/// [`is_overdue`] rather than using this alone.
pub fn is_due_soon(follow_up: Day, today: Day) -> bool {
    days_until(follow_up, today).abs() <= DUE_SOON_WINDOW_DAYS
}

// ---------------------------------------------------------------------------
// Record-level helpers
// ---------------------------------------------------------------------------

/// Whether staff should act on this record now.
///
/// Resolved records never need attention.
pub fn needs_attention(record: &CheckRecord, today: Day) -> bool {
    let follow_up = record.fields.follow_up_date;
    record.fields.status != CheckStatus::Resolved
        && (is_overdue(follow_up, today) || is_due_soon(follow_up, today))
}

/// The patch produced by "advance follow-up": mark the check retrieved and
/// push its follow-up two weeks past the current follow-up date.
pub fn advance_follow_up(record: &CheckRecord) -> CheckPatch {
    CheckPatch {
        status: Some(CheckStatus::Retrieved),
        follow_up_date: Some(compute_follow_up(record.fields.follow_up_date)),
        ..CheckPatch::default()
    }
}

/// A record flagged for follow-up, with how far away the date is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(flatten)]
    pub record: CheckRecord,
    pub days_until: i64,
    pub overdue: bool,
}

/// Every record needing attention, earliest follow-up first.
pub fn reminders(records: &[CheckRecord], today: Day) -> Vec<Reminder> {
    let mut due: Vec<Reminder> = records
        .iter()
        .filter(|r| needs_attention(r, today))
        .map(|r| Reminder {
            record: r.clone(),
            days_until: days_until(r.fields.follow_up_date, today),
            overdue: is_overdue(r.fields.follow_up_date, today),
        })
        .collect();
    due.sort_by_key(|r| r.record.fields.follow_up_date);
    due
}
