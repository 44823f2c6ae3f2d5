//! Coercion of backend rows into [`CheckRecord`]s.
//!
//! Spreadsheet cells lose their types: a check number typed as digits comes
//! back as a JSON number, an id may be numeric, dates may be full ISO
//! timestamps. Everything is normalized here so callers only ever see the
//! canonical record shape.

use bounce_core::check::{CheckFields, CheckRecord, CheckStatus};
use bounce_core::follow_up::{compute_follow_up, follow_up_basis};
use bounce_core::types::{parse_day, CheckId, Day};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Normalize a backend identifier to its application string form.
///
/// Strings are trimmed; integral numbers are rendered without a fraction.
/// Anything else (null, blank, objects) has no identity.
pub fn normalize_id(value: &Value) -> Option<CheckId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => Some(i.to_string()),
            (_, Some(u), _) => Some(u.to_string()),
            (_, _, Some(f)) if f.fract() == 0.0 && f.is_finite() => Some(format!("{f:.0}")),
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Coerce an array of rows. A non-array payload is corrupt.
pub fn records_from_value(value: Value) -> Result<Vec<CheckRecord>, StoreError> {
    match value {
        Value::Array(rows) => rows.into_iter().map(record_from_value).collect(),
        other => Err(StoreError::Corrupt(format!(
            "expected an array of records, got {}",
            type_name(&other)
        ))),
    }
}

/// Coerce a single row into a record.
pub fn record_from_value(value: Value) -> Result<CheckRecord, StoreError> {
    let row = match value {
        Value::Object(row) => row,
        other => {
            return Err(StoreError::Corrupt(format!(
                "expected a record object, got {}",
                type_name(&other)
            )))
        }
    };

    let id = row
        .get("id")
        .and_then(normalize_id)
        .ok_or_else(|| StoreError::Corrupt("record has no id".into()))?;
    let corrupt = |field: &str| StoreError::Corrupt(format!("record {id}: invalid {field}"));

    let date = day(&row, "date")
        .map_err(|_| corrupt("date"))?
        .ok_or_else(|| corrupt("date"))?;
    let return_date = day(&row, "returnDate").map_err(|_| corrupt("returnDate"))?;
    let follow_up_date = day(&row, "followUpDate")
        .map_err(|_| corrupt("followUpDate"))?
        .unwrap_or_else(|| compute_follow_up(follow_up_basis(return_date, date)));
    let amount = amount(&row).ok_or_else(|| corrupt("amount"))?;
    let status = match text(&row, "status").trim() {
        "" => CheckStatus::default(),
        raw => raw.parse().map_err(|_| corrupt("status"))?,
    };

    Ok(CheckRecord::new(
        id.clone(),
        CheckFields {
            date,
            check_number: text(&row, "checkNumber"),
            reason: text(&row, "reason"),
            amount,
            name: text(&row, "name"),
            building: text(&row, "building"),
            unit_number: text(&row, "unitNumber"),
            payment_way: text(&row, "paymentWay"),
            status,
            staff: text(&row, "staff"),
            email: text(&row, "email"),
            phone: text(&row, "phone"),
            follow_up_date,
            return_date,
            cpv_number: text(&row, "cpvNumber"),
            notes: text(&row, "notes"),
        },
    ))
}

/// Any scalar rendered as text; missing and null become `""`.
fn text(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(_)) => row.get(key).and_then(normalize_id).unwrap_or_default(),
        Some(other) => other.to_string(),
    }
}

/// `Ok(None)` for a missing or blank date, `Err` for an unparseable one.
///
/// Accepts `yyyy-mm-dd` or anything starting with it (ISO timestamps).
fn day(row: &Map<String, Value>, key: &str) -> Result<Option<Day>, ()> {
    match row.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            parse_day(s)
                .or_else(|| s.get(..10).and_then(parse_day))
                .map(Some)
                .ok_or(())
        }
        Some(_) => Err(()),
    }
}

fn amount(row: &Map<String, Value>) -> Option<f64> {
    match row.get("amount")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
