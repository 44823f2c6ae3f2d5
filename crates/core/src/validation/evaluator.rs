//! Rule evaluator: pure logic over a raw JSON object.
//!
//! Works on the untyped request body so that wrong types (a string amount,
//! an unknown status) surface as field errors rather than parse failures.
//! The settlement rule for updates needs the merged record instead, see
//! [`validate_settlement`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use validator::ValidateEmail;

use super::rules::*;
use crate::check::{CheckFields, CheckStatus};
use crate::types::parse_day;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// Validate a candidate record, returning one error per failing field in
/// declaration order. An empty vector means the candidate is valid.
///
/// In update mode the CPV requirement is not checked here: a partial body
/// cannot tell whether the stored record already carries a CPV number.
pub fn validate_check(candidate: &Map<String, Value>, mode: ValidationMode) -> Vec<FieldError> {
    let settlement = mode == ValidationMode::Create
        && candidate
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<CheckStatus>().ok())
            .is_some_and(CheckStatus::is_settlement);

    FIELD_ORDER
        .iter()
        .filter_map(|&field| {
            let value = present(candidate.get(field));
            let message = match field {
                "date" => check_date(value, "Please enter a valid date"),
                "checkNumber" => check_required_text(
                    value,
                    mode,
                    MAX_CHECK_NUMBER_LENGTH,
                    format!(
                        "Check number is required and must be 1-{MAX_CHECK_NUMBER_LENGTH} characters"
                    ),
                ),
                "reason" | "paymentWay" | "staff" | "notes" => check_free_text(value, field),
                "amount" => check_amount(value, mode),
                "name" => check_required_text(
                    value,
                    mode,
                    MAX_NAME_LENGTH,
                    format!("Tenant name is required and must be 1-{MAX_NAME_LENGTH} characters"),
                ),
                "building" => check_optional_text(
                    value,
                    MAX_BUILDING_LENGTH,
                    format!("Building name must be 1-{MAX_BUILDING_LENGTH} characters"),
                ),
                "unitNumber" => check_optional_text(
                    value,
                    MAX_UNIT_NUMBER_LENGTH,
                    format!("Unit number must be 1-{MAX_UNIT_NUMBER_LENGTH} characters"),
                ),
                "status" => check_status(value),
                "email" => check_email(value),
                "phone" => check_phone(value),
                "followUpDate" => check_date(value, "Please enter a valid follow-up date"),
                "returnDate" => check_date(value, "Please enter a valid return date"),
                "cpvNumber" => check_cpv_number(value, settlement),
                _ => None,
            };
            message.map(|m| FieldError::new(field, m))
        })
        .collect()
}

/// Treat an explicit `null` the same as an absent key.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn trimmed_len(s: &str) -> usize {
    s.trim().chars().count()
}

fn check_required_text(
    value: Option<&Value>,
    mode: ValidationMode,
    max: usize,
    message: String,
) -> Option<String> {
    match value {
        None if mode == ValidationMode::Create => Some(message),
        None => None,
        Some(Value::String(s)) if (1..=max).contains(&trimmed_len(s)) => None,
        Some(_) => Some(message),
    }
}

fn check_optional_text(value: Option<&Value>, max: usize, message: String) -> Option<String> {
    match value {
        None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) if (1..=max).contains(&trimmed_len(s)) => None,
        Some(_) => Some(message),
    }
}

fn check_free_text(value: Option<&Value>, field: &str) -> Option<String> {
    let label = match field {
        "reason" => "Reason",
        "paymentWay" => "Payment method",
        "staff" => "Staff",
        _ => "Notes",
    };
    match value {
        None | Some(Value::String(_)) => None,
        Some(_) => Some(format!("{label} must be text")),
    }
}

fn check_amount(value: Option<&Value>, mode: ValidationMode) -> Option<String> {
    let message = "Amount is required and must be positive".to_string();
    let amount = match value {
        None if mode == ValidationMode::Create => return Some(message),
        None => return None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match amount {
        Some(a) if a.is_finite() && a > 0.0 => None,
        _ => Some(message),
    }
}

fn check_status(value: Option<&Value>) -> Option<String> {
    let valid = match value {
        None => true,
        Some(Value::String(s)) => s.parse::<CheckStatus>().is_ok(),
        Some(_) => false,
    };
    if valid {
        None
    } else {
        let allowed: Vec<&str> = CheckStatus::ALL.iter().map(|s| s.as_str()).collect();
        Some(format!("Status must be one of: {}", allowed.join(", ")))
    }
}

fn check_email(value: Option<&Value>) -> Option<String> {
    match value {
        None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) if s.trim().to_string().validate_email() => None,
        Some(_) => Some("Please enter a valid email address".to_string()),
    }
}

fn check_phone(value: Option<&Value>) -> Option<String> {
    match value {
        None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) if is_valid_phone(s) => None,
        Some(_) => Some("Please enter a valid phone number".to_string()),
    }
}

fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone) && phone.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
}

/// Blank date strings count as absent.
fn check_date(value: Option<&Value>, message: &str) -> Option<String> {
    match value {
        None => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) if parse_day(s).is_some() => None,
        Some(_) => Some(message.to_string()),
    }
}

/// The CPV requirement checked against a whole record, typically one with
/// an update already applied.
pub fn validate_settlement(fields: &CheckFields) -> Option<FieldError> {
    (fields.status.is_settlement() && fields.cpv_number.trim().is_empty())
        .then(|| FieldError::new("cpvNumber", CPV_REQUIRED_MESSAGE))
}

fn check_cpv_number(value: Option<&Value>, settlement: bool) -> Option<String> {
    let blank = match value {
        None => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if settlement && blank {
        return Some(CPV_REQUIRED_MESSAGE.to_string());
    }
    match value {
        None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) if (1..=MAX_CPV_NUMBER_LENGTH).contains(&trimmed_len(s)) => None,
        Some(_) => Some(format!(
            "CPV Number must be 1-{MAX_CPV_NUMBER_LENGTH} characters"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn valid() -> Map<String, Value> {
        candidate(json!({
            "date": "2025-01-01",
            "checkNumber": "000123",
            "amount": 1500,
            "name": "Jane Tenant",
            "status": "bounced",
            "email": "jane@example.com",
            "phone": "+971 50 123 4567",
            "returnDate": "2025-01-01",
        }))
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn valid_record_has_no_errors() {
        assert!(validate_check(&valid(), ValidationMode::Create).is_empty());
    }

    #[test]
    fn empty_create_reports_required_fields_in_order() {
        let errors = validate_check(&Map::new(), ValidationMode::Create);
        assert_eq!(fields(&errors), vec!["checkNumber", "amount", "name"]);
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(validate_check(&Map::new(), ValidationMode::Update).is_empty());
    }

    #[test]
    fn negative_amount_must_be_positive() {
        let mut c = valid();
        c.insert("amount".into(), json!(-5));
        let errors = validate_check(&c, ValidationMode::Create);
        assert_eq!(fields(&errors), vec!["amount"]);
        assert!(errors[0].message.contains("must be positive"));
    }

    #[test]
    fn zero_and_garbage_amounts_rejected() {
        for bad in [json!(0), json!("abc"), json!(true), json!("-1")] {
            let mut c = valid();
            c.insert("amount".into(), bad);
            assert_eq!(fields(&validate_check(&c, ValidationMode::Create)), vec!["amount"]);
        }
    }

    #[test]
    fn numeric_string_amount_accepted() {
        let mut c = valid();
        c.insert("amount".into(), json!("99.50"));
        assert!(validate_check(&c, ValidationMode::Create).is_empty());
    }

    #[test]
    fn settlement_without_cpv_rejected() {
        let mut c = valid();
        c.insert("status".into(), json!("deal_close"));
        let errors = validate_check(&c, ValidationMode::Create);
        assert_eq!(
            errors,
            vec![FieldError::new("cpvNumber", "CPV Number is required for this status")]
        );

        c.insert("cpvNumber".into(), json!("CPV-77"));
        assert!(validate_check(&c, ValidationMode::Create).is_empty());
    }

    #[test]
    fn update_leaves_cpv_requirement_to_merged_record() {
        let c = candidate(json!({ "status": "partial_paid" }));
        assert!(validate_check(&c, ValidationMode::Update).is_empty());
        let c = candidate(json!({ "cpvNumber": "" }));
        assert!(validate_check(&c, ValidationMode::Update).is_empty());
    }

    fn stored(status: CheckStatus, cpv_number: &str) -> CheckFields {
        CheckFields {
            date: parse_day("2025-01-01").unwrap(),
            check_number: "000123".into(),
            reason: String::new(),
            amount: 1500.0,
            name: "Jane Tenant".into(),
            building: String::new(),
            unit_number: String::new(),
            payment_way: String::new(),
            status,
            staff: String::new(),
            email: String::new(),
            phone: String::new(),
            follow_up_date: parse_day("2025-01-15").unwrap(),
            return_date: None,
            cpv_number: cpv_number.into(),
            notes: String::new(),
        }
    }

    #[test]
    fn settlement_rule_on_whole_record() {
        assert_eq!(validate_settlement(&stored(CheckStatus::PartialPaid, "CPV-1")), None);
        assert_eq!(validate_settlement(&stored(CheckStatus::Bounced, "")), None);
        assert_eq!(
            validate_settlement(&stored(CheckStatus::DealClose, "  ")),
            Some(FieldError::new("cpvNumber", "CPV Number is required for this status"))
        );
    }

    #[test]
    fn cpv_too_long_rejected() {
        let mut c = valid();
        c.insert("cpvNumber".into(), json!("x".repeat(51)));
        let errors = validate_check(&c, ValidationMode::Create);
        assert_eq!(errors[0].message, "CPV Number must be 1-50 characters");
    }

    #[test]
    fn length_limits() {
        let mut c = valid();
        c.insert("checkNumber".into(), json!("1".repeat(21)));
        c.insert("name".into(), json!("n".repeat(151)));
        c.insert("building".into(), json!("b".repeat(101)));
        c.insert("unitNumber".into(), json!("u".repeat(51)));
        let errors = validate_check(&c, ValidationMode::Create);
        assert_eq!(
            fields(&errors),
            vec!["checkNumber", "name", "building", "unitNumber"]
        );
    }

    #[test]
    fn whitespace_only_name_is_missing() {
        let mut c = valid();
        c.insert("name".into(), json!("   "));
        assert_eq!(fields(&validate_check(&c, ValidationMode::Create)), vec!["name"]);
    }

    #[test]
    fn email_and_phone_formats() {
        let mut c = valid();
        c.insert("email".into(), json!("not-an-email"));
        c.insert("phone".into(), json!("12-34"));
        let errors = validate_check(&c, ValidationMode::Create);
        assert_eq!(fields(&errors), vec!["email", "phone"]);

        c.insert("email".into(), json!(""));
        c.insert("phone".into(), json!("abc1234567"));
        assert_eq!(fields(&validate_check(&c, ValidationMode::Create)), vec!["phone"]);
    }

    #[test]
    fn unknown_status_rejected() {
        let c = candidate(json!({ "status": "closed" }));
        let errors = validate_check(&c, ValidationMode::Update);
        assert_eq!(fields(&errors), vec!["status"]);
        assert!(errors[0].message.contains("partial_paid"));
    }

    #[test]
    fn invalid_dates_rejected_blank_dates_ignored() {
        let c = candidate(json!({
            "date": "2025-13-01",
            "followUpDate": "soon",
            "returnDate": ""
        }));
        let errors = validate_check(&c, ValidationMode::Update);
        assert_eq!(fields(&errors), vec!["date", "followUpDate"]);
    }

    #[test]
    fn null_counts_as_absent() {
        let c = candidate(json!({ "notes": null, "email": null }));
        assert!(validate_check(&c, ValidationMode::Update).is_empty());
    }

    #[test]
    fn non_text_free_fields_rejected() {
        let c = candidate(json!({ "notes": 5, "staff": ["x"] }));
        let errors = validate_check(&c, ValidationMode::Update);
        assert_eq!(
            errors,
            vec![
                FieldError::new("staff", "Staff must be text"),
                FieldError::new("notes", "Notes must be text"),
            ]
        );
    }

    #[test]
    fn update_checks_only_present_fields() {
        let c = candidate(json!({ "name": "" }));
        assert_eq!(fields(&validate_check(&c, ValidationMode::Update)), vec!["name"]);
        let c = candidate(json!({ "status": "resolved" }));
        assert!(validate_check(&c, ValidationMode::Update).is_empty());
    }
}
