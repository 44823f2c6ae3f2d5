//! The check record model and its input DTOs.
//!
//! [`CheckRecord`] is what every store returns. [`CheckFields`] is a record
//! minus its identifier, fully defaulted, and is what stores receive on
//! create. [`NewCheck`] and [`CheckPatch`] are the typed forms of the
//! create and update request bodies; both are built through
//! `from_candidate`, which runs field validation first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::follow_up::{compute_follow_up, follow_up_basis};
use crate::types::{CheckId, Day};
use crate::validation::{validate_check, validate_settlement, ValidationMode};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a bounced check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    #[default]
    Bounced,
    Retrieved,
    Pending,
    Resolved,
    DealClose,
    PartialPaid,
}

impl CheckStatus {
    /// Every status, in declaration order.
    pub const ALL: [CheckStatus; 6] = [
        CheckStatus::Bounced,
        CheckStatus::Retrieved,
        CheckStatus::Pending,
        CheckStatus::Resolved,
        CheckStatus::DealClose,
        CheckStatus::PartialPaid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Bounced => "bounced",
            CheckStatus::Retrieved => "retrieved",
            CheckStatus::Pending => "pending",
            CheckStatus::Resolved => "resolved",
            CheckStatus::DealClose => "deal_close",
            CheckStatus::PartialPaid => "partial_paid",
        }
    }

    /// Settled or partially settled; these require a CPV number.
    pub fn is_settlement(self) -> bool {
        matches!(self, CheckStatus::DealClose | CheckStatus::PartialPaid)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for CheckStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// Every field of a check except its identifier.
///
/// Optional text fields are empty strings when unset, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFields {
    pub date: Day,
    pub check_number: String,
    #[serde(default)]
    pub reason: String,
    pub amount: f64,
    pub name: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub unit_number: String,
    #[serde(default)]
    pub payment_way: String,
    #[serde(default)]
    pub status: CheckStatus,
    #[serde(default)]
    pub staff: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub follow_up_date: Day,
    #[serde(default, with = "blank_date")]
    pub return_date: Option<Day>,
    #[serde(default)]
    pub cpv_number: String,
    #[serde(default)]
    pub notes: String,
}

/// A stored check with its normalized string identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub id: CheckId,
    #[serde(flatten)]
    pub fields: CheckFields,
}

impl CheckRecord {
    pub fn new(id: impl Into<CheckId>, fields: CheckFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

// ---------------------------------------------------------------------------
// Create input
// ---------------------------------------------------------------------------

/// Typed body of a create request.
///
/// Unknown fields are rejected rather than silently dropped, and so is a
/// client-supplied `id`: every backend assigns its own.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCheck {
    #[serde(default, deserialize_with = "blank_date::deserialize")]
    pub date: Option<Day>,
    pub check_number: Option<String>,
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount::deserialize")]
    pub amount: Option<f64>,
    pub name: Option<String>,
    pub building: Option<String>,
    pub unit_number: Option<String>,
    pub payment_way: Option<String>,
    pub status: Option<CheckStatus>,
    pub staff: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_date::deserialize")]
    pub follow_up_date: Option<Day>,
    #[serde(default, deserialize_with = "blank_date::deserialize")]
    pub return_date: Option<Day>,
    pub cpv_number: Option<String>,
    pub notes: Option<String>,
}

impl NewCheck {
    /// Validate a raw JSON body and convert it into a [`NewCheck`].
    ///
    /// Field errors are reported before any shape errors so callers see the
    /// same messages a form would show.
    pub fn from_candidate(candidate: Map<String, Value>) -> Result<Self, CoreError> {
        if candidate.contains_key("id") {
            return Err(CoreError::Malformed(
                "id is assigned by the store and cannot be supplied".to_string(),
            ));
        }
        let errors = validate_check(&candidate, ValidationMode::Create);
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }
        serde_json::from_value(Value::Object(candidate))
            .map_err(|e| CoreError::Malformed(e.to_string()))
    }

    /// Fill in defaults and derive the follow-up date.
    ///
    /// A return date always drives the follow-up date. Without one, an
    /// explicit follow-up date is kept, else it falls two weeks after
    /// `today`.
    pub fn into_fields(self, today: Day) -> CheckFields {
        let follow_up_date = match (self.return_date, self.follow_up_date) {
            (Some(returned), _) => compute_follow_up(returned),
            (None, Some(explicit)) => explicit,
            (None, None) => compute_follow_up(follow_up_basis(None, today)),
        };

        CheckFields {
            date: self.date.unwrap_or(today),
            check_number: trimmed(self.check_number),
            reason: self.reason.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            name: trimmed(self.name),
            building: self.building.unwrap_or_default(),
            unit_number: self.unit_number.unwrap_or_default(),
            payment_way: self.payment_way.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            staff: self.staff.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            follow_up_date,
            return_date: self.return_date,
            cpv_number: self.cpv_number.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Update input
// ---------------------------------------------------------------------------

/// Typed body of an update request. Only present fields are applied.
///
/// `returnDate` is doubly optional: absent leaves it alone, `""` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckPatch {
    #[serde(
        default,
        deserialize_with = "blank_date::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Day>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_amount::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_way: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_date::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_up_date: Option<Day>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "patch_date")]
    pub return_date: Option<Option<Day>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpv_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CheckPatch {
    /// Validate a raw JSON body (present fields only) and convert it.
    ///
    /// The caller is responsible for stripping a matching `id` key first.
    pub fn from_candidate(candidate: Map<String, Value>) -> Result<Self, CoreError> {
        let errors = validate_check(&candidate, ValidationMode::Update);
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }
        serde_json::from_value(Value::Object(candidate))
            .map_err(|e| CoreError::Malformed(e.to_string()))
    }

    /// A patch that only changes the status.
    pub fn status(status: CheckStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The record `current` would become, rejected if it breaks the
    /// settlement rule.
    pub fn merged_onto(&self, current: &CheckFields) -> Result<CheckFields, CoreError> {
        let mut merged = current.clone();
        self.apply(&mut merged);
        match validate_settlement(&merged) {
            Some(error) => Err(CoreError::Validation(vec![error])),
            None => Ok(merged),
        }
    }

    /// Apply every present field to `fields`, leaving the rest untouched.
    pub fn apply(&self, fields: &mut CheckFields) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut fields.date, &self.date);
        set(&mut fields.check_number, &self.check_number);
        set(&mut fields.reason, &self.reason);
        set(&mut fields.amount, &self.amount);
        set(&mut fields.name, &self.name);
        set(&mut fields.building, &self.building);
        set(&mut fields.unit_number, &self.unit_number);
        set(&mut fields.payment_way, &self.payment_way);
        set(&mut fields.status, &self.status);
        set(&mut fields.staff, &self.staff);
        set(&mut fields.email, &self.email);
        set(&mut fields.phone, &self.phone);
        set(&mut fields.follow_up_date, &self.follow_up_date);
        set(&mut fields.return_date, &self.return_date);
        set(&mut fields.cpv_number, &self.cpv_number);
        set(&mut fields.notes, &self.notes);
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Optional date that travels as `""` when unset.
pub mod blank_date {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::{parse_day, Day, DATE_FORMAT};

    pub fn serialize<S: Serializer>(value: &Option<Day>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(day) => serializer.collect_str(&day.format(DATE_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Day>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_day(text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{text}'"))),
        }
    }
}

/// Present-but-blank handling for `returnDate` in a patch.
mod patch_date {
    use serde::{Deserializer, Serializer};

    use crate::types::Day;

    pub fn serialize<S: Serializer>(
        value: &Option<Option<Day>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => super::blank_date::serialize(inner, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<Day>>, D::Error> {
        super::blank_date::deserialize(deserializer).map(Some)
    }
}

/// Amounts arrive as JSON numbers or numeric strings from form input.
mod lenient_amount {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<RawAmount>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawAmount::Number(n)) => Ok(Some(n)),
            Some(RawAmount::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid amount '{text}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
