//! Subscriber records as supplied by the roster provider.
//!
//! RULE: The engine treats subscribers as read-only snapshots.
//! Malformed dates are kept verbatim so they can be reported, never
//! silently replaced.

use crate::{
    config::EngineConfig,
    error::{BillingError, BillingResult},
    types::{SubscriberId, TenantId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const ISO_DATE: &str = "%Y-%m-%d";

/// A calendar date as received from the roster provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum DateField {
    #[default]
    Missing,
    Valid(NaiveDate),
    Invalid(String),
}

impl DateField {
    /// Parse an ISO calendar date. A trailing time component
    /// (`2025-03-15 00:00:00`, `2025-03-15T08:00:00Z`) is ignored.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE) {
            return Self::Valid(date);
        }
        let date_part = trimmed
            .get(..10)
            .filter(|_| matches!(trimmed.as_bytes().get(10), Some(b'T') | Some(b' ')));
        match date_part.and_then(|d| NaiveDate::parse_from_str(d, ISO_DATE).ok()) {
            Some(date) => Self::Valid(date),
            None       => Self::Invalid(raw.to_string()),
        }
    }

    /// `Ok(None)` when absent, the date when well-formed, `InvalidDate` otherwise.
    pub fn resolve(&self, field: &'static str) -> BillingResult<Option<NaiveDate>> {
        match self {
            Self::Missing        => Ok(None),
            Self::Valid(date)    => Ok(Some(*date)),
            Self::Invalid(value) => Err(BillingError::InvalidDate {
                field,
                value: value.clone(),
            }),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<Option<String>> for DateField {
    fn from(raw: Option<String>) -> Self {
        raw.map_or(Self::Missing, |s| Self::parse(&s))
    }
}

impl From<DateField> for Option<String> {
    fn from(field: DateField) -> Self {
        match field {
            DateField::Missing        => None,
            DateField::Valid(date)    => Some(date.format(ISO_DATE).to_string()),
            DateField::Invalid(value) => Some(value),
        }
    }
}

impl From<NaiveDate> for DateField {
    fn from(date: NaiveDate) -> Self {
        Self::Valid(date)
    }
}

impl From<Option<NaiveDate>> for DateField {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(Self::Missing, Self::Valid)
    }
}

impl From<&str> for DateField {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// A billable person/account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id:                SubscriberId,
    pub tenant_id:         TenantId,
    #[serde(default)]
    pub name:              Option<String>,
    pub active:            bool,
    #[serde(default)]
    pub enrollment_date:   DateField,
    #[serde(default)]
    pub last_payment_date: DateField,
    /// Informational only; classification never reads it.
    #[serde(default)]
    pub monthly_fee:       f64,
    #[serde(default)]
    pub program:           Option<String>,
    #[serde(default)]
    pub instructor:        Option<String>,
}

impl Subscriber {
    pub fn new(
        id: impl Into<SubscriberId>,
        tenant_id: impl Into<TenantId>,
        enrollment_date: impl Into<DateField>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: None,
            active: true,
            enrollment_date: enrollment_date.into(),
            last_payment_date: DateField::Missing,
            monthly_fee: 0.0,
            program: None,
            instructor: None,
        }
    }

    pub fn with_last_payment(mut self, date: impl Into<DateField>) -> Self {
        self.last_payment_date = date.into();
        self
    }

    pub fn with_fee(mut self, monthly_fee: f64) -> Self {
        self.monthly_fee = monthly_fee;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = Some(instructor.into());
        self
    }

    pub fn withdrawn(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn enrollment(&self) -> BillingResult<Option<NaiveDate>> {
        self.enrollment_date.resolve("enrollment")
    }

    pub fn last_payment(&self) -> BillingResult<Option<NaiveDate>> {
        self.last_payment_date.resolve("last_payment")
    }
}

/// Wire shape of one roster-provider row: a status string instead of a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRecord {
    pub id:                SubscriberId,
    pub tenant_id:         TenantId,
    #[serde(default)]
    pub name:              Option<String>,
    #[serde(default)]
    pub status:            String,
    #[serde(default)]
    pub enrollment_date:   Option<String>,
    #[serde(default)]
    pub last_payment_date: Option<String>,
    #[serde(default)]
    pub monthly_fee:       f64,
    #[serde(default)]
    pub program:           Option<String>,
    #[serde(default)]
    pub instructor:        Option<String>,
}

impl RosterRecord {
    pub fn into_subscriber(self, config: &EngineConfig) -> Subscriber {
        Subscriber {
            active: config.is_active_status(&self.status),
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name,
            enrollment_date: self.enrollment_date.into(),
            last_payment_date: self.last_payment_date.into(),
            monthly_fee: self.monthly_fee,
            program: self.program,
            instructor: self.instructor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamped_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(DateField::parse("2025-03-15"), DateField::Valid(expected));
        assert_eq!(DateField::parse("2025-03-15 00:00:00"), DateField::Valid(expected));
        assert_eq!(DateField::parse("2025-03-15T08:30:00Z"), DateField::Valid(expected));
        assert_eq!(DateField::parse("   "), DateField::Missing);
    }

    #[test]
    fn impossible_dates_are_kept_verbatim() {
        assert_eq!(
            DateField::parse("2025-02-30"),
            DateField::Invalid("2025-02-30".into())
        );
        assert_eq!(DateField::parse("15/03/2025"), DateField::Invalid("15/03/2025".into()));
    }

    #[test]
    fn resolve_names_the_field() {
        let err = DateField::parse("garbage").resolve("enrollment").unwrap_err();
        match err {
            BillingError::InvalidDate { field, value } => {
                assert_eq!(field, "enrollment");
                assert_eq!(value, "garbage");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn roster_record_maps_status_string() {
        let json = r#"{
            "id": "s-1", "tenant_id": "t-1", "status": "Baja",
            "enrollment_date": "2025-01-31", "last_payment_date": null
        }"#;
        let record: RosterRecord = serde_json::from_str(json).unwrap();
        let sub = record.into_subscriber(&EngineConfig::default());
        assert!(!sub.active);
        assert!(sub.last_payment_date.is_missing());
        assert_eq!(
            sub.enrollment_date,
            DateField::Valid(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
        );
    }

    #[test]
    fn subscriber_json_keeps_invalid_text() {
        let sub = Subscriber::new("s-1", "t-1", "not-a-date");
        let json = serde_json::to_string(&sub).unwrap();
        assert!(json.contains("\"enrollment_date\":\"not-a-date\""));
        let back: Subscriber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sub);
    }
}
