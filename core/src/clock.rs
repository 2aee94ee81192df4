//! Reference-date sources.
//!
//! RULE: Nothing inside the engine reads the wall clock.
//! Every computation takes an explicit reference date; a ClockSource
//! only exists so callers can supply "today" without hardcoding it.

use crate::error::{BillingError, BillingResult};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Supplies the reference date ("today") for a computation.
pub trait ClockSource: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// A clock frozen on one calendar date. Used by tests and replays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixedClock {
    pub date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl ClockSource for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

/// The local calendar date of the host. Only the runner binary wires this in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pick the reference date for a query.
/// An explicit date wins over the clock; with neither, the query is rejected.
pub fn resolve_reference_date(
    explicit: Option<NaiveDate>,
    clock: Option<&dyn ClockSource>,
) -> BillingResult<NaiveDate> {
    explicit
        .or_else(|| clock.map(|c| c.today()))
        .ok_or(BillingError::MissingReferenceDate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn explicit_date_beats_clock() {
        let clock = FixedClock::new(date(2025, 1, 1));
        let resolved = resolve_reference_date(Some(date(2025, 6, 14)), Some(&clock)).unwrap();
        assert_eq!(resolved, date(2025, 6, 14));
    }

    #[test]
    fn falls_back_to_clock() {
        let clock = FixedClock::new(date(2025, 1, 1));
        let resolved = resolve_reference_date(None, Some(&clock)).unwrap();
        assert_eq!(resolved, date(2025, 1, 1));
    }

    #[test]
    fn missing_date_and_clock_is_an_error() {
        let err = resolve_reference_date(None, None).unwrap_err();
        assert!(matches!(err, BillingError::MissingReferenceDate));
    }
}
