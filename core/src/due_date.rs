//! Next calendar due date, for display.
//!
//! Independent of payment history: the next due date is simply the next
//! anchor day strictly after the reference date.

use crate::{
    cycle::{anchored_date, next_month},
    error::BillingResult,
    subscriber::Subscriber,
    types::DayCount,
};
use chrono::{Datelike, NaiveDate};

/// Next anchor date strictly after `reference` for an enrollment date.
pub fn next_anchor_after(enrollment: NaiveDate, reference: NaiveDate) -> BillingResult<NaiveDate> {
    let anchor_day = enrollment.day();
    let this_month = anchored_date(reference.year(), reference.month(), anchor_day)?;
    if this_month > reference {
        return Ok(this_month);
    }
    let (year, month) = next_month(reference.year(), reference.month());
    anchored_date(year, month, anchor_day)
}

/// `Ok(None)` when the subscriber has no enrollment date;
/// `InvalidDate` when it cannot be parsed.
pub fn next_due_date(subscriber: &Subscriber, reference: NaiveDate) -> BillingResult<Option<NaiveDate>> {
    subscriber
        .enrollment()?
        .map(|enrollment| next_anchor_after(enrollment, reference))
        .transpose()
}

/// Display variant: malformed enrollment dates collapse to `None`.
pub fn display_due_date(subscriber: &Subscriber, reference: NaiveDate) -> Option<NaiveDate> {
    match next_due_date(subscriber, reference) {
        Ok(due) => due,
        Err(e) => {
            log::debug!("No due date for subscriber {}: {e}", subscriber.id);
            None
        }
    }
}

pub fn days_until(due: NaiveDate, reference: NaiveDate) -> DayCount {
    (due - reference).num_days()
}
