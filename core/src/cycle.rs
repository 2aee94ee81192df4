//! Billing-cycle calculator.
//!
//! A subscriber's billing anchor day is the day-of-month of their
//! enrollment date. Each month's cutoff is that day, clamped to the
//! last real day of the month (anchor 31 in April is April 30; anchor
//! 29 in a non-leap February is February 28).

use crate::{
    config::AlertOptions,
    error::{BillingError, BillingResult},
    types::DayCount,
};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// The cycle a reference date falls in. Derived, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillingCycle {
    pub anchor_day:         u32,
    pub cutoff_date:        NaiveDate,
    pub grace_window_start: NaiveDate,
    pub grace_window_end:   NaiveDate,
}

/// Where a date sits relative to a cycle's grace window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WindowPosition {
    BeforeWindow,
    InWindow,
    AfterWindow,
}

impl WindowPosition {
    pub const ALL: [WindowPosition; 3] = [
        WindowPosition::BeforeWindow,
        WindowPosition::InWindow,
        WindowPosition::AfterWindow,
    ];
}

impl BillingCycle {
    /// Window bounds are inclusive on both ends.
    pub fn position_of(&self, date: NaiveDate) -> WindowPosition {
        if date < self.grace_window_start {
            WindowPosition::BeforeWindow
        } else if date > self.grace_window_end {
            WindowPosition::AfterWindow
        } else {
            WindowPosition::InWindow
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position_of(date) == WindowPosition::InWindow
    }

    /// Days from `date` to the cutoff. Negative once the cutoff has passed.
    pub fn days_to_cutoff(&self, date: NaiveDate) -> DayCount {
        (self.cutoff_date - date).num_days()
    }

    /// Latest cutoff strictly before `date`: this cycle's cutoff if it has
    /// passed, otherwise the previous month's.
    pub fn last_missed_cutoff(&self, date: NaiveDate) -> BillingResult<NaiveDate> {
        if self.cutoff_date < date {
            return Ok(self.cutoff_date);
        }
        let (year, month) = previous_month(self.cutoff_date.year(), self.cutoff_date.month());
        anchored_date(year, month, self.anchor_day)
    }
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> BillingResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .ok_or(BillingError::DateOutOfRange { year, month })
}

pub fn days_in_month(year: i32, month: u32) -> BillingResult<u32> {
    Ok(last_day_of_month(year, month)?.day())
}

/// (year, month) immediately before the given one, rolling January back
/// into December of the prior year.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 { (year - 1, 12) } else { (year, month - 1) }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// The anchor day in the given month, clamped to the month's last day.
pub fn anchored_date(year: i32, month: u32, anchor_day: u32) -> BillingResult<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    last.with_day(anchor_day.clamp(1, last.day()))
        .ok_or(BillingError::DateOutOfRange { year, month })
}

/// Compute the cycle containing `reference` for a subscriber enrolled on
/// `enrollment`, with the grace window shaped by `options`.
pub fn compute_cycle(
    enrollment: NaiveDate,
    reference: NaiveDate,
    options: &AlertOptions,
) -> BillingResult<BillingCycle> {
    let anchor_day = enrollment.day();
    let (year, month) = (reference.year(), reference.month());
    let cutoff_date = anchored_date(year, month, anchor_day)?;

    let out_of_range = || BillingError::DateOutOfRange { year, month };
    let grace_window_start = cutoff_date
        .checked_sub_days(Days::new(options.upcoming_horizon_days.into()))
        .ok_or_else(out_of_range)?;
    let grace_window_end = cutoff_date
        .checked_add_days(Days::new(options.overdue_confirm_days.into()))
        .ok_or_else(out_of_range)?;

    Ok(BillingCycle {
        anchor_day,
        cutoff_date,
        grace_window_start,
        grace_window_end,
    })
}
