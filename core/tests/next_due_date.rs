use billing_core::{
    cycle::{anchored_date, days_in_month},
    due_date::{days_until, display_due_date, next_due_date},
    error::BillingError,
    subscriber::{DateField, Subscriber},
};
use chrono::{Datelike, Days, NaiveDate};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn due_later_this_month() {
    let sub = Subscriber::new("s-1", "t-1", d(2025, 3, 15));
    assert_eq!(next_due_date(&sub, d(2025, 6, 14)).unwrap(), Some(d(2025, 6, 15)));
}

#[test]
fn due_on_reference_day_rolls_to_next_month() {
    let sub = Subscriber::new("s-1", "t-1", d(2025, 3, 15));
    assert_eq!(next_due_date(&sub, d(2025, 6, 15)).unwrap(), Some(d(2025, 7, 15)));
}

#[test]
fn december_rolls_into_january() {
    let sub = Subscriber::new("s-1", "t-1", d(2025, 3, 15));
    assert_eq!(next_due_date(&sub, d(2025, 12, 20)).unwrap(), Some(d(2026, 1, 15)));
}

#[test]
fn overflowing_anchor_clamps_in_both_months() {
    let sub = Subscriber::new("s-1", "t-1", d(2025, 1, 31));
    assert_eq!(next_due_date(&sub, d(2025, 2, 27)).unwrap(), Some(d(2025, 2, 28)));
    assert_eq!(next_due_date(&sub, d(2025, 2, 28)).unwrap(), Some(d(2025, 3, 31)));
    assert_eq!(next_due_date(&sub, d(2025, 4, 30)).unwrap(), Some(d(2025, 5, 31)));
    assert_eq!(next_due_date(&sub, d(2025, 3, 31)).unwrap(), Some(d(2025, 4, 30)));
    assert_eq!(next_due_date(&sub, d(2024, 1, 31)).unwrap(), Some(d(2024, 2, 29)));
}

#[test]
fn missing_enrollment_has_no_due_date() {
    let sub = Subscriber::new("s-1", "t-1", DateField::Missing);
    assert_eq!(next_due_date(&sub, d(2025, 6, 14)).unwrap(), None);
}

#[test]
fn malformed_enrollment_is_an_error_but_displays_as_none() {
    let sub = Subscriber::new("s-1", "t-1", "2025/03/15");
    assert!(matches!(
        next_due_date(&sub, d(2025, 6, 14)),
        Err(BillingError::InvalidDate { .. })
    ));
    assert_eq!(display_due_date(&sub, d(2025, 6, 14)), None);
}

#[test]
fn due_date_ignores_payment_history_and_status() {
    let reference = d(2025, 6, 14);
    let base = Subscriber::new("s-1", "t-1", d(2025, 3, 20));
    let paid = base.clone().with_last_payment(d(2025, 6, 1));
    let withdrawn = base.clone().withdrawn();
    let expected = Some(d(2025, 6, 20));
    assert_eq!(next_due_date(&base, reference).unwrap(), expected);
    assert_eq!(next_due_date(&paid, reference).unwrap(), expected);
    assert_eq!(next_due_date(&withdrawn, reference).unwrap(), expected);
}

/// Every anchor day against every reference date over two years
/// (one of them leap): strictly after, at most one month out, on the
/// clamped anchor.
#[test]
fn always_strictly_after_reference() {
    let start = d(2024, 1, 1);
    for anchor in 1..=31 {
        let sub = Subscriber::new("s", "t-1", d(2023, 1, anchor));
        for offset in 0..731u64 {
            let reference = start.checked_add_days(Days::new(offset)).unwrap();
            let due = next_due_date(&sub, reference).unwrap().unwrap();
            assert!(due > reference, "anchor {anchor}: {due} not after {reference}");
            assert!(days_until(due, reference) <= 31, "anchor {anchor}: {due} too far from {reference}");
            assert_eq!(due.day(), anchor.min(days_in_month(due.year(), due.month()).unwrap()));
            assert_eq!(due, anchored_date(due.year(), due.month(), anchor).unwrap());
        }
    }
}
