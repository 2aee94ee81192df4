//! Cutoff dates, month-overflow clamping and grace windows.

use billing_core::{
    config::AlertOptions,
    cycle::{compute_cycle, WindowPosition},
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn cutoff_uses_anchor_day_in_reference_month() {
    let cycle = compute_cycle(d(2025, 3, 15), d(2025, 6, 14), &AlertOptions::default()).unwrap();
    assert_eq!(cycle.anchor_day, 15);
    assert_eq!(cycle.cutoff_date, d(2025, 6, 15));
    assert_eq!(cycle.grace_window_start, d(2025, 6, 12));
    assert_eq!(cycle.grace_window_end, d(2025, 6, 20));
}

#[test]
fn anchor_31_clamps_to_short_months() {
    let opts = AlertOptions::default();
    let enrolled = d(2025, 1, 31);

    let april = compute_cycle(enrolled, d(2025, 4, 2), &opts).unwrap();
    assert_eq!(april.cutoff_date, d(2025, 4, 30));

    let feb_common = compute_cycle(enrolled, d(2025, 2, 10), &opts).unwrap();
    assert_eq!(feb_common.cutoff_date, d(2025, 2, 28));

    let feb_leap = compute_cycle(enrolled, d(2024, 2, 10), &opts).unwrap();
    assert_eq!(feb_leap.cutoff_date, d(2024, 2, 29));

    // The anchor itself never changes, so March is back to the 31st.
    let march = compute_cycle(enrolled, d(2025, 3, 1), &opts).unwrap();
    assert_eq!(march.cutoff_date, d(2025, 3, 31));
    assert_eq!(march.anchor_day, 31);
}

#[test]
fn leap_day_anchor_clamps_in_common_years() {
    let cycle = compute_cycle(d(2024, 2, 29), d(2025, 2, 1), &AlertOptions::default()).unwrap();
    assert_eq!(cycle.cutoff_date, d(2025, 2, 28));
    assert_eq!(cycle.anchor_day, 29);
}

#[test]
fn grace_window_can_cross_month_and_year_boundaries() {
    let opts = AlertOptions::default();

    let early = compute_cycle(d(2024, 8, 1), d(2025, 1, 1), &opts).unwrap();
    assert_eq!(early.cutoff_date, d(2025, 1, 1));
    assert_eq!(early.grace_window_start, d(2024, 12, 29));

    let late = compute_cycle(d(2024, 8, 30), d(2024, 12, 5), &opts).unwrap();
    assert_eq!(late.grace_window_end, d(2025, 1, 4));
}

#[test]
fn window_bounds_are_inclusive() {
    let cycle = compute_cycle(d(2025, 3, 15), d(2025, 6, 1), &AlertOptions::default()).unwrap();
    assert_eq!(cycle.position_of(d(2025, 6, 11)), WindowPosition::BeforeWindow);
    assert_eq!(cycle.position_of(d(2025, 6, 12)), WindowPosition::InWindow);
    assert_eq!(cycle.position_of(d(2025, 6, 15)), WindowPosition::InWindow);
    assert_eq!(cycle.position_of(d(2025, 6, 20)), WindowPosition::InWindow);
    assert_eq!(cycle.position_of(d(2025, 6, 21)), WindowPosition::AfterWindow);
}

#[test]
fn options_reshape_the_window() {
    let opts = AlertOptions { upcoming_horizon_days: 7, overdue_confirm_days: 0 };
    let cycle = compute_cycle(d(2025, 3, 15), d(2025, 6, 1), &opts).unwrap();
    assert_eq!(cycle.grace_window_start, d(2025, 6, 8));
    assert_eq!(cycle.grace_window_end, d(2025, 6, 15));
}

#[test]
fn last_missed_cutoff_steps_back_a_month_before_cutoff() {
    let cycle = compute_cycle(d(2025, 1, 31), d(2025, 3, 10), &AlertOptions::default()).unwrap();
    // March cutoff (31st) has not passed; previous cutoff is Feb 28.
    assert_eq!(cycle.last_missed_cutoff(d(2025, 3, 10)).unwrap(), d(2025, 2, 28));

    let after = compute_cycle(d(2025, 1, 10), d(2025, 3, 20), &AlertOptions::default()).unwrap();
    assert_eq!(after.last_missed_cutoff(d(2025, 3, 20)).unwrap(), d(2025, 3, 10));
}

#[test]
fn identical_inputs_identical_cycles() {
    let opts = AlertOptions::default();
    for day in 1..=28 {
        let reference = d(2025, 2, day);
        let a = compute_cycle(d(2023, 5, 31), reference, &opts).unwrap();
        let b = compute_cycle(d(2023, 5, 31), reference, &opts).unwrap();
        assert_eq!(a, b);
    }
}
