//! Roster aggregation: the alert view over one tenant.
//!
//! RULES:
//!   - One malformed record never aborts the batch. It is excluded from
//!     both alert buckets and listed in `summary.errors`.
//!   - Every tenant record lands in exactly one of: upcoming, overdue,
//!     current, inactive, unknown, errors.
//!   - Output order is fixed (see `sort_buckets`) and does not depend on
//!     how the parallel map was scheduled.

use crate::{
    classifier::{classify, PaymentStatus},
    config::AlertOptions,
    cycle::compute_cycle,
    error::{BillingResult, ErrorKind},
    subscriber::Subscriber,
    types::{DayCount, SubscriberId, TenantId},
};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingAlert {
    pub subscriber:      Subscriber,
    pub cutoff_date:     NaiveDate,
    /// Days until the cutoff; 0 once the cutoff itself has been reached.
    pub days_remaining:  DayCount,
    /// Days left before the grace window closes.
    pub grace_days_left: DayCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueAlert {
    pub subscriber:    Subscriber,
    /// Most recent cutoff strictly before the reference date.
    pub missed_cutoff: NaiveDate,
    pub days_overdue:  DayCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    pub subscriber_id: SubscriberId,
    pub kind:          ErrorKind,
    pub detail:        String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    /// Tenant records considered, active and inactive.
    pub total:                    usize,
    pub active:                   usize,
    pub current:                  usize,
    pub upcoming:                 usize,
    pub overdue:                  usize,
    pub inactive:                 usize,
    pub unknown:                  usize,
    /// upcoming + overdue
    pub pending:                  usize,
    pub expected_monthly_revenue: f64,
    pub outstanding_fees:         f64,
    pub errors:                   Vec<RecordError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRoster {
    pub tenant_id:      TenantId,
    pub reference_date: NaiveDate,
    pub upcoming:       Vec<UpcomingAlert>,
    pub overdue:        Vec<OverdueAlert>,
    pub summary:        RosterSummary,
}

/// Outcome of assessing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Inactive,
    Unknown,
    Current,
    Upcoming(UpcomingAlert),
    Overdue(OverdueAlert),
}

// ── Per-record assessment ────────────────────────────────────────────────────

/// Classify one subscriber and attach its day counts.
pub fn assess(
    subscriber: &Subscriber,
    reference: NaiveDate,
    options: &AlertOptions,
) -> BillingResult<Assessment> {
    if !subscriber.active {
        return Ok(Assessment::Inactive);
    }
    let Some(enrollment) = subscriber.enrollment()? else {
        return Ok(Assessment::Unknown);
    };
    let cycle = compute_cycle(enrollment, reference, options)?;

    let assessment = match classify(subscriber, &cycle, reference)? {
        PaymentStatus::Current  => Assessment::Current,
        PaymentStatus::Inactive => Assessment::Inactive,
        PaymentStatus::Unknown  => Assessment::Unknown,
        PaymentStatus::Upcoming => Assessment::Upcoming(UpcomingAlert {
            subscriber:      subscriber.clone(),
            cutoff_date:     cycle.cutoff_date,
            days_remaining:  cycle.days_to_cutoff(reference).max(0),
            grace_days_left: (cycle.grace_window_end - reference).num_days(),
        }),
        PaymentStatus::Overdue => {
            let missed_cutoff = cycle.last_missed_cutoff(reference)?;
            Assessment::Overdue(OverdueAlert {
                subscriber: subscriber.clone(),
                missed_cutoff,
                days_overdue: (reference - missed_cutoff).num_days(),
            })
        }
    };
    Ok(assessment)
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Build the alert roster for one tenant as of `reference`.
pub fn build_alerts(
    subscribers: &[Subscriber],
    tenant_id: &str,
    reference: NaiveDate,
    options: &AlertOptions,
) -> AlertRoster {
    let tenant: Vec<&Subscriber> = subscribers
        .iter()
        .filter(|s| s.tenant_id == tenant_id)
        .collect();

    let outcomes: Vec<(&Subscriber, BillingResult<Assessment>)> = tenant
        .par_iter()
        .map(|s| (*s, assess(s, reference, options)))
        .collect();

    let mut roster = AlertRoster {
        tenant_id:      tenant_id.to_string(),
        reference_date: reference,
        upcoming:       Vec::new(),
        overdue:        Vec::new(),
        summary:        RosterSummary::default(),
    };

    for (subscriber, outcome) in outcomes {
        let summary = &mut roster.summary;
        summary.total += 1;
        if subscriber.active {
            summary.active += 1;
            summary.expected_monthly_revenue += subscriber.monthly_fee;
        }
        match outcome {
            Ok(Assessment::Inactive)    => summary.inactive += 1,
            Ok(Assessment::Unknown)     => summary.unknown += 1,
            Ok(Assessment::Current)     => summary.current += 1,
            Ok(Assessment::Upcoming(a)) => roster.upcoming.push(a),
            Ok(Assessment::Overdue(a))  => {
                summary.outstanding_fees += a.subscriber.monthly_fee;
                roster.overdue.push(a);
            }
            Err(e) => {
                log::warn!(
                    "Excluding subscriber {} of tenant {tenant_id} from alerts: {e}",
                    subscriber.id
                );
                summary.errors.push(RecordError {
                    subscriber_id: subscriber.id.clone(),
                    kind:          e.kind(),
                    detail:        e.to_string(),
                });
            }
        }
    }

    sort_buckets(&mut roster);
    let summary = &mut roster.summary;
    summary.upcoming = roster.upcoming.len();
    summary.overdue = roster.overdue.len();
    summary.pending = summary.upcoming + summary.overdue;

    log::info!(
        "Alerts for tenant {tenant_id} as of {reference}: {} upcoming, {} overdue, {} current, {} errors",
        summary.upcoming, summary.overdue, summary.current, summary.errors.len()
    );
    roster
}

/// Most urgent first. Upcoming entries past their cutoff all report zero
/// days remaining, so the closing grace window decides; then subscriber id.
fn sort_buckets(roster: &mut AlertRoster) {
    roster.upcoming.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.grace_days_left.cmp(&b.grace_days_left))
            .then_with(|| a.subscriber.id.cmp(&b.subscriber.id))
    });
    roster.overdue.sort_by(|a, b| {
        b.days_overdue
            .cmp(&a.days_overdue)
            .then_with(|| a.subscriber.id.cmp(&b.subscriber.id))
    });
    roster
        .summary
        .errors
        .sort_by(|a, b| a.subscriber_id.cmp(&b.subscriber_id));
}
