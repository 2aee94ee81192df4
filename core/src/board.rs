//! Status board and program breakdown (roster list views).
//!
//! These are display paths: a record with malformed dates shows up as
//! `unknown` here. The typed error is still available from `classify`
//! and from the alert roster's `summary.errors`.

use crate::{
    classifier::PaymentStatus,
    config::AlertOptions,
    due_date::{days_until, display_due_date},
    roster::{assess, Assessment},
    subscriber::Subscriber,
    types::{DayCount, SubscriberId, TenantId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNASSIGNED_PROGRAM: &str = "unassigned";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFilter {
    pub tenant_id:      TenantId,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub program:        Option<String>,
    #[serde(default)]
    pub instructor:     Option<String>,
    #[serde(default)]
    pub active_only:    bool,
}

impl RosterFilter {
    pub fn for_tenant(tenant_id: impl Into<TenantId>) -> Self {
        Self { tenant_id: tenant_id.into(), ..Self::default() }
    }

    fn admits(&self, s: &Subscriber) -> bool {
        let field_matches = |wanted: &Option<String>, actual: &Option<String>| match wanted {
            None    => true,
            Some(w) => actual.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(w)),
        };
        s.tenant_id == self.tenant_id
            && (!self.active_only || s.active)
            && field_matches(&self.program, &s.program)
            && field_matches(&self.instructor, &s.instructor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub subscriber_id:  SubscriberId,
    pub name:           Option<String>,
    pub status:         PaymentStatus,
    pub next_due_date:  Option<NaiveDate>,
    pub days_until_due: Option<DayCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCount {
    pub program:  String,
    pub active:   usize,
    pub inactive: usize,
}

/// One row per matching subscriber, ordered by subscriber id.
pub fn status_board(
    subscribers: &[Subscriber],
    filter: &RosterFilter,
    reference: NaiveDate,
    options: &AlertOptions,
) -> Vec<StatusRow> {
    let mut rows: Vec<StatusRow> = subscribers
        .iter()
        .filter(|s| filter.admits(s))
        .map(|s| {
            let status = match assess(s, reference, options) {
                Ok(Assessment::Current)     => PaymentStatus::Current,
                Ok(Assessment::Upcoming(_)) => PaymentStatus::Upcoming,
                Ok(Assessment::Overdue(_))  => PaymentStatus::Overdue,
                Ok(Assessment::Inactive)    => PaymentStatus::Inactive,
                Ok(Assessment::Unknown) | Err(_) => PaymentStatus::Unknown,
            };
            // Withdrawn subscribers have no upcoming due date.
            let next_due_date = if s.active { display_due_date(s, reference) } else { None };
            StatusRow {
                subscriber_id:  s.id.clone(),
                name:           s.name.clone(),
                status,
                next_due_date,
                days_until_due: next_due_date.map(|d| days_until(d, reference)),
            }
        })
        .filter(|row| filter.payment_status.map_or(true, |wanted| row.status == wanted))
        .collect();
    rows.sort_by(|a, b| a.subscriber_id.cmp(&b.subscriber_id));
    rows
}

/// Active/inactive headcount per program for one tenant.
pub fn program_breakdown(subscribers: &[Subscriber], tenant_id: &str) -> Vec<ProgramCount> {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for s in subscribers.iter().filter(|s| s.tenant_id == tenant_id) {
        let program = s.program.clone().unwrap_or_else(|| UNASSIGNED_PROGRAM.to_string());
        let entry = counts.entry(program).or_default();
        if s.active { entry.0 += 1 } else { entry.1 += 1 }
    }
    counts
        .into_iter()
        .map(|(program, (active, inactive))| ProgramCount { program, active, inactive })
        .collect()
}
