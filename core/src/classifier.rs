//! Payment-status classifier.
//!
//! RULES (evaluated in order, first match wins):
//!   1. Withdrawn subscriber                         → inactive (terminal)
//!   2. No enrollment date                           → unknown
//!   3. Paid in the reference month                  → current
//!   4. Did not pay in the previous month            → overdue
//!   5. Paid previous month, inside grace window     → upcoming
//!   6. Paid previous month, past grace window       → overdue
//!   7. Paid previous month, before grace window     → current
//!
//! Rules 3-7 partition the (paid this month, paid previous month,
//! window position) space: for any realisable combination exactly one
//! of them matches.

use crate::{
    cycle::{previous_month, BillingCycle, WindowPosition},
    error::BillingResult,
    subscriber::Subscriber,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Current,
    Upcoming,
    Overdue,
    Inactive,
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current  => "current",
            Self::Upcoming => "upcoming",
            Self::Overdue  => "overdue",
            Self::Inactive => "inactive",
            Self::Unknown  => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Current  => "Current",
            Self::Upcoming => "Due soon",
            Self::Overdue  => "Overdue",
            Self::Inactive => "Inactive",
            Self::Unknown  => "No enrollment date",
        }
    }

    /// Statuses that put a subscriber on the alert roster.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Upcoming | Self::Overdue)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current"  => Some(Self::Current),
            "upcoming" => Some(Self::Upcoming),
            "overdue"  => Some(Self::Overdue),
            "inactive" => Some(Self::Inactive),
            "unknown"  => Some(Self::Unknown),
            _          => None,
        }
    }
}

/// Payment facts for an active subscriber with a known cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentFacts {
    pub paid_this_month:     bool,
    pub paid_previous_month: bool,
    pub position:            WindowPosition,
}

impl PaymentFacts {
    pub fn gather(
        last_payment: Option<NaiveDate>,
        cycle: &BillingCycle,
        reference: NaiveDate,
    ) -> Self {
        let this_month = (reference.year(), reference.month());
        let prior_month = previous_month(reference.year(), reference.month());
        let paid_in = |ym: (i32, u32)| {
            last_payment.is_some_and(|d| (d.year(), d.month()) == ym)
        };
        Self {
            paid_this_month:     paid_in(this_month),
            paid_previous_month: paid_in(prior_month),
            position:            cycle.position_of(reference),
        }
    }

    /// A single last-payment date cannot fall in two different months.
    pub fn is_realisable(&self) -> bool {
        !(self.paid_this_month && self.paid_previous_month)
    }
}

/// The classification branches for active subscribers with an enrollment date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    PaidThisMonth,
    SkippedPreviousCycle,
    InsideGraceWindow,
    PastGraceWindow,
    BeforeGraceWindow,
}

impl Rule {
    /// Evaluation order. NEVER reorder.
    pub const ORDERED: [Rule; 5] = [
        Rule::PaidThisMonth,
        Rule::SkippedPreviousCycle,
        Rule::InsideGraceWindow,
        Rule::PastGraceWindow,
        Rule::BeforeGraceWindow,
    ];

    pub fn matches(&self, f: &PaymentFacts) -> bool {
        let paid_prior_only = !f.paid_this_month && f.paid_previous_month;
        match self {
            Rule::PaidThisMonth        => f.paid_this_month,
            Rule::SkippedPreviousCycle => !f.paid_this_month && !f.paid_previous_month,
            Rule::InsideGraceWindow    => paid_prior_only && f.position == WindowPosition::InWindow,
            Rule::PastGraceWindow      => paid_prior_only && f.position == WindowPosition::AfterWindow,
            Rule::BeforeGraceWindow    => paid_prior_only && f.position == WindowPosition::BeforeWindow,
        }
    }

    pub fn status(&self) -> PaymentStatus {
        match self {
            Rule::PaidThisMonth        => PaymentStatus::Current,
            Rule::SkippedPreviousCycle => PaymentStatus::Overdue,
            Rule::InsideGraceWindow    => PaymentStatus::Upcoming,
            Rule::PastGraceWindow      => PaymentStatus::Overdue,
            Rule::BeforeGraceWindow    => PaymentStatus::Current,
        }
    }

    /// First rule that matches, in evaluation order.
    pub fn select(facts: &PaymentFacts) -> Option<Rule> {
        Rule::ORDERED.into_iter().find(|r| r.matches(facts))
    }
}

/// Status for a set of facts. Falls back to `current` if no rule matches,
/// which the partition above makes unreachable.
pub fn evaluate(facts: &PaymentFacts) -> PaymentStatus {
    match Rule::select(facts) {
        Some(rule) => rule.status(),
        None => {
            log::warn!("No classification rule matched {facts:?}; treating as current");
            PaymentStatus::Current
        }
    }
}

/// Classify one subscriber against the cycle containing `reference`.
///
/// Withdrawn subscribers are `inactive` whatever their dates look like.
/// A missing enrollment date yields `unknown`; malformed dates surface as
/// `InvalidDate` so the caller decides how to present them.
pub fn classify(
    subscriber: &Subscriber,
    cycle: &BillingCycle,
    reference: NaiveDate,
) -> BillingResult<PaymentStatus> {
    if !subscriber.active {
        return Ok(PaymentStatus::Inactive);
    }
    if subscriber.enrollment()?.is_none() {
        return Ok(PaymentStatus::Unknown);
    }
    let last_payment = subscriber.last_payment()?;
    let facts = PaymentFacts::gather(last_payment, cycle, reference);
    let status = evaluate(&facts);
    log::debug!(
        "Subscriber {} classified {} (cutoff {}, facts {:?})",
        subscriber.id, status.as_str(), cycle.cutoff_date, facts
    );
    Ok(status)
}
