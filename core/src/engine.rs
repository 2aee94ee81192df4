//! The billing engine, single entry point for collaborators.
//!
//! RULES:
//!   - Holds configuration and an optional clock, nothing else.
//!   - Every call recomputes from its inputs. No status is cached or
//!     remembered between calls.
//!   - The reference date is either passed explicitly or taken from the
//!     injected clock; never from the wall clock directly.

use crate::{
    board::{program_breakdown, status_board, ProgramCount, RosterFilter, StatusRow},
    classifier::{classify, PaymentStatus},
    clock::{resolve_reference_date, ClockSource},
    config::EngineConfig,
    cycle::{compute_cycle, BillingCycle},
    due_date::next_due_date,
    error::BillingResult,
    roster::{build_alerts, AlertRoster},
    subscriber::Subscriber,
    types::TenantId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A roster query as issued by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertQuery {
    pub tenant_id:      TenantId,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

pub struct BillingEngine {
    pub config: EngineConfig,
    clock:      Option<Box<dyn ClockSource>>,
}

impl BillingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, clock: None }
    }

    pub fn with_clock(mut self, clock: Box<dyn ClockSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn reference_date(&self, explicit: Option<NaiveDate>) -> BillingResult<NaiveDate> {
        resolve_reference_date(explicit, self.clock.as_deref())
    }

    /// Cycle for a subscriber, or `None` without an enrollment date.
    pub fn cycle(
        &self,
        subscriber: &Subscriber,
        reference: Option<NaiveDate>,
    ) -> BillingResult<Option<BillingCycle>> {
        let reference = self.reference_date(reference)?;
        subscriber
            .enrollment()?
            .map(|enrollment| compute_cycle(enrollment, reference, &self.config.alerts))
            .transpose()
    }

    pub fn status(
        &self,
        subscriber: &Subscriber,
        reference: Option<NaiveDate>,
    ) -> BillingResult<PaymentStatus> {
        if !subscriber.active {
            return Ok(PaymentStatus::Inactive);
        }
        let reference = self.reference_date(reference)?;
        match self.cycle(subscriber, Some(reference))? {
            Some(cycle) => classify(subscriber, &cycle, reference),
            None        => Ok(PaymentStatus::Unknown),
        }
    }

    pub fn next_due(
        &self,
        subscriber: &Subscriber,
        reference: Option<NaiveDate>,
    ) -> BillingResult<Option<NaiveDate>> {
        let reference = self.reference_date(reference)?;
        next_due_date(subscriber, reference)
    }

    pub fn alerts(&self, subscribers: &[Subscriber], query: &AlertQuery) -> BillingResult<AlertRoster> {
        let reference = self.reference_date(query.reference_date)?;
        Ok(build_alerts(subscribers, &query.tenant_id, reference, &self.config.alerts))
    }

    pub fn status_board(
        &self,
        subscribers: &[Subscriber],
        filter: &RosterFilter,
        reference: Option<NaiveDate>,
    ) -> BillingResult<Vec<StatusRow>> {
        let reference = self.reference_date(reference)?;
        Ok(status_board(subscribers, filter, reference, &self.config.alerts))
    }

    pub fn program_breakdown(&self, subscribers: &[Subscriber], tenant_id: &str) -> Vec<ProgramCount> {
        program_breakdown(subscribers, tenant_id)
    }
}
