//! Billing-cycle status engine for subscriber rosters.
//!
//! Given a subscriber's enrollment anchor date, last payment and a
//! reference date, classify them (current / upcoming / overdue /
//! inactive / unknown), compute their next due date, and aggregate a
//! tenant-wide alert roster. Everything here is a pure function of its
//! inputs; the roster store and synthetic generator only feed it.

pub mod board;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod due_date;
pub mod engine;
pub mod error;
pub mod rng;
pub mod roster;
pub mod store;
pub mod subscriber;
pub mod synthetic;
pub mod types;
