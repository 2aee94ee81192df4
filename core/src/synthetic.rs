//! Seeded synthetic rosters for demos and property tests.
//!
//! The payment mix covers every classifier branch: withdrawn records,
//! payments this month, payments last month, stale payments, subscribers
//! who never paid, and (optionally) malformed enrollment dates.

use crate::{
    cycle::{anchored_date, previous_month},
    error::BillingResult,
    rng::RosterRng,
    subscriber::{DateField, Subscriber},
};
use chrono::{Datelike, NaiveDate};

const PROGRAMS: &[&str] = &["guitar", "piano", "drums", "bass", "voice"];
const INSTRUCTORS: &[&str] = &["i-01", "i-02", "i-03", "i-04", "i-05", "i-06"];
const FEES: &[f64] = &[450.0, 600.0, 750.0, 900.0];

pub struct RosterGenerator {
    rng:                RosterRng,
    pub withdrawn_rate: f64,
    pub malformed_rate: f64,
}

impl RosterGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng:            RosterRng::new(seed),
            withdrawn_rate: 0.08,
            malformed_rate: 0.0,
        }
    }

    pub fn with_malformed_rate(mut self, rate: f64) -> Self {
        self.malformed_rate = rate;
        self
    }

    /// `n` subscribers for `tenant_id`, enrolled before `reference`.
    pub fn generate(
        &mut self,
        tenant_id: &str,
        n: usize,
        reference: NaiveDate,
    ) -> BillingResult<Vec<Subscriber>> {
        let mut roster = Vec::with_capacity(n);
        for i in 0..n {
            roster.push(self.generate_one(tenant_id, i, reference)?);
        }
        Ok(roster)
    }

    fn generate_one(
        &mut self,
        tenant_id: &str,
        index: usize,
        reference: NaiveDate,
    ) -> BillingResult<Subscriber> {
        let anchor_day = self.rng.between(1, 31);
        let months_enrolled = self.rng.between(1, 24);
        let (ey, em) = months_back(reference, months_enrolled);
        let enrollment = anchored_date(ey, em, anchor_day)?;

        let mut subscriber = Subscriber::new(format!("s-{index:04}"), tenant_id, enrollment)
            .with_name(format!("Subscriber {index:04}"))
            .with_fee(*self.rng.pick(FEES))
            .with_program(*self.rng.pick(PROGRAMS))
            .with_instructor(*self.rng.pick(INSTRUCTORS));

        subscriber.last_payment_date = self.last_payment(reference, months_enrolled)?;

        if self.rng.chance(self.malformed_rate) {
            subscriber.enrollment_date =
                DateField::Invalid(format!("{anchor_day:02}/{em:02}/{ey}"));
        }
        if self.rng.chance(self.withdrawn_rate) {
            subscriber = subscriber.withdrawn();
        }
        Ok(subscriber)
    }

    fn last_payment(&mut self, reference: NaiveDate, months_enrolled: u32) -> BillingResult<DateField> {
        let roll = self.rng.next_f64();
        let back = if roll < 0.35 {
            0
        } else if roll < 0.75 {
            1
        } else if roll < 0.90 {
            self.rng.between(2, 6).min(months_enrolled)
        } else {
            return Ok(DateField::Missing);
        };
        let (y, m) = months_back(reference, back);
        // Payments this month never lie in the future.
        let max_day = if back == 0 { reference.day() } else { 31 };
        let day = self.rng.between(1, max_day);
        Ok(DateField::Valid(anchored_date(y, m, day)?))
    }
}

fn months_back(reference: NaiveDate, months: u32) -> (i32, u32) {
    (0..months).fold((reference.year(), reference.month()), |(y, m), _| previous_month(y, m))
}
