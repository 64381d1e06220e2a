//! Common fixture values

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, FixedClock, Money};
use rust_decimal_macros::dec;

/// Standard monetary fixtures
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// The default builder unit price: $50.00
    pub fn unit_price() -> Money {
        Self::usd(dec!(50.00))
    }

    pub fn zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Standard temporal fixtures
///
/// All anchored to a fixed instant so tests are deterministic.
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The pinned "now" used across the suite
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    /// A clock pinned to [`TemporalFixtures::now`]
    pub fn clock() -> FixedClock {
        FixedClock(Self::now())
    }

    /// A clock pinned well past [`TemporalFixtures::due_date`]
    pub fn late_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap())
    }

    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }
}
