//! Fixed-point money arithmetic.
//!
//! Amounts are carried as whole cents in an `i64` so that sums are exact.
//! Conversion to [`Decimal`] only happens at the edges.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use thiserror::Error;

/// Number of fractional digits kept for every amount.
pub const SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// Why a decimal amount has no exact cent representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CentsError {
    #[error("is not a whole number of cents")]
    SubCent,
    #[error("is out of range")]
    OutOfRange,
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount into cents.
    ///
    /// Fails when the value carries sub-cent precision or does not fit into
    /// the cent range.
    pub fn try_from_decimal(value: Decimal) -> Result<Self, CentsError> {
        let scaled = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(CentsError::OutOfRange)?;
        if !scaled.fract().is_zero() {
            return Err(CentsError::SubCent);
        }
        scaled.to_i64().map(Money).ok_or(CentsError::OutOfRange)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Mean over `count` items, rounded half away from zero to the cent.
    /// An empty set averages to zero.
    pub fn average_over(self, count: usize) -> Money {
        if count == 0 {
            return Money::ZERO;
        }
        let mean = (Decimal::from(self.0) / Decimal::from(count))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        // The mean of a set never exceeds its total, so it always fits.
        Money(mean.to_i64().unwrap_or(self.0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
