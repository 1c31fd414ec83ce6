use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A non-negative unit price in some currency scope.
///
/// All monetary arithmetic in the engine is fixed-point decimal; floats are
/// never used for prices or balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, &'static str> {
        if value < Decimal::ZERO {
            return Err("Price cannot be negative");
        }
        Ok(Price(value))
    }

    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = s.parse::<Decimal>()?;
        Ok(Price(decimal))
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round up to the smallest currency unit (cent). Used for the buy spread.
    pub fn ceil_to_cent(&self) -> Price {
        Price(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity),
        )
    }

    /// Round down to the smallest currency unit (cent). Used for the sell spread.
    pub fn floor_to_cent(&self) -> Price {
        Price(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity),
        )
    }

    /// Exact total for `qty` units at this unit price.
    pub fn mul_qty(&self, qty: u32) -> Decimal {
        self.0 * Decimal::from(qty)
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Price(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Decimal {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Price {
    type Output = Price;
    fn add(self, rhs: Self) -> Self::Output {
        Price(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;
    fn sub(self, rhs: Self) -> Self::Output {
        Price(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Price;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Price(self.0 * rhs)
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::ZERO
    }
}
