use crate::domain::value_objects::{MarketId, Price};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLC record for one market, unique per `(market, day)`.
///
/// Created on the first trade of the day; high/low/close are folded on every
/// subsequent trade; immutable once the day rolls over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryBucket {
    pub market_id: MarketId,
    pub day: NaiveDate,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

impl PriceHistoryBucket {
    /// Open a new daily bucket from the first traded price.
    pub fn open_with(market_id: MarketId, day: NaiveDate, price: Price) -> Self {
        PriceHistoryBucket {
            market_id,
            day,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    /// Fold another trade of the same day into the bucket.
    pub fn fold(&mut self, price: Price) {
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
    }
}

/// Day-over-day price movement, computed from two consecutive closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceDirection {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub amount: rust_decimal::Decimal,
    /// Percent change relative to the earlier close.
    pub percent: rust_decimal::Decimal,
    pub direction: PriceDirection,
}

impl PriceChange {
    pub fn between(previous_close: Price, latest_close: Price) -> Option<Self> {
        use rust_decimal::Decimal;

        if previous_close.inner() <= Decimal::ZERO {
            return None;
        }
        let amount = latest_close.inner() - previous_close.inner();
        let percent = amount / previous_close.inner() * Decimal::from(100);
        let direction = if amount > Decimal::ZERO {
            PriceDirection::Up
        } else if amount < Decimal::ZERO {
            PriceDirection::Down
        } else {
            PriceDirection::Neutral
        };
        Some(PriceChange {
            amount,
            percent,
            direction,
        })
    }
}
