//! Price-level market entity.
//!
//! Markets do not match counterparties; the state itself is the
//! counterparty. Each market holds a stepped price curve: every
//! `volume_per_level` units bought moves the price one level up, selling
//! moves it back down, and the tradable buy/sell prices are the level's
//! base price plus/minus a percentage spread.

use crate::domain::value_objects::{MarketId, Price, RegionId, Timestamp, TradedGood};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum tradable base price.
pub const MIN_PRICE: Decimal = dec!(0.01);

/// Smallest currency unit.
pub const ONE_CENT: Decimal = dec!(0.01);

/// Spread applied on resource markets.
pub const RESOURCE_SPREAD: Decimal = dec!(0.10);

/// Spread applied on gold/currency markets.
pub const GOLD_SPREAD: Decimal = dec!(0.05);

/// Errors rejecting an invalid market definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDefinitionError {
    #[error("volume_per_level must be positive")]
    NonPositiveVolume,

    #[error("price_adjustment_per_level must not be negative")]
    NegativeAdjustment,

    #[error("spread must be in [0, 1)")]
    InvalidSpread,

    #[error("initial_price must be positive")]
    NonPositivePrice,
}

/// One price-level market: a traded good on one region's market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevelMarket {
    pub id: MarketId,
    /// Base unit price at level 0, already quality-adjusted.
    pub initial_price: Price,
    /// Current price level; may go negative (the base price floors at
    /// [`MIN_PRICE`] regardless).
    pub price_level: i32,
    /// Units already traded at the current level, in `[0, volume_per_level)`.
    pub progress_within_level: u32,
    /// Units that must trade before the level steps.
    pub volume_per_level: u32,
    /// Marginal base-price change per level.
    pub price_adjustment_per_level: Decimal,
    /// Percentage spread between base price and tradable buy/sell prices.
    pub spread: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PriceLevelMarket {
    pub fn new(
        id: MarketId,
        initial_price: Price,
        volume_per_level: u32,
        price_adjustment_per_level: Decimal,
        spread: Decimal,
    ) -> Result<Self, MarketDefinitionError> {
        if volume_per_level == 0 {
            return Err(MarketDefinitionError::NonPositiveVolume);
        }
        if price_adjustment_per_level < Decimal::ZERO {
            return Err(MarketDefinitionError::NegativeAdjustment);
        }
        if spread < Decimal::ZERO || spread >= Decimal::ONE {
            return Err(MarketDefinitionError::InvalidSpread);
        }
        if initial_price.inner() <= Decimal::ZERO {
            return Err(MarketDefinitionError::NonPositivePrice);
        }

        let now = chrono::Utc::now();
        Ok(PriceLevelMarket {
            id,
            initial_price,
            price_level: 0,
            progress_within_level: 0,
            volume_per_level,
            price_adjustment_per_level,
            spread,
            created_at: now,
            updated_at: now,
        })
    }

    /// A resource market with the standard 10% spread.
    pub fn resource(
        region: RegionId,
        good: TradedGood,
        initial_price: Price,
        volume_per_level: u32,
        price_adjustment_per_level: Decimal,
    ) -> Result<Self, MarketDefinitionError> {
        Self::new(
            MarketId { region, good },
            initial_price,
            volume_per_level,
            price_adjustment_per_level,
            RESOURCE_SPREAD,
        )
    }

    /// A gold/currency exchange market with the standard 5% spread.
    pub fn gold(
        region: RegionId,
        initial_rate: Price,
        volume_per_level: u32,
        price_adjustment_per_level: Decimal,
    ) -> Result<Self, MarketDefinitionError> {
        Self::new(
            MarketId::gold(region),
            initial_rate,
            volume_per_level,
            price_adjustment_per_level,
            GOLD_SPREAD,
        )
    }

    /// Seed an existing level/progress (used when loading persisted markets).
    pub fn with_state(mut self, price_level: i32, progress_within_level: u32) -> Self {
        self.price_level = price_level;
        self.progress_within_level = progress_within_level.min(self.volume_per_level - 1);
        self
    }

    // ========== Pricing ==========

    /// Theoretical base price at an arbitrary level, floored at [`MIN_PRICE`].
    pub fn base_price_at(&self, level: i32) -> Price {
        let calculated =
            self.initial_price.inner() + Decimal::from(level) * self.price_adjustment_per_level;
        Price::from(calculated.max(MIN_PRICE))
    }

    /// Current theoretical base price.
    pub fn base_price(&self) -> Price {
        self.base_price_at(self.price_level)
    }

    /// Price users pay per unit at an arbitrary level: base plus spread,
    /// rounded up to the cent, never below `MIN_PRICE + ONE_CENT`.
    pub fn buy_unit_price_at(&self, level: i32) -> Price {
        let base = self.base_price_at(level);
        let with_spread = (base * (Decimal::ONE + self.spread)).ceil_to_cent();
        with_spread.max(Price::from(MIN_PRICE + ONE_CENT))
    }

    /// Price users receive per unit at an arbitrary level: base minus spread,
    /// rounded down to the cent, never below `MIN_PRICE`.
    pub fn sell_unit_price_at(&self, level: i32) -> Price {
        let base = self.base_price_at(level);
        let with_spread = (base * (Decimal::ONE - self.spread)).floor_to_cent();
        with_spread.max(Price::from(MIN_PRICE))
    }

    pub fn buy_unit_price(&self) -> Price {
        self.buy_unit_price_at(self.price_level)
    }

    pub fn sell_unit_price(&self) -> Price {
        self.sell_unit_price_at(self.price_level)
    }

    // ========== Level thresholds ==========

    /// Units that must be bought to step the level up.
    pub fn units_to_next_level_up(&self) -> u32 {
        self.volume_per_level - self.progress_within_level
    }

    /// Units that must be sold to step the level down.
    ///
    /// Selling one more unit than the current progress triggers the
    /// decrement; progress is then re-seeded to `volume_per_level - 1`, so
    /// up-steps and down-steps are deliberately not inverses.
    pub fn units_to_level_down(&self) -> u32 {
        self.progress_within_level + 1
    }

    // ========== Mutation ==========

    /// Apply the level/progress a completed trade settles at.
    ///
    /// The only mutator; callers hold the market's exclusive lock.
    pub fn apply_trade(&mut self, price_level: i32, progress_within_level: u32, now: Timestamp) {
        debug_assert!(progress_within_level < self.volume_per_level);
        self.price_level = price_level;
        self.progress_within_level = progress_within_level;
        self.updated_at = now;
    }
}
