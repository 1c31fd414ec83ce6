//! Multi-level trade quoting.
//!
//! A pure function of `(market state, quantity)`: walks the simulated price
//! levels a trade would cross and produces the per-level breakdown, the
//! exact total, and the level/progress the market settles at. Calling it
//! twice without an intervening market mutation yields identical results,
//! which is what makes a quote safe to show to a user before they confirm.

use crate::domain::entities::PriceLevelMarket;
use crate::domain::value_objects::{MarketId, Price, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    #[error("quantity must be positive")]
    InvalidAmount,
}

/// Units traded at one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSegment {
    pub quantity: u32,
    pub unit_price: Price,
}

/// An ephemeral, non-binding trade computation.
///
/// Not authoritative once the market mutates; the executor re-derives the
/// canonical quote under the market lock before applying anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub market_id: MarketId,
    pub side: Side,
    pub quantity: u32,
    /// Ordered per-level segments; quantities sum to `quantity`.
    pub breakdown: Vec<PriceSegment>,
    /// Exact sum of `segment.quantity * segment.unit_price`.
    pub total: Decimal,
    /// The market's price level when this quote was computed.
    pub observed_price_level: i32,
    pub resulting_price_level: i32,
    pub resulting_progress: u32,
}

impl TradeQuote {
    /// Volume-weighted average unit price; recorded into the OHLC history.
    pub fn average_unit_price(&self) -> Price {
        Price::from(self.total / Decimal::from(self.quantity))
    }
}

pub struct TradeCalculator;

impl TradeCalculator {
    pub fn quote(
        market: &PriceLevelMarket,
        side: Side,
        quantity: u32,
    ) -> Result<TradeQuote, QuoteError> {
        match side {
            Side::Buy => Self::quote_buy(market, quantity),
            Side::Sell => Self::quote_sell(market, quantity),
        }
    }

    /// Cost breakdown for buying `quantity` units, crossing levels upward.
    pub fn quote_buy(market: &PriceLevelMarket, quantity: u32) -> Result<TradeQuote, QuoteError> {
        if quantity == 0 {
            return Err(QuoteError::InvalidAmount);
        }

        let mut breakdown = Vec::new();
        let mut total = Decimal::ZERO;
        let mut remaining = quantity;
        let mut level = market.price_level;
        let mut progress = market.progress_within_level;

        while remaining > 0 {
            let unit_price = market.buy_unit_price_at(level);
            let room = market.volume_per_level - progress;
            let taken = remaining.min(room);

            breakdown.push(PriceSegment {
                quantity: taken,
                unit_price,
            });
            total += unit_price.mul_qty(taken);
            remaining -= taken;

            if taken == room {
                level += 1;
                progress = 0;
            } else {
                progress += taken;
            }
        }

        Ok(TradeQuote {
            market_id: market.id.clone(),
            side: Side::Buy,
            quantity,
            breakdown,
            total,
            observed_price_level: market.price_level,
            resulting_price_level: level,
            resulting_progress: progress,
        })
    }

    /// Proceeds breakdown for selling `quantity` units, crossing levels
    /// downward. A down-step re-seeds progress to `volume_per_level - 1`,
    /// so selling is not the mirror image of buying.
    pub fn quote_sell(market: &PriceLevelMarket, quantity: u32) -> Result<TradeQuote, QuoteError> {
        if quantity == 0 {
            return Err(QuoteError::InvalidAmount);
        }

        let mut breakdown = Vec::new();
        let mut total = Decimal::ZERO;
        let mut remaining = quantity;
        let mut level = market.price_level;
        let mut progress = market.progress_within_level;

        while remaining > 0 {
            let unit_price = market.sell_unit_price_at(level);
            let room = progress + 1;
            let taken = remaining.min(room);

            breakdown.push(PriceSegment {
                quantity: taken,
                unit_price,
            });
            total += unit_price.mul_qty(taken);
            remaining -= taken;

            if taken == room {
                level -= 1;
                progress = market.volume_per_level - 1;
            } else {
                progress -= taken;
            }
        }

        Ok(TradeQuote {
            market_id: market.id.clone(),
            side: Side::Sell,
            quantity,
            breakdown,
            total,
            observed_price_level: market.price_level,
            resulting_price_level: level,
            resulting_progress: progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{GoodId, RegionId, TradedGood};
    use rust_decimal_macros::dec;

    fn grain_market() -> PriceLevelMarket {
        PriceLevelMarket::resource(
            RegionId(1),
            TradedGood::resource(GoodId::new("grain").unwrap(), 0),
            Price::from(dec!(10.00)),
            200,
            dec!(0.10),
        )
        .unwrap()
    }

    #[test]
    fn test_buy_crossing_one_level() {
        // 150/200 progress at level 0: 50 units left at 11.00, then 50 at 11.11.
        let market = grain_market().with_state(0, 150);
        let quote = TradeCalculator::quote_buy(&market, 100).unwrap();

        assert_eq!(quote.breakdown.len(), 2);
        assert_eq!(quote.breakdown[0].quantity, 50);
        assert_eq!(quote.breakdown[0].unit_price, Price::from(dec!(11.00)));
        assert_eq!(quote.breakdown[1].quantity, 50);
        assert_eq!(quote.breakdown[1].unit_price, Price::from(dec!(11.11)));
        assert_eq!(quote.total, dec!(1105.50));
        assert_eq!(quote.resulting_price_level, 1);
        assert_eq!(quote.resulting_progress, 50);
    }

    #[test]
    fn test_buy_exactly_to_threshold_steps_level() {
        let market = grain_market().with_state(0, 150);
        let quote = TradeCalculator::quote_buy(&market, 50).unwrap();
        assert_eq!(quote.breakdown.len(), 1);
        assert_eq!(quote.resulting_price_level, 1);
        assert_eq!(quote.resulting_progress, 0);
    }

    #[test]
    fn test_sell_within_level() {
        let market = grain_market().with_state(0, 150);
        let quote = TradeCalculator::quote_sell(&market, 100).unwrap();
        assert_eq!(quote.breakdown.len(), 1);
        assert_eq!(quote.breakdown[0].unit_price, Price::from(dec!(9.00)));
        assert_eq!(quote.total, dec!(900.00));
        assert_eq!(quote.resulting_price_level, 0);
        assert_eq!(quote.resulting_progress, 50);
    }

    #[test]
    fn test_sell_down_step_reseeds_progress() {
        // Selling progress + 1 units crosses down and re-seeds to volume - 1.
        let market = grain_market().with_state(2, 10);
        let quote = TradeCalculator::quote_sell(&market, 11).unwrap();
        assert_eq!(quote.breakdown.len(), 1);
        assert_eq!(quote.resulting_price_level, 1);
        assert_eq!(quote.resulting_progress, 199);
    }

    #[test]
    fn test_sell_crossing_levels_prices_each_level() {
        let market = grain_market().with_state(2, 10);
        // 11 units at level 2 (10.20 * 0.9 = 9.18), then 5 at level 1 (9.09).
        let quote = TradeCalculator::quote_sell(&market, 16).unwrap();
        assert_eq!(quote.breakdown.len(), 2);
        assert_eq!(quote.breakdown[0].quantity, 11);
        assert_eq!(quote.breakdown[0].unit_price, Price::from(dec!(9.18)));
        assert_eq!(quote.breakdown[1].quantity, 5);
        assert_eq!(quote.breakdown[1].unit_price, Price::from(dec!(9.09)));
        assert_eq!(quote.total, dec!(11) * dec!(9.18) + dec!(5) * dec!(9.09));
        assert_eq!(quote.resulting_price_level, 1);
        assert_eq!(quote.resulting_progress, 194);
    }

    #[test]
    fn test_breakdown_quantities_sum_to_requested() {
        let market = grain_market().with_state(0, 137);
        for qty in [1u32, 63, 200, 999, 4321] {
            let quote = TradeCalculator::quote_buy(&market, qty).unwrap();
            let sum: u32 = quote.breakdown.iter().map(|s| s.quantity).sum();
            assert_eq!(sum, qty);
            let expected: Decimal = quote
                .breakdown
                .iter()
                .map(|s| s.unit_price.mul_qty(s.quantity))
                .sum();
            assert_eq!(quote.total, expected);
        }
    }

    #[test]
    fn test_quote_is_deterministic() {
        let market = grain_market().with_state(3, 77);
        let first = TradeCalculator::quote_buy(&market, 5000).unwrap();
        let second = TradeCalculator::quote_buy(&market, 5000).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_buy_then_sell_crosses_levels_asymmetrically() {
        // Up-steps trigger on the (volume - progress)th unit, down-steps on
        // the (progress + 1)th: the same 100 units segment as 50/50 on the
        // way up but 51/49 on the way down.
        let market = grain_market().with_state(0, 150);
        let buy = TradeCalculator::quote_buy(&market, 100).unwrap();
        assert_eq!(buy.breakdown[0].quantity, 50);
        assert_eq!(buy.breakdown[1].quantity, 50);

        let after_buy = grain_market().with_state(buy.resulting_price_level, buy.resulting_progress);
        let sell = TradeCalculator::quote_sell(&after_buy, 100).unwrap();
        assert_eq!(sell.breakdown.len(), 2);
        assert_eq!(sell.breakdown[0].quantity, 51);
        assert_eq!(sell.breakdown[1].quantity, 49);

        // The +1 down-step rule makes every sold unit move the market by
        // exactly one position, so the state itself round-trips.
        assert_eq!(
            (sell.resulting_price_level, sell.resulting_progress),
            (market.price_level, market.progress_within_level)
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let market = grain_market();
        assert_eq!(
            TradeCalculator::quote_buy(&market, 0),
            Err(QuoteError::InvalidAmount)
        );
        assert_eq!(
            TradeCalculator::quote_sell(&market, 0),
            Err(QuoteError::InvalidAmount)
        );
    }

    #[test]
    fn test_average_unit_price_is_volume_weighted() {
        let market = grain_market().with_state(0, 150);
        let quote = TradeCalculator::quote_buy(&market, 100).unwrap();
        assert_eq!(quote.average_unit_price(), Price::from(dec!(11.055)));
    }
}
