use crate::domain::{MarketId, Price, PriceChange, PriceHistoryBucket};
use chrono::NaiveDate;

/// Daily OHLC storage, unique per `(market, day)`.
///
/// `record` is called once per completed trade, inside the trade's own
/// market lock, so implementations need no cross-trade coordination of
/// their own beyond keyed map access.
pub trait PriceHistoryStore: Send + Sync {
    /// Fold a traded unit price into the market's bucket for `day`,
    /// creating it (open = high = low = close) on the day's first trade.
    fn record(&self, market_id: &MarketId, day: NaiveDate, unit_price: Price);

    fn bucket(&self, market_id: &MarketId, day: NaiveDate) -> Option<PriceHistoryBucket>;

    /// Buckets in `[from, to]`, ordered by day (the candlestick window).
    fn range(
        &self,
        market_id: &MarketId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<PriceHistoryBucket>;

    /// Day-over-day change between the two most recent buckets up to `day`.
    fn change(&self, market_id: &MarketId, day: NaiveDate) -> Option<PriceChange> {
        let window = self.range(market_id, day - chrono::Days::new(29), day);
        if window.len() < 2 {
            return None;
        }
        let prev = &window[window.len() - 2];
        let last = &window[window.len() - 1];
        PriceChange::between(prev.close, last.close)
    }
}
