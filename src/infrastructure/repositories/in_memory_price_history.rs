//! In-memory OHLC history keyed by `(market, day)`.

use crate::application::ports::PriceHistoryStore;
use crate::domain::{MarketId, Price, PriceHistoryBucket};
use chrono::NaiveDate;
use dashmap::DashMap;

pub struct InMemoryPriceHistory {
    buckets: DashMap<(MarketId, NaiveDate), PriceHistoryBucket>,
}

impl InMemoryPriceHistory {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }
}

impl Default for InMemoryPriceHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceHistoryStore for InMemoryPriceHistory {
    fn record(&self, market_id: &MarketId, day: NaiveDate, unit_price: Price) {
        self.buckets
            .entry((market_id.clone(), day))
            .and_modify(|bucket| bucket.fold(unit_price))
            .or_insert_with(|| PriceHistoryBucket::open_with(market_id.clone(), day, unit_price));
    }

    fn bucket(&self, market_id: &MarketId, day: NaiveDate) -> Option<PriceHistoryBucket> {
        self.buckets
            .get(&(market_id.clone(), day))
            .map(|entry| entry.value().clone())
    }

    fn range(
        &self,
        market_id: &MarketId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<PriceHistoryBucket> {
        let mut window: Vec<PriceHistoryBucket> = self
            .buckets
            .iter()
            .filter(|entry| {
                let (id, day) = entry.key();
                id == market_id && *day >= from && *day <= to
            })
            .map(|entry| entry.value().clone())
            .collect();
        window.sort_by_key(|bucket| bucket.day);
        window
    }
}
