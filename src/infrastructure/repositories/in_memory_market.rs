//! In-memory market repository.
//!
//! Each market sits behind its own `parking_lot::Mutex` (the row-lock
//! analogue); the `DashMap` shards only guard map membership. The shard
//! reference is always released before the market mutex is taken.

use crate::application::ports::MarketStore;
use crate::domain::{MarketId, PriceLevelMarket};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct InMemoryMarketStore {
    markets: DashMap<MarketId, Arc<Mutex<PriceLevelMarket>>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self {
            markets: DashMap::new(),
        }
    }

    fn handle(&self, id: &MarketId) -> Option<Arc<Mutex<PriceLevelMarket>>> {
        self.markets.get(id).map(|entry| Arc::clone(entry.value()))
    }
}

impl Default for InMemoryMarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStore for InMemoryMarketStore {
    fn insert(&self, market: PriceLevelMarket) {
        self.markets
            .insert(market.id.clone(), Arc::new(Mutex::new(market)));
    }

    fn snapshot(&self, id: &MarketId) -> Option<PriceLevelMarket> {
        let handle = self.handle(id)?;
        let market = handle.lock();
        Some(market.clone())
    }

    fn with_market_mut<R>(
        &self,
        id: &MarketId,
        f: impl FnOnce(&mut PriceLevelMarket) -> R,
    ) -> Option<R> {
        let handle = self.handle(id)?;
        let mut market = handle.lock();
        Some(f(&mut market))
    }

    fn list(&self) -> Vec<PriceLevelMarket> {
        let handles: Vec<_> = self
            .markets
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        handles.into_iter().map(|h| h.lock().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GoodId, Price, RegionId, TradedGood};
    use rust_decimal_macros::dec;

    fn grain(region: u32) -> PriceLevelMarket {
        PriceLevelMarket::resource(
            RegionId(region),
            TradedGood::resource(GoodId::new("grain").unwrap(), 0),
            Price::from(dec!(10.00)),
            200,
            dec!(0.10),
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_is_a_detached_copy() {
        let store = InMemoryMarketStore::new();
        let market = grain(1);
        let id = market.id.clone();
        store.insert(market);

        let mut snapshot = store.snapshot(&id).unwrap();
        snapshot.price_level = 99;
        assert_eq!(store.snapshot(&id).unwrap().price_level, 0);
    }

    #[test]
    fn test_with_market_mut_mutations_are_visible() {
        let store = InMemoryMarketStore::new();
        let market = grain(1);
        let id = market.id.clone();
        store.insert(market);

        let now = chrono::Utc::now();
        store
            .with_market_mut(&id, |m| m.apply_trade(2, 37, now))
            .unwrap();
        let after = store.snapshot(&id).unwrap();
        assert_eq!(after.price_level, 2);
        assert_eq!(after.progress_within_level, 37);
    }

    #[test]
    fn test_missing_market_returns_none() {
        let store = InMemoryMarketStore::new();
        assert!(store.snapshot(&grain(9).id).is_none());
        assert!(store.with_market_mut(&grain(9).id, |_| ()).is_none());
    }

    #[test]
    fn test_same_market_operations_serialize() {
        let store = Arc::new(InMemoryMarketStore::new());
        let market = grain(1);
        let id = market.id.clone();
        store.insert(market);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..250 {
                    store.with_market_mut(&id, |m| {
                        // Non-atomic read-modify-write; only lock exclusivity
                        // keeps the count exact.
                        let next = m.progress_within_level + 1;
                        m.progress_within_level = next % m.volume_per_level;
                    });
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let after = store.snapshot(&id).unwrap();
        assert_eq!(after.progress_within_level, (8 * 250) % 200);
    }
}
