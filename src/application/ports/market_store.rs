use crate::domain::{MarketId, PriceLevelMarket};

/// Repository of price-level markets with row-scoped exclusive locking.
///
/// `with_market_mut` is the concurrency primitive the trade executor builds
/// on: the closure runs under the market's exclusive lock, so everything it
/// does (stale-price check, canonical re-quote, settlement, state mutation,
/// history append) is one serialized unit with respect to other trades on
/// the same market. Trades on different markets do not contend.
pub trait MarketStore: Send + Sync {
    /// Insert or replace a market definition.
    fn insert(&self, market: PriceLevelMarket);

    /// Clone of the current market state (taken under a short lock).
    fn snapshot(&self, id: &MarketId) -> Option<PriceLevelMarket>;

    /// Run `f` with exclusive access to the market. Returns `None` if the
    /// market does not exist. The closure must not block on other markets
    /// or await.
    fn with_market_mut<R>(
        &self,
        id: &MarketId,
        f: impl FnOnce(&mut PriceLevelMarket) -> R,
    ) -> Option<R>;

    /// Snapshots of all markets (for listings/admin views).
    fn list(&self) -> Vec<PriceLevelMarket>;
}
