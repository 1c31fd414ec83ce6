mod in_memory_ledger;
mod in_memory_market;
mod in_memory_price_history;

pub use in_memory_ledger::InMemoryLedger;
pub use in_memory_market::InMemoryMarketStore;
pub use in_memory_price_history::InMemoryPriceHistory;
