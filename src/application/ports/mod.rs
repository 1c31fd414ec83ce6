mod event_publisher;
mod ledger;
mod market_store;
mod price_history_store;

pub use event_publisher::EventPublisher;
pub use ledger::{Ledger, LedgerError};
pub use market_store::MarketStore;
pub use price_history_store::PriceHistoryStore;
