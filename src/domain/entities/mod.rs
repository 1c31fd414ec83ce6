mod ledger_entry;
mod market;
mod price_history;

pub use ledger_entry::{EntryId, LedgerEntry, MAX_ACCOUNT_BALANCE, MAX_TRANSACTION_AMOUNT};
pub use market::{
    GOLD_SPREAD, MIN_PRICE, MarketDefinitionError, ONE_CENT, PriceLevelMarket, RESOURCE_SPREAD,
};
pub use price_history::{PriceChange, PriceDirection, PriceHistoryBucket};
