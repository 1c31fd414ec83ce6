pub mod entities;
pub mod events;
pub mod services;
pub mod value_objects;

// Re-export entity types
pub use entities::{
    GOLD_SPREAD, LedgerEntry, MAX_ACCOUNT_BALANCE, MAX_TRANSACTION_AMOUNT, MIN_PRICE,
    MarketDefinitionError, ONE_CENT, PriceChange, PriceDirection, PriceHistoryBucket,
    PriceLevelMarket, RESOURCE_SPREAD,
};

// Re-export events
pub use events::{EngineEvent, FundsTransferredEvent, TradeExecutedEvent};

// Re-export services
pub use services::{Clock, PriceSegment, QuoteError, TradeCalculator, TradeQuote};

// Re-export value objects
pub use value_objects::{
    AccountId, CurrencyScope, GoodId, MarketId, OwnerId, Price, RegionId, Side, Timestamp,
    TradedGood,
};
