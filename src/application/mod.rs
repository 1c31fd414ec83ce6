pub mod ports;
pub mod use_cases;

pub use ports::{EventPublisher, Ledger, LedgerError, MarketStore, PriceHistoryStore};
pub use use_cases::{
    DEFAULT_MAX_TRADE_QUANTITY, ExecuteTradeCommand, QuoteRequest, TradeError, TradeExecution,
    TradeUseCase, TransferFundsCommand, TransferFundsUseCase,
};
