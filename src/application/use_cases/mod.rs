mod trade;
mod transfer;

pub use trade::{
    DEFAULT_MAX_TRADE_QUANTITY, ExecuteTradeCommand, QuoteRequest, TradeError, TradeExecution,
    TradeUseCase,
};
pub use transfer::{TransferFundsCommand, TransferFundsUseCase};
