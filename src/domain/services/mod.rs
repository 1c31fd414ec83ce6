mod clock;
mod trade_calculator;

pub use clock::Clock;
pub use trade_calculator::{PriceSegment, QuoteError, TradeCalculator, TradeQuote};
