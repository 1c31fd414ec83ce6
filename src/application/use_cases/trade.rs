//! Trade use case: the quote → confirm → execute protocol.
//!
//! Pricing is multi-level and the market can be mutated by other traders
//! between a caller seeing a quote and confirming it. The executor therefore
//! re-reads the market under its exclusive lock, rejects the confirmation if
//! the price level no longer matches what the caller observed, and otherwise
//! applies ledger settlement, market mutation and history append as one
//! serialized unit, without ever holding a lock across the user-facing
//! round trip.

use crate::application::ports::{EventPublisher, Ledger, LedgerError, MarketStore, PriceHistoryStore};
use crate::domain::{
    AccountId, Clock, EngineEvent, LedgerEntry, MarketId, OwnerId, PriceLevelMarket, QuoteError,
    Side, TradeCalculator, TradeExecutedEvent, TradeQuote,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on units per trade unless configured otherwise.
pub const DEFAULT_MAX_TRADE_QUANTITY: u32 = 999_999;

/// Request for a non-binding quote.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub market_id: MarketId,
    pub side: Side,
    pub quantity: u32,
}

/// Confirmation of a previously shown quote.
#[derive(Debug, Clone)]
pub struct ExecuteTradeCommand {
    pub market_id: MarketId,
    pub side: Side,
    pub quantity: u32,
    /// The price level the caller last observed (from the quote). Execution
    /// is rejected if the market has moved since.
    pub observed_price_level: i32,
    pub trader: OwnerId,
}

/// Result of a successfully applied trade.
#[derive(Debug, Clone)]
pub struct TradeExecution {
    /// The canonical quote the trade settled at (re-derived under the
    /// market lock, not the one previously shown to the caller).
    pub quote: TradeQuote,
    /// Receipt for the local-currency leg.
    pub cash: LedgerEntry,
    /// Receipt for the gold leg (gold markets only).
    pub gold: Option<LedgerEntry>,
    pub new_price_level: i32,
}

/// Errors of the quote/execute protocol.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("invalid quantity {quantity}: must be between 1 and {max}")]
    InvalidAmount { quantity: u32, max: u32 },

    #[error("market not found: {0}")]
    MarketNotFound(MarketId),

    #[error("price level moved: observed {observed}, now {current}; re-quote and retry")]
    StalePrice { observed: i32, current: i32 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Quote(#[from] QuoteError),
}

/// Use case for quoting and executing market trades.
pub struct TradeUseCase<M, L, H, E, C>
where
    M: MarketStore,
    L: Ledger,
    H: PriceHistoryStore,
    E: EventPublisher,
    C: Clock,
{
    markets: Arc<M>,
    ledger: Arc<L>,
    history: Arc<H>,
    event_publisher: Arc<E>,
    clock: Arc<C>,
    max_trade_quantity: u32,
}

impl<M, L, H, E, C> TradeUseCase<M, L, H, E, C>
where
    M: MarketStore,
    L: Ledger,
    H: PriceHistoryStore,
    E: EventPublisher,
    C: Clock,
{
    pub fn new(
        markets: Arc<M>,
        ledger: Arc<L>,
        history: Arc<H>,
        event_publisher: Arc<E>,
        clock: Arc<C>,
        max_trade_quantity: u32,
    ) -> Self {
        Self {
            markets,
            ledger,
            history,
            event_publisher,
            clock,
            max_trade_quantity,
        }
    }

    fn check_quantity(&self, quantity: u32) -> Result<(), TradeError> {
        if quantity == 0 || quantity > self.max_trade_quantity {
            return Err(TradeError::InvalidAmount {
                quantity,
                max: self.max_trade_quantity,
            });
        }
        Ok(())
    }

    /// Compute a non-binding quote against the current market state.
    ///
    /// The returned quote carries `observed_price_level`; the caller passes
    /// it back on confirmation.
    pub async fn quote(&self, request: QuoteRequest) -> Result<TradeQuote, TradeError> {
        self.check_quantity(request.quantity)?;

        let market = self
            .markets
            .snapshot(&request.market_id)
            .ok_or_else(|| TradeError::MarketNotFound(request.market_id.clone()))?;

        Ok(TradeCalculator::quote(&market, request.side, request.quantity)?)
    }

    /// Execute a confirmed trade.
    ///
    /// Under the market's exclusive lock: reject on stale price, re-derive
    /// the canonical breakdown, settle through the ledger, mutate the
    /// market, record OHLC. Any failure leaves everything untouched.
    pub async fn execute(&self, command: ExecuteTradeCommand) -> Result<TradeExecution, TradeError> {
        self.check_quantity(command.quantity)?;

        let result = self
            .markets
            .with_market_mut(&command.market_id, |market| {
                self.execute_locked(market, &command)
            })
            .ok_or_else(|| TradeError::MarketNotFound(command.market_id.clone()))?;

        match &result {
            Ok(execution) => {
                tracing::info!(
                    market = %command.market_id,
                    trader = %command.trader,
                    side = %command.side,
                    quantity = command.quantity,
                    total = %execution.quote.total,
                    price_level = execution.new_price_level,
                    "trade executed"
                );
                self.event_publisher
                    .publish(EngineEvent::TradeExecuted(TradeExecutedEvent {
                        market_id: command.market_id.clone(),
                        trader: command.trader,
                        side: command.side,
                        quantity: command.quantity,
                        total: execution.quote.total,
                        average_unit_price: execution.quote.average_unit_price(),
                        price_level_before: execution.quote.observed_price_level,
                        price_level_after: execution.new_price_level,
                        timestamp: self.clock.now(),
                    }))
                    .await;
            }
            Err(error) => {
                tracing::debug!(
                    market = %command.market_id,
                    trader = %command.trader,
                    %error,
                    "trade rejected"
                );
            }
        }

        result
    }

    /// The critical section: runs under the market's exclusive lock.
    fn execute_locked(
        &self,
        market: &mut PriceLevelMarket,
        command: &ExecuteTradeCommand,
    ) -> Result<TradeExecution, TradeError> {
        if market.price_level != command.observed_price_level {
            return Err(TradeError::StalePrice {
                observed: command.observed_price_level,
                current: market.price_level,
            });
        }

        // Canonical breakdown from the authoritative state; the quote the
        // caller saw is not trusted even though the level matches.
        let quote = TradeCalculator::quote(market, command.side, command.quantity)?;
        let average = quote.average_unit_price();

        let (cash, gold) = self.settle(market, command, &quote)?;

        let now = self.clock.now();
        market.apply_trade(quote.resulting_price_level, quote.resulting_progress, now);
        self.history
            .record(&market.id, now.date_naive(), average);

        Ok(TradeExecution {
            new_price_level: quote.resulting_price_level,
            quote,
            cash,
            gold,
        })
    }

    /// Move the money for a canonical quote. Resource markets settle the
    /// cash leg only (goods delivery belongs to the inventory collaborator);
    /// gold markets settle cash and gold as one atomic exchange.
    fn settle(
        &self,
        market: &PriceLevelMarket,
        command: &ExecuteTradeCommand,
        quote: &TradeQuote,
    ) -> Result<(LedgerEntry, Option<LedgerEntry>), TradeError> {
        let cash_account = AccountId::local(command.trader, market.id.region);
        let reason = format!(
            "{} {} x{} (avg {})",
            command.side,
            market.id,
            command.quantity,
            quote.average_unit_price()
        );

        if market.id.good.is_gold() {
            let gold_account = AccountId::gold(command.trader);
            let gold_amount = Decimal::from(command.quantity);
            let (debit, credit) = match command.side {
                Side::Buy => {
                    self.ledger
                        .exchange(&cash_account, quote.total, &gold_account, gold_amount, &reason)?
                }
                Side::Sell => {
                    self.ledger
                        .exchange(&gold_account, gold_amount, &cash_account, quote.total, &reason)?
                }
            };
            let (cash, gold) = match command.side {
                Side::Buy => (debit, credit),
                Side::Sell => (credit, debit),
            };
            Ok((cash, Some(gold)))
        } else {
            let cash = match command.side {
                Side::Buy => self.ledger.debit(&cash_account, quote.total, &reason)?,
                Side::Sell => self.ledger.credit(&cash_account, quote.total, &reason)?,
            };
            Ok((cash, None))
        }
    }
}
