//! Tactizen Market Engine
//!
//! The pricing and settlement core of the Tactizen nation simulation:
//! a discrete multi-level market engine plus the transactional ledger that
//! makes every trade atomic under concurrent access.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture with clear separation of concerns:
//!
//! - **Domain**: Core business entities and rules (PriceLevelMarket,
//!   TradeCalculator, LedgerEntry, PriceHistoryBucket)
//! - **Application**: Use cases and port interfaces (TradeUseCase,
//!   TransferFundsUseCase, Ledger, MarketStore)
//! - **Infrastructure**: Implementations of ports (InMemoryLedger,
//!   InMemoryMarketStore, BroadcastEventPublisher, clocks, config)
//!
//! # Trading model
//!
//! Markets have no order book. Each market is a stepped price curve: every
//! `volume_per_level` units bought raises the price one level, selling
//! lowers it, and trades are priced by walking the levels they cross.
//! Callers first `quote` (non-binding), then `execute` with the price level
//! they observed; if another trade moved the market in between, execution
//! is rejected with `StalePrice` and the caller re-quotes.
//!
//! # Example
//!
//! ```ignore
//! use tactizen_market::{EngineConfig, MarketEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = EngineConfig::from_file("engine.json").unwrap();
//!     let engine = MarketEngine::new(config).unwrap();
//!     let quote = engine.quote(market_id, Side::Buy, 100).await.unwrap();
//!     // show quote.breakdown to the user, then:
//!     engine.execute(/* ... quote.observed_price_level ... */).await.unwrap();
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    AccountId, Clock, CurrencyScope, EngineEvent, FundsTransferredEvent, GoodId, LedgerEntry,
    MAX_ACCOUNT_BALANCE, MAX_TRANSACTION_AMOUNT, MIN_PRICE, MarketDefinitionError, MarketId,
    OwnerId, Price, PriceChange, PriceDirection, PriceHistoryBucket, PriceLevelMarket, PriceSegment,
    QuoteError, RegionId, Side, Timestamp, TradeCalculator, TradeExecutedEvent, TradeQuote,
    TradedGood,
};

pub use application::{
    EventPublisher, ExecuteTradeCommand, Ledger, LedgerError, MarketStore, PriceHistoryStore,
    QuoteRequest, TradeError, TradeExecution, TradeUseCase, TransferFundsCommand,
    TransferFundsUseCase,
};

pub use infrastructure::{
    AccountSeed, BroadcastEventPublisher, ConfigError, EngineConfig, InMemoryLedger,
    InMemoryMarketStore, InMemoryPriceHistory, MarketSeed, SimulationClock, SystemClock,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast;

/// The assembled market engine.
///
/// Wires the in-memory stores, the event bus and the use cases behind one
/// entry point; external collaborators (employment, battles, companies)
/// interact with the core exclusively through this surface.
pub struct MarketEngine<C: Clock + 'static> {
    pub config: EngineConfig,
    pub clock: Arc<C>,
    pub markets: Arc<InMemoryMarketStore>,
    pub ledger: Arc<InMemoryLedger<C>>,
    pub history: Arc<InMemoryPriceHistory>,
    pub event_publisher: Arc<BroadcastEventPublisher>,
    trade: TradeUseCase<InMemoryMarketStore, InMemoryLedger<C>, InMemoryPriceHistory, BroadcastEventPublisher, C>,
    transfer: TransferFundsUseCase<InMemoryLedger<C>, BroadcastEventPublisher, C>,
}

impl<C: Clock + 'static> MarketEngine<C> {
    /// Create an engine with the given clock, seeding markets and account
    /// balances from the configuration.
    pub fn with_clock(config: EngineConfig, clock: Arc<C>) -> Result<Self, ConfigError> {
        let markets = Arc::new(InMemoryMarketStore::new());
        let ledger = Arc::new(InMemoryLedger::new(Arc::clone(&clock)));
        let history = Arc::new(InMemoryPriceHistory::new());
        let event_publisher = Arc::new(BroadcastEventPublisher::new(config.event_capacity));

        for seed in &config.markets {
            markets.insert(seed.build()?);
        }
        for seed in &config.accounts {
            if seed.balance > Decimal::ZERO {
                let account = AccountId::new(seed.owner, seed.scope);
                ledger
                    .credit(&account, seed.balance, "initial balance")
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            }
        }

        let trade = TradeUseCase::new(
            Arc::clone(&markets),
            Arc::clone(&ledger),
            Arc::clone(&history),
            Arc::clone(&event_publisher),
            Arc::clone(&clock),
            config.max_trade_quantity,
        );
        let transfer = TransferFundsUseCase::new(
            Arc::clone(&ledger),
            Arc::clone(&event_publisher),
            Arc::clone(&clock),
        );

        Ok(MarketEngine {
            config,
            clock,
            markets,
            ledger,
            history,
            event_publisher,
            trade,
            transfer,
        })
    }

    // ========== Trading ==========

    /// Non-binding quote against the current market state.
    pub async fn quote(
        &self,
        market_id: MarketId,
        side: Side,
        quantity: u32,
    ) -> Result<TradeQuote, TradeError> {
        self.trade
            .quote(QuoteRequest {
                market_id,
                side,
                quantity,
            })
            .await
    }

    /// Execute a confirmed trade; rejects with [`TradeError::StalePrice`]
    /// if the market moved since the caller's quote.
    pub async fn execute(&self, command: ExecuteTradeCommand) -> Result<TradeExecution, TradeError> {
        self.trade.execute(command).await
    }

    // ========== Ledger ==========

    pub fn balance(&self, account: &AccountId) -> Decimal {
        self.ledger.balance(account)
    }

    pub fn credit(
        &self,
        account: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        self.ledger.credit(account, amount, reason)
    }

    pub fn debit(
        &self,
        account: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        self.ledger.debit(account, amount, reason)
    }

    pub async fn transfer(
        &self,
        command: TransferFundsCommand,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        self.transfer.execute(command).await
    }

    pub fn entries(&self, account: &AccountId) -> Vec<LedgerEntry> {
        self.ledger.entries(account)
    }

    // ========== Markets & history ==========

    pub fn add_market(&self, market: PriceLevelMarket) {
        self.markets.insert(market);
    }

    /// Snapshot of one market's current state.
    pub fn market(&self, id: &MarketId) -> Option<PriceLevelMarket> {
        self.markets.snapshot(id)
    }

    pub fn price_history(
        &self,
        id: &MarketId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<PriceHistoryBucket> {
        self.history.range(id, from, to)
    }

    pub fn price_change(&self, id: &MarketId) -> Option<PriceChange> {
        self.history.change(id, self.clock.today())
    }

    // ========== Events ==========

    /// Subscribe to all engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_publisher.subscribe()
    }

    /// Subscribe to events for one market.
    pub fn subscribe_market(&self, id: &MarketId) -> broadcast::Receiver<EngineEvent> {
        self.event_publisher.subscribe_market(id)
    }
}

impl MarketEngine<SystemClock> {
    /// Create an engine on the system clock.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }
}

impl MarketEngine<SimulationClock> {
    /// Create an engine on a frozen, controllable clock (for tests).
    pub fn fixed_time(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SimulationClock::new()))
    }
}
