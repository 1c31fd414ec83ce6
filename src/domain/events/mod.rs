//! Events emitted by the engine after state has committed.
//!
//! Published to subscribers (notification hooks, activity feeds, message
//! queues); delivery is decoupled from the trading logic.

use crate::domain::value_objects::{AccountId, MarketId, OwnerId, Price, Side, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    TradeExecuted(TradeExecutedEvent),
    FundsTransferred(FundsTransferredEvent),
}

impl EngineEvent {
    /// The market this event concerns, if any (used for per-market streams).
    pub fn market_id(&self) -> Option<&MarketId> {
        match self {
            EngineEvent::TradeExecuted(e) => Some(&e.market_id),
            EngineEvent::FundsTransferred(_) => None,
        }
    }
}

/// Emitted when a confirmed trade has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecutedEvent {
    pub market_id: MarketId,
    pub trader: OwnerId,
    pub side: Side,
    pub quantity: u32,
    pub total: Decimal,
    pub average_unit_price: Price,
    pub price_level_before: i32,
    pub price_level_after: i32,
    pub timestamp: Timestamp,
}

/// Emitted when an account-to-account transfer has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsTransferredEvent {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
    pub reason: String,
    pub timestamp: Timestamp,
}
