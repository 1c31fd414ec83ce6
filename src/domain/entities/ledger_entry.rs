use crate::domain::value_objects::{AccountId, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EntryId = Uuid;

/// Maximum representable account balance.
pub const MAX_ACCOUNT_BALANCE: Decimal = dec!(999999999999.99999999);

/// Maximum amount a single mutation may move.
pub const MAX_TRANSACTION_AMOUNT: Decimal = dec!(999999999999.99999999);

/// One immutable journal record: written by every ledger mutation, never
/// updated or deleted. Also serves as the mutation's receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account: AccountId,
    /// Positive for credits, negative for debits.
    pub signed_amount: Decimal,
    pub reason: String,
    /// Account balance immediately after this mutation applied.
    pub balance_after: Decimal,
    pub recorded_at: Timestamp,
}

impl LedgerEntry {
    pub fn credit(
        account: AccountId,
        amount: Decimal,
        reason: impl Into<String>,
        balance_after: Decimal,
        recorded_at: Timestamp,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4(),
            account,
            signed_amount: amount,
            reason: reason.into(),
            balance_after,
            recorded_at,
        }
    }

    pub fn debit(
        account: AccountId,
        amount: Decimal,
        reason: impl Into<String>,
        balance_after: Decimal,
        recorded_at: Timestamp,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4(),
            account,
            signed_amount: -amount,
            reason: reason.into(),
            balance_after,
            recorded_at,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.signed_amount > Decimal::ZERO
    }

    /// Magnitude of the mutation, always positive.
    pub fn amount(&self) -> Decimal {
        self.signed_amount.abs()
    }
}
