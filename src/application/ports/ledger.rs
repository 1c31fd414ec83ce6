use crate::domain::{AccountId, LedgerEntry};
use rust_decimal::Decimal;
use thiserror::Error;

/// Typed, recoverable failures of ledger mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("amount must be positive and at most the per-transaction maximum (got {amount})")]
    InvalidAmount { amount: Decimal },

    #[error("insufficient funds in {account}: have {available}, need {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("credit to {account} would exceed the maximum balance")]
    Overflow { account: AccountId },

    #[error("cannot move funds between an account and itself")]
    SameAccount,

    #[error("transfer endpoints must share a currency scope")]
    ScopeMismatch,
}

/// The transactional ledger: atomic, lock-serialized mutation of named
/// numeric accounts.
///
/// Every mutation acquires an exclusive lock scoped to the accounts it
/// touches, re-reads the balance under that lock, and applies the balance
/// change together with the journal append as one unit. Operations that
/// hold two locks acquire them in `AccountId` order regardless of argument
/// order. All methods are synchronous: the locks are short-lived and must
/// never be held across an await point.
///
/// Accounts are created lazily on first credit; a never-credited account
/// reads as zero balance.
pub trait Ledger: Send + Sync {
    /// Current balance; zero for accounts that have never been credited.
    fn balance(&self, account: &AccountId) -> Decimal;

    /// Add funds. Fails with [`LedgerError::Overflow`] above the maximum
    /// balance, leaving nothing mutated.
    fn credit(
        &self,
        account: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError>;

    /// Remove funds. Fails with [`LedgerError::InsufficientFunds`] if the
    /// balance re-read under the lock is too small, leaving nothing mutated.
    fn debit(
        &self,
        account: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError>;

    /// Move `amount` between two same-scope accounts; sum-conserving and
    /// atomic (neither leg applies if either would fail).
    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError>;

    /// Debit one account and credit another as one atomic unit, with
    /// independent amounts. This is the settlement primitive for
    /// cross-currency trades (gold markets): deliberately not
    /// sum-conserving.
    fn exchange(
        &self,
        debit_account: &AccountId,
        debit_amount: Decimal,
        credit_account: &AccountId,
        credit_amount: Decimal,
        reason: &str,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError>;

    /// Append-only journal for one account, oldest first.
    fn entries(&self, account: &AccountId) -> Vec<LedgerEntry>;
}
