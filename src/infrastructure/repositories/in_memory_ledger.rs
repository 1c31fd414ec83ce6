//! In-memory ledger.
//!
//! One `parking_lot::Mutex` per account plays the role of the database's
//! row-level `SELECT ... FOR UPDATE`; the `DashMap` shards only guard map
//! membership and are never held while an account lock is taken, so a
//! mutation on one account cannot serialize against unrelated accounts.

use crate::application::ports::{Ledger, LedgerError};
use crate::domain::{
    AccountId, Clock, LedgerEntry, MAX_ACCOUNT_BALANCE, MAX_TRANSACTION_AMOUNT,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Debug, Default)]
struct AccountCell {
    balance: Decimal,
    /// Set when a zero-balance local account is removed from the map; a
    /// holder of a stale handle must re-acquire instead of mutating it.
    retired: bool,
}

/// Thread-safe in-memory ledger with a per-account lock and an append-only
/// journal.
pub struct InMemoryLedger<C: Clock> {
    accounts: DashMap<AccountId, Arc<Mutex<AccountCell>>>,
    journal: Mutex<Vec<LedgerEntry>>,
    clock: Arc<C>,
}

impl<C: Clock> InMemoryLedger<C> {
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            accounts: DashMap::new(),
            journal: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO || amount > MAX_TRANSACTION_AMOUNT {
            return Err(LedgerError::InvalidAmount { amount });
        }
        Ok(())
    }

    /// Fetch (or lazily create) the account's cell. The map shard lock is
    /// released before the caller locks the cell's mutex.
    fn cell(&self, id: &AccountId) -> Arc<Mutex<AccountCell>> {
        Arc::clone(self.accounts.entry(*id).or_default().value())
    }

    /// Retire a local account debited to exactly zero. Runs while the
    /// account's lock is held; `remove_if` guards against a concurrent
    /// re-creation having replaced the cell.
    fn retire_if_empty(&self, id: &AccountId, cell: &Arc<Mutex<AccountCell>>, guard: &mut AccountCell) {
        if guard.balance.is_zero() && id.scope.is_local() {
            guard.retired = true;
            self.accounts.remove_if(id, |_, v| Arc::ptr_eq(v, cell));
        }
    }

    /// The full journal (diagnostics/audit export).
    pub fn all_entries(&self) -> Vec<LedgerEntry> {
        self.journal.lock().clone()
    }

    #[cfg(test)]
    fn account_row_exists(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }
}

impl<C: Clock> Ledger for InMemoryLedger<C> {
    fn balance(&self, account: &AccountId) -> Decimal {
        let cell = match self.accounts.get(account) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Decimal::ZERO,
        };
        let guard = cell.lock();
        if guard.retired {
            Decimal::ZERO
        } else {
            guard.balance
        }
    }

    fn credit(
        &self,
        account: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        Self::validate_amount(amount)?;

        loop {
            let cell = self.cell(account);
            let mut guard = cell.lock();
            if guard.retired {
                continue;
            }

            if guard.balance + amount > MAX_ACCOUNT_BALANCE {
                return Err(LedgerError::Overflow { account: *account });
            }

            guard.balance += amount;
            let entry = LedgerEntry::credit(
                *account,
                amount,
                reason,
                guard.balance,
                self.clock.now(),
            );
            self.journal.lock().push(entry.clone());

            tracing::debug!(
                account = %account,
                amount = %amount,
                balance = %guard.balance,
                reason,
                "credit applied"
            );
            return Ok(entry);
        }
    }

    fn debit(
        &self,
        account: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        Self::validate_amount(amount)?;

        loop {
            let cell = self.cell(account);
            let mut guard = cell.lock();
            if guard.retired {
                continue;
            }

            if guard.balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    account: *account,
                    available: guard.balance,
                    requested: amount,
                });
            }

            guard.balance -= amount;
            let entry = LedgerEntry::debit(
                *account,
                amount,
                reason,
                guard.balance,
                self.clock.now(),
            );
            self.journal.lock().push(entry.clone());

            tracing::debug!(
                account = %account,
                amount = %amount,
                balance = %guard.balance,
                reason,
                "debit applied"
            );

            self.retire_if_empty(account, &cell, &mut guard);
            return Ok(entry);
        }
    }

    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        if from.scope != to.scope {
            return Err(LedgerError::ScopeMismatch);
        }
        self.exchange(from, amount, to, amount, reason)
    }

    fn exchange(
        &self,
        debit_account: &AccountId,
        debit_amount: Decimal,
        credit_account: &AccountId,
        credit_amount: Decimal,
        reason: &str,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        if debit_account == credit_account {
            return Err(LedgerError::SameAccount);
        }
        Self::validate_amount(debit_amount)?;
        Self::validate_amount(credit_amount)?;

        // Both cells locked in AccountId order, regardless of which side is
        // the debit: a concurrent reverse exchange acquires in the same
        // order and cannot deadlock.
        let debit_first = debit_account < credit_account;
        let (first_id, second_id) = if debit_first {
            (debit_account, credit_account)
        } else {
            (credit_account, debit_account)
        };

        loop {
            let first_cell = self.cell(first_id);
            let mut first = first_cell.lock();
            if first.retired {
                continue;
            }
            let second_cell = self.cell(second_id);
            let mut second = second_cell.lock();
            if second.retired {
                continue;
            }

            let (debit_cell, debit_guard, credit_guard) = if debit_first {
                (&first_cell, &mut *first, &mut *second)
            } else {
                (&second_cell, &mut *second, &mut *first)
            };

            // Validate both legs before applying either.
            if debit_guard.balance < debit_amount {
                return Err(LedgerError::InsufficientFunds {
                    account: *debit_account,
                    available: debit_guard.balance,
                    requested: debit_amount,
                });
            }
            if credit_guard.balance + credit_amount > MAX_ACCOUNT_BALANCE {
                return Err(LedgerError::Overflow {
                    account: *credit_account,
                });
            }

            debit_guard.balance -= debit_amount;
            credit_guard.balance += credit_amount;

            let now = self.clock.now();
            let debit_entry = LedgerEntry::debit(
                *debit_account,
                debit_amount,
                reason,
                debit_guard.balance,
                now,
            );
            let credit_entry = LedgerEntry::credit(
                *credit_account,
                credit_amount,
                reason,
                credit_guard.balance,
                now,
            );
            {
                let mut journal = self.journal.lock();
                journal.push(debit_entry.clone());
                journal.push(credit_entry.clone());
            }

            tracing::debug!(
                debit = %debit_account,
                credit = %credit_account,
                debit_amount = %debit_amount,
                credit_amount = %credit_amount,
                reason,
                "exchange applied"
            );

            self.retire_if_empty(debit_account, debit_cell, debit_guard);
            return Ok((debit_entry, credit_entry));
        }
    }

    fn entries(&self, account: &AccountId) -> Vec<LedgerEntry> {
        self.journal
            .lock()
            .iter()
            .filter(|entry| entry.account == *account)
            .cloned()
            .collect()
    }
}
