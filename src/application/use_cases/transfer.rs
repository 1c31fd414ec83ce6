//! Funds transfer use case: the "debit/credit an account" surface used by
//! external collaborators (wages, donations, battle rewards, state budgets).

use crate::application::ports::{EventPublisher, Ledger, LedgerError};
use crate::domain::{AccountId, Clock, EngineEvent, FundsTransferredEvent, LedgerEntry};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Command to move funds between two accounts of the same currency scope.
#[derive(Debug, Clone)]
pub struct TransferFundsCommand {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
    pub reason: String,
}

pub struct TransferFundsUseCase<L, E, C>
where
    L: Ledger,
    E: EventPublisher,
    C: Clock,
{
    ledger: Arc<L>,
    event_publisher: Arc<E>,
    clock: Arc<C>,
}

impl<L, E, C> TransferFundsUseCase<L, E, C>
where
    L: Ledger,
    E: EventPublisher,
    C: Clock,
{
    pub fn new(ledger: Arc<L>, event_publisher: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            ledger,
            event_publisher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        command: TransferFundsCommand,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        let receipts = self.ledger.transfer(
            &command.from,
            &command.to,
            command.amount,
            &command.reason,
        )?;

        tracing::info!(
            from = %command.from,
            to = %command.to,
            amount = %command.amount,
            reason = %command.reason,
            "funds transferred"
        );
        self.event_publisher
            .publish(EngineEvent::FundsTransferred(FundsTransferredEvent {
                from: command.from,
                to: command.to,
                amount: command.amount,
                reason: command.reason,
                timestamp: self.clock.now(),
            }))
            .await;

        Ok(receipts)
    }
}
