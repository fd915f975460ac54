use std::sync::Arc;

use critiq_core::{AccountId, TransactionId};

use crate::transaction::{CreditTransaction, TransactionKind};

/// Ledger error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("account already exists: {0}")]
    AccountExists(AccountId),

    /// The debit would take the balance below zero. Nothing was appended.
    #[error("insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: i64, available: i64 },

    /// Debit/credit amounts are positive magnitudes; the ledger applies the sign.
    #[error("amount must be positive (got {0})")]
    NonPositiveAmount(i64),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Append-only credit ledger.
///
/// All balance changes go through `debit` and `credit`; each appends exactly
/// one transaction, and the balance an implementation reports must equal the
/// sum of the account's transaction amounts at every point in time. An
/// implementation may cache the balance as long as the cache is updated in
/// the same atomic unit as the log append.
pub trait CreditLedger: Send + Sync {
    /// Open an empty account. Opening the same account twice is an error.
    fn open_account(&self, account_id: AccountId) -> Result<(), LedgerError>;

    /// Consume `amount` credits, appending a `Usage` transaction with
    /// `-amount`.
    ///
    /// Fails with `InsufficientCredits` when `amount` exceeds the current
    /// balance. Concurrent debits against one account serialize: two callers
    /// cannot both spend the last credit.
    fn debit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
    ) -> Result<TransactionId, LedgerError>;

    /// Grant `amount` credits (purchases, refunds, bonuses).
    ///
    /// Never fails for balance reasons; `amount` must still be positive.
    fn credit(
        &self,
        account_id: AccountId,
        amount: i64,
        kind: TransactionKind,
        description: &str,
    ) -> Result<TransactionId, LedgerError>;

    /// Current balance (always `Σ amount` over the account's log).
    fn balance(&self, account_id: AccountId) -> Result<i64, LedgerError>;

    /// Full transaction log for the account, oldest first.
    fn transactions(&self, account_id: AccountId) -> Result<Vec<CreditTransaction>, LedgerError>;
}

impl<L> CreditLedger for Arc<L>
where
    L: CreditLedger + ?Sized,
{
    fn open_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        (**self).open_account(account_id)
    }

    fn debit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
    ) -> Result<TransactionId, LedgerError> {
        (**self).debit(account_id, amount, description)
    }

    fn credit(
        &self,
        account_id: AccountId,
        amount: i64,
        kind: TransactionKind,
        description: &str,
    ) -> Result<TransactionId, LedgerError> {
        (**self).credit(account_id, amount, kind, description)
    }

    fn balance(&self, account_id: AccountId) -> Result<i64, LedgerError> {
        (**self).balance(account_id)
    }

    fn transactions(&self, account_id: AccountId) -> Result<Vec<CreditTransaction>, LedgerError> {
        (**self).transactions(account_id)
    }
}
