use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critiq_core::{AccountId, TransactionId};

/// Why a credit balance changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Credits bought by the account owner.
    Purchase,
    /// Credits consumed by a review submission.
    Usage,
    /// Credits returned after a failed or unqueueable review.
    Refund,
    /// Credits granted by the system (e.g. the welcome grant).
    Bonus,
}

/// One immutable entry in an account's credit log.
///
/// The ledger is append-only: entries are never edited or deleted once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    /// Signed amount: negative for `Usage`, positive otherwise.
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    pub fn new(
        account_id: AccountId,
        amount: i64,
        kind: TransactionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            amount,
            kind,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
