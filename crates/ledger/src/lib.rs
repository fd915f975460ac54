//! `critiq-ledger` — append-only credit ledger.
//!
//! Balances are derived from the transaction log: every balance mutation
//! appends exactly one transaction in the same critical section, so
//! `balance == Σ amount` holds at all times, under concurrency included.

pub mod in_memory;
pub mod ledger;
pub mod transaction;

pub use in_memory::InMemoryCreditLedger;
pub use ledger::{CreditLedger, LedgerError};
pub use transaction::{CreditTransaction, TransactionKind};
