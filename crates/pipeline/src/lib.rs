//! `critiq-pipeline` — the credit-guarded review pipeline.
//!
//! Glues upload → ledger debit → enqueue → worker → notification:
//!
//! ```text
//! Coordinator::submit
//!   ↓ validate (extract text)          rejected before any state change
//!   ↓ CreditLedger::debit              InsufficientCredits rejected here
//!   ↓ ReviewRecord (Pending)           compensating refund if this fails
//!   ↓ JobQueue::enqueue                compensating refund if this fails
//!   → ReviewId returned immediately
//!
//! WorkerPool (N threads)
//!   claim → Pending→Processing → Summarize (retry w/ backoff) →
//!   Completed | Failed (+ refund) → notifications at each transition
//! ```
//!
//! Errors during submit surface synchronously; errors during background
//! processing surface only through `ReviewRecord.status` and notifications.

pub mod coordinator;
mod messages;
pub mod retry;
pub mod worker;


pub use coordinator::{Coordinator, SubmitPolicy};
pub use retry::RetryPolicy;
pub use worker::{WorkerDeps, WorkerPool, WorkerPoolConfig, WorkerStatsSnapshot};
