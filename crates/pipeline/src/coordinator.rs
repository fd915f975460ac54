//! Pipeline entry points for the layer above (HTTP/CLI).

use std::sync::Arc;

use tracing::{error, info, warn};

use critiq_analysis::TextExtractor;
use critiq_core::{AccountId, DomainError, DomainResult, NotificationId, ReviewId, TransactionId};
use critiq_ledger::{CreditLedger, CreditTransaction, LedgerError, TransactionKind};
use critiq_notify::{Notification, NotificationEmitter, NotificationStore, NotifyError};
use critiq_queue::JobQueue;
use critiq_review::{ReviewRecord, ReviewStore, ReviewStoreError};

use crate::messages;

/// Credit policy applied at the submission boundary.
#[derive(Debug, Clone)]
pub struct SubmitPolicy {
    /// Credits debited per review submission.
    pub cost_per_review: i64,
    /// Credits granted when an account registers.
    pub welcome_bonus: i64,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            cost_per_review: 1,
            welcome_bonus: 5,
        }
    }
}

/// Front door of the pipeline.
///
/// `submit` is the only write path external callers get; everything else is
/// read-side or the notification read flag. Background failures never
/// surface here — they land in `ReviewRecord.status` and notifications.
pub struct Coordinator {
    ledger: Arc<dyn CreditLedger>,
    reviews: Arc<dyn ReviewStore>,
    queue: Arc<JobQueue>,
    notifications: Arc<dyn NotificationStore>,
    emitter: NotificationEmitter,
    extractor: Arc<dyn TextExtractor>,
    policy: SubmitPolicy,
}

impl Coordinator {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        reviews: Arc<dyn ReviewStore>,
        queue: Arc<JobQueue>,
        notifications: Arc<dyn NotificationStore>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let emitter = NotificationEmitter::new(notifications.clone());
        Self {
            ledger,
            reviews,
            queue,
            notifications,
            emitter,
            extractor,
            policy: SubmitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SubmitPolicy {
        &self.policy
    }

    /// Open a fresh account and post the welcome bonus.
    pub fn register_account(&self) -> DomainResult<AccountId> {
        let account_id = AccountId::new();
        self.ledger
            .open_account(account_id)
            .map_err(ledger_error)?;
        if self.policy.welcome_bonus > 0 {
            self.ledger
                .credit(
                    account_id,
                    self.policy.welcome_bonus,
                    TransactionKind::Bonus,
                    "Welcome bonus",
                )
                .map_err(ledger_error)?;
        }
        info!(%account_id, bonus = self.policy.welcome_bonus, "account registered");
        Ok(account_id)
    }

    /// Buy credits. The payment itself happens outside this core.
    pub fn purchase_credits(
        &self,
        account_id: AccountId,
        amount: i64,
    ) -> DomainResult<TransactionId> {
        let tx = self
            .ledger
            .credit(account_id, amount, TransactionKind::Purchase, "Credit purchase")
            .map_err(ledger_error)?;
        info!(%account_id, amount, "credits purchased");
        Ok(tx)
    }

    /// Submit a document for review.
    ///
    /// Validation and the debit happen synchronously; the review itself is
    /// asynchronous and the returned id is available immediately. If record
    /// creation or enqueueing fails after a successful debit, the debit is
    /// reversed with a `Refund` so no debit is left without a matching
    /// review record.
    pub fn submit(
        &self,
        account_id: AccountId,
        filename: &str,
        blob: &[u8],
    ) -> DomainResult<ReviewId> {
        // 1) Validate before any state change.
        let text = self
            .extractor
            .extract(blob, filename)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        // 2) Debit.
        let cost = self.policy.cost_per_review;
        self.ledger
            .debit(account_id, cost, &format!("Document review: {filename}"))
            .map_err(ledger_error)?;

        // 3) Create the pending record.
        let record = ReviewRecord::new(account_id, filename, text, cost);
        let review_id = record.id;
        if let Err(e) = self.reviews.create(record) {
            self.compensate_debit(account_id, cost, filename);
            return Err(DomainError::storage(e.to_string()));
        }

        // 4) Enqueue for the worker pool.
        if let Err(e) = self.queue.enqueue(review_id) {
            self.compensate_debit(account_id, cost, filename);
            return Err(DomainError::storage(e.to_string()));
        }

        // 5) Best-effort submission notice; the review is already on its way.
        if let Err(e) = self
            .emitter
            .emit(account_id, Some(review_id), messages::submitted())
        {
            warn!(%review_id, error = %e, "failed to emit submission notification");
        }

        info!(%account_id, %review_id, cost, "review submitted");
        Ok(review_id)
    }

    pub fn get_review(&self, id: ReviewId) -> DomainResult<ReviewRecord> {
        self.reviews
            .get(id)
            .map_err(review_error)?
            .ok_or(DomainError::NotFound)
    }

    pub fn list_reviews(&self, account_id: AccountId) -> DomainResult<Vec<ReviewRecord>> {
        self.reviews
            .list_for_account(account_id)
            .map_err(review_error)
    }

    pub fn balance(&self, account_id: AccountId) -> DomainResult<i64> {
        self.ledger.balance(account_id).map_err(ledger_error)
    }

    pub fn transactions(&self, account_id: AccountId) -> DomainResult<Vec<CreditTransaction>> {
        self.ledger.transactions(account_id).map_err(ledger_error)
    }

    pub fn list_notifications(
        &self,
        account_id: AccountId,
        unread_only: bool,
    ) -> DomainResult<Vec<Notification>> {
        self.notifications
            .list_for_account(account_id, unread_only)
            .map_err(notify_error)
    }

    /// Idempotent: marking an already-read notification succeeds.
    pub fn mark_notification_read(&self, id: NotificationId) -> DomainResult<()> {
        self.notifications.mark_read(id).map_err(notify_error)
    }

    pub fn mark_all_notifications_read(&self, account_id: AccountId) -> DomainResult<usize> {
        self.notifications
            .mark_all_read(account_id)
            .map_err(notify_error)
    }

    /// Reverse a debit whose review never made it into the pipeline.
    fn compensate_debit(&self, account_id: AccountId, cost: i64, filename: &str) {
        match self.ledger.credit(
            account_id,
            cost,
            TransactionKind::Refund,
            &format!("Refund: failed to queue review of {filename}"),
        ) {
            Ok(_) => warn!(%account_id, cost, "debit compensated after failed submit"),
            // The ledger now holds an orphaned debit; nothing more can be
            // done in-process, so make the inconsistency loud.
            Err(e) => error!(%account_id, cost, error = %e, "failed to compensate debit"),
        }
    }
}

fn ledger_error(e: LedgerError) -> DomainError {
    match e {
        LedgerError::InsufficientCredits {
            required,
            available,
        } => DomainError::insufficient_credits(required, available),
        LedgerError::AccountNotFound(_) => DomainError::not_found(),
        LedgerError::AccountExists(id) => {
            DomainError::invariant(format!("account already exists: {id}"))
        }
        LedgerError::NonPositiveAmount(n) => {
            DomainError::validation(format!("amount must be positive (got {n})"))
        }
        LedgerError::Storage(msg) => DomainError::storage(msg),
    }
}

fn review_error(e: ReviewStoreError) -> DomainError {
    match e {
        ReviewStoreError::NotFound(_) => DomainError::not_found(),
        other => DomainError::storage(other.to_string()),
    }
}

fn notify_error(e: NotifyError) -> DomainError {
    match e {
        NotifyError::NotFound(_) => DomainError::not_found(),
        NotifyError::Storage(msg) => DomainError::storage(msg),
    }
}
