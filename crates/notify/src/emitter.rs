//! Notification emission.

use std::sync::Arc;

use critiq_core::{AccountId, NotificationId, ReviewId};

use crate::notification::Notification;
use crate::store::{NotificationStore, NotifyError};

/// Appends user-visible status events keyed to review transitions.
///
/// Pure append: the only failure path is storage failure, which is fatal to
/// the emit call but must never roll back the transition that triggered it.
/// Callers log a failed emit and move on.
#[derive(Clone)]
pub struct NotificationEmitter {
    store: Arc<dyn NotificationStore>,
}

impl NotificationEmitter {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub fn emit(
        &self,
        account_id: AccountId,
        review_id: Option<ReviewId>,
        message: impl Into<String>,
    ) -> Result<NotificationId, NotifyError> {
        let notification = Notification::new(account_id, review_id, message);
        tracing::debug!(
            account_id = %account_id,
            review_id = ?review_id,
            "emitting notification"
        );
        self.store.append(notification)
    }
}
