use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critiq_core::{AccountId, NotificationId, ReviewId};

/// A user-visible status event, keyed to a review transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub account_id: AccountId,
    /// The review this notification is about, if any.
    pub review_id: Option<ReviewId>,
    pub message: String,
    /// Only field that is ever mutated, and only by the account owner.
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        account_id: AccountId,
        review_id: Option<ReviewId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            account_id,
            review_id,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}
