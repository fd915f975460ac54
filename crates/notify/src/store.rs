//! Notification storage.

use std::sync::{Arc, RwLock};

use critiq_core::{AccountId, NotificationId};

use crate::notification::Notification;

/// Notification store abstraction.
pub trait NotificationStore: Send + Sync {
    /// Append a notification. Notifications are never deleted.
    fn append(&self, notification: Notification) -> Result<NotificationId, NotifyError>;

    /// Notifications for an account, newest first.
    fn list_for_account(
        &self,
        account_id: AccountId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotifyError>;

    /// Flip the read flag. Idempotent: marking an already-read notification
    /// succeeds without change.
    fn mark_read(&self, id: NotificationId) -> Result<(), NotifyError>;

    /// Mark every unread notification for the account; returns how many
    /// were flipped.
    fn mark_all_read(&self, account_id: AccountId) -> Result<usize, NotifyError>;
}

/// Notification store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// In-memory notification store for tests/dev.
///
/// A `Vec` keeps append order; listings walk it backwards for newest-first.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    entries: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn append(&self, notification: Notification) -> Result<NotificationId, NotifyError> {
        let id = notification.id;
        self.entries.write().unwrap().push(notification);
        Ok(id)
    }

    fn list_for_account(
        &self,
        account_id: AccountId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotifyError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .iter()
            .rev()
            .filter(|n| n.account_id == account_id && (!unread_only || !n.read))
            .cloned()
            .collect())
    }

    fn mark_read(&self, id: NotificationId) -> Result<(), NotifyError> {
        let mut entries = self.entries.write().unwrap();
        let notification = entries
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(NotifyError::NotFound(id))?;
        notification.read = true;
        Ok(())
    }

    fn mark_all_read(&self, account_id: AccountId) -> Result<usize, NotifyError> {
        let mut entries = self.entries.write().unwrap();
        let mut flipped = 0;
        for n in entries
            .iter_mut()
            .filter(|n| n.account_id == account_id && !n.read)
        {
            n.read = true;
            flipped += 1;
        }
        Ok(flipped)
    }
}

impl<S> NotificationStore for Arc<S>
where
    S: NotificationStore + ?Sized,
{
    fn append(&self, notification: Notification) -> Result<NotificationId, NotifyError> {
        (**self).append(notification)
    }

    fn list_for_account(
        &self,
        account_id: AccountId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotifyError> {
        (**self).list_for_account(account_id, unread_only)
    }

    fn mark_read(&self, id: NotificationId) -> Result<(), NotifyError> {
        (**self).mark_read(id)
    }

    fn mark_all_read(&self, account_id: AccountId) -> Result<usize, NotifyError> {
        (**self).mark_all_read(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_newest_first_and_scoped() {
        let store = InMemoryNotificationStore::new();
        let account = AccountId::new();
        let other = AccountId::new();

        store
            .append(Notification::new(account, None, "first"))
            .unwrap();
        store
            .append(Notification::new(account, None, "second"))
            .unwrap();
        store
            .append(Notification::new(other, None, "elsewhere"))
            .unwrap();

        let listed = store.list_for_account(account, false).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");
    }

    #[test]
    fn mark_read_is_idempotent() {
        let store = InMemoryNotificationStore::new();
        let account = AccountId::new();
        let id = store
            .append(Notification::new(account, None, "hello"))
            .unwrap();

        store.mark_read(id).unwrap();
        store.mark_read(id).unwrap();

        let listed = store.list_for_account(account, false).unwrap();
        assert!(listed[0].read);
        assert!(store.list_for_account(account, true).unwrap().is_empty());
    }

    #[test]
    fn mark_read_of_unknown_id_is_not_found() {
        let store = InMemoryNotificationStore::new();
        let ghost = NotificationId::new();
        assert_eq!(
            store.mark_read(ghost).unwrap_err(),
            NotifyError::NotFound(ghost)
        );
    }

    #[test]
    fn mark_all_read_reports_how_many_flipped() {
        let store = InMemoryNotificationStore::new();
        let account = AccountId::new();
        for i in 0..3 {
            store
                .append(Notification::new(account, None, format!("n{i}")))
                .unwrap();
        }

        assert_eq!(store.mark_all_read(account).unwrap(), 3);
        assert_eq!(store.mark_all_read(account).unwrap(), 0);
    }

    #[test]
    fn unread_filter_hides_read_entries() {
        let store = InMemoryNotificationStore::new();
        let account = AccountId::new();
        let id = store
            .append(Notification::new(account, None, "a"))
            .unwrap();
        store
            .append(Notification::new(account, None, "b"))
            .unwrap();

        store.mark_read(id).unwrap();

        let unread = store.list_for_account(account, true).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "b");
    }
}
