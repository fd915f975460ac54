//! Review record storage.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use critiq_core::{AccountId, ReviewId};

use crate::record::ReviewRecord;

/// Review store abstraction.
pub trait ReviewStore: Send + Sync {
    /// Persist a freshly created record.
    fn create(&self, record: ReviewRecord) -> Result<(), ReviewStoreError>;

    fn get(&self, id: ReviewId) -> Result<Option<ReviewRecord>, ReviewStoreError>;

    /// Persist a mutated record (state transitions, results).
    fn update(&self, record: &ReviewRecord) -> Result<(), ReviewStoreError>;

    /// All records for an account, newest first.
    fn list_for_account(&self, account_id: AccountId) -> Result<Vec<ReviewRecord>, ReviewStoreError>;
}

/// Review store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewStoreError {
    #[error("review not found: {0}")]
    NotFound(ReviewId),

    #[error("review already exists: {0}")]
    AlreadyExists(ReviewId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// In-memory review store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    records: RwLock<HashMap<ReviewId, ReviewRecord>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ReviewStore for InMemoryReviewStore {
    fn create(&self, record: ReviewRecord) -> Result<(), ReviewStoreError> {
        let mut records = self.records.write().unwrap();
        match records.entry(record.id) {
            Entry::Occupied(_) => Err(ReviewStoreError::AlreadyExists(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn get(&self, id: ReviewId) -> Result<Option<ReviewRecord>, ReviewStoreError> {
        let records = self.records.read().unwrap();
        Ok(records.get(&id).cloned())
    }

    fn update(&self, record: &ReviewRecord) -> Result<(), ReviewStoreError> {
        let mut records = self.records.write().unwrap();
        if !records.contains_key(&record.id) {
            return Err(ReviewStoreError::NotFound(record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<ReviewRecord>, ReviewStoreError> {
        let records = self.records.read().unwrap();
        let mut result: Vec<_> = records
            .values()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

impl<S> ReviewStore for Arc<S>
where
    S: ReviewStore + ?Sized,
{
    fn create(&self, record: ReviewRecord) -> Result<(), ReviewStoreError> {
        (**self).create(record)
    }

    fn get(&self, id: ReviewId) -> Result<Option<ReviewRecord>, ReviewStoreError> {
        (**self).get(id)
    }

    fn update(&self, record: &ReviewRecord) -> Result<(), ReviewStoreError> {
        (**self).update(record)
    }

    fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<ReviewRecord>, ReviewStoreError> {
        (**self).list_for_account(account_id)
    }
}
