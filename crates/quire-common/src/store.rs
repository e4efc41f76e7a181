//! The record store collaborator.
//!
//! Persistence lives outside quire; the editing core only needs the four
//! CRUD calls below. Failures are opaque [`StoreError`]s and are never
//! retried implicitly.

use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::record::{DocumentId, DocumentPatch, DocumentRecord};

/// Create/read/update/delete access to stored documents.
///
/// Updates are last-write-wins; no optimistic locking is layered on top.
pub trait RecordStore: Send + Sync {
    /// Store a new record. The returned record carries its assigned id.
    fn create_document(
        &self,
        record: DocumentRecord,
    ) -> impl Future<Output = Result<DocumentRecord, StoreError>> + Send;

    fn get_document(
        &self,
        id: &DocumentId,
    ) -> impl Future<Output = Result<Option<DocumentRecord>, StoreError>> + Send;

    /// Apply a partial update and return the stored result.
    fn update_document(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> impl Future<Output = Result<DocumentRecord, StoreError>> + Send;

    fn delete_document(&self, id: &DocumentId)
    -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<DocumentId, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl RecordStore for MemoryStore {
    async fn create_document(&self, mut record: DocumentRecord) -> Result<DocumentRecord, StoreError> {
        let id = record.id.clone().unwrap_or_else(DocumentId::generate);
        record.id = Some(id.clone());
        record.updated_at = Some(Utc::now());

        let mut records = self.records.write().await;
        if records.contains_key(&id) {
            return Err(StoreError::Rejected(format!("duplicate id {id}")));
        }
        records.insert(id.clone(), record.clone());
        tracing::debug!(%id, "created document");
        Ok(record)
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update_document(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<DocumentRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.apply(patch);
        record.updated_at = Some(Utc::now());
        Ok(record.clone())
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DocumentKind, PublishStatus};

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = MemoryStore::new();
        let created = store
            .create_document(DocumentRecord::new(DocumentKind::Article, "Hello"))
            .await
            .unwrap();

        let id = created.id.clone().unwrap();
        let fetched = store.get_document(&id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Hello");
        assert!(fetched.updated_at.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = MemoryStore::new();
        let created = store
            .create_document(DocumentRecord::new(DocumentKind::Newsletter, "Weekly"))
            .await
            .unwrap();
        let id = created.id.unwrap();

        let updated = store
            .update_document(&id, DocumentPatch::default().with_status(PublishStatus::Sent))
            .await
            .unwrap();
        assert_eq!(updated.status, PublishStatus::Sent);
        assert_eq!(updated.title, "Weekly");
    }

    #[tokio::test]
    async fn test_missing_document() {
        let store = MemoryStore::new();
        let id = DocumentId::new("nope");

        assert!(store.get_document(&id).await.unwrap().is_none());
        assert!(matches!(
            store.update_document(&id, DocumentPatch::default()).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_document(&id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let mut record = DocumentRecord::new(DocumentKind::Article, "A");
        record.id = Some(DocumentId::new("fixed"));

        store.create_document(record.clone()).await.unwrap();
        assert!(matches!(
            store.create_document(record).await,
            Err(StoreError::Rejected(_))
        ));
    }
}
