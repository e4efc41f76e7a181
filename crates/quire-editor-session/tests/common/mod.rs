#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use quire_common::{
    DocumentId, DocumentKind, DocumentPatch, DocumentRecord, MemoryStore, RecordStore, StoreError,
};
use quire_editor_session::{EmailTransport, Notice, NoticeLevel, Notifier, OutgoingEmail, TransportError};
use tokio::time::Instant;

/// Memory store that records when each update started and finished.
pub struct RecordingStore {
    inner: MemoryStore,
    origin: Instant,
    latency: Duration,
    fail_next: AtomicUsize,
    updates: Mutex<Vec<(Duration, Duration)>>,
}

impl RecordingStore {
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            origin: Instant::now(),
            latency,
            fail_next: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// `(started, finished)` of every update, relative to creation.
    pub fn updates(&self) -> Vec<(Duration, Duration)> {
        self.updates.lock().unwrap().clone()
    }

    pub async fn markdown(&self, id: &DocumentId) -> String {
        self.inner
            .get_document(id)
            .await
            .unwrap()
            .map(|r| r.markdown_source)
            .unwrap_or_default()
    }

    pub async fn seed(&self, kind: DocumentKind, title: &str) -> DocumentId {
        let record = self
            .inner
            .create_document(DocumentRecord::new(kind, title))
            .await
            .unwrap();
        record.id.unwrap()
    }
}

impl RecordStore for RecordingStore {
    async fn create_document(&self, record: DocumentRecord) -> Result<DocumentRecord, StoreError> {
        self.inner.create_document(record).await
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        self.inner.get_document(id).await
    }

    async fn update_document(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<DocumentRecord, StoreError> {
        let started = self.origin.elapsed();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let result = if failing {
            Err(StoreError::Network("connection reset".into()))
        } else {
            self.inner.update_document(id, patch).await
        };
        self.updates
            .lock()
            .unwrap()
            .push((started, self.origin.elapsed()));
        result
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.inner.delete_document(id).await
    }
}

/// Store that is always unreachable.
pub struct DownStore;

impl RecordStore for DownStore {
    async fn create_document(&self, _: DocumentRecord) -> Result<DocumentRecord, StoreError> {
        Err(StoreError::Network("down".into()))
    }

    async fn get_document(&self, _: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        Err(StoreError::Network("down".into()))
    }

    async fn update_document(
        &self,
        _: &DocumentId,
        _: DocumentPatch,
    ) -> Result<DocumentRecord, StoreError> {
        Err(StoreError::Network("down".into()))
    }

    async fn delete_document(&self, _: &DocumentId) -> Result<(), StoreError> {
        Err(StoreError::Network("down".into()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn levels(&self) -> Vec<NoticeLevel> {
        self.notices.lock().unwrap().iter().map(|n| n.level).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl EmailTransport for RecordingTransport {
    async fn send(&self, email: OutgoingEmail) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError("smtp refused".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub fn markdown_patch(text: &str) -> DocumentPatch {
    DocumentPatch {
        markdown_source: Some(text.to_string()),
        ..Default::default()
    }
}
