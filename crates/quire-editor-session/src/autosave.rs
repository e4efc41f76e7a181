//! Debounced autosave.
//!
//! Every change re-arms a single timer; a persist happens only after the
//! author has paused for the full delay. Persists for a document are
//! serialized: a timer that fires while another persist is in flight waits
//! for it, then writes the latest snapshot.
//!
//! Background failures are logged and otherwise swallowed. Explicit saves
//! go through [`AutosaveCoordinator::save_now`] and return their error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use quire_common::{DocumentId, DocumentPatch, DocumentRecord, RecordStore, StoreError};
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Quiet-period tracker with the clock passed in.
///
/// `queue` restarts the period; `take_ready` reports once the period has
/// elapsed since the last `queue`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    pending_since: Option<u64>,
}

impl Debouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending_since: None,
        }
    }

    pub const fn queue(&mut self, now_ms: u64) {
        self.pending_since = Some(now_ms);
    }

    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending_since else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending_since = None;
            true
        } else {
            false
        }
    }

    /// When the pending action becomes ready.
    pub fn deadline(&self) -> Option<u64> {
        self.pending_since.map(|at| at + self.delay_ms)
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending_since = None;
    }
}

#[derive(Debug)]
struct Pending {
    debouncer: Debouncer,
    timer: Option<AbortHandle>,
    latest: Option<DocumentPatch>,
}

struct Inner<S> {
    store: Arc<S>,
    id: DocumentId,
    delay: Duration,
    origin: Instant,
    pending: Mutex<Pending>,
    persist_lock: tokio::sync::Mutex<()>,
    closed: AtomicBool,
}

impl<S: RecordStore + 'static> Inner<S> {
    fn pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Cancel the armed timer. The pending snapshot is returned so the
    /// caller can decide what to do with it.
    fn disarm(&self) -> Option<DocumentPatch> {
        let mut pending = self.pending();
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.debouncer.cancel();
        pending.latest.take()
    }

    async fn fire(self: Arc<Self>) {
        tokio::time::sleep(self.delay).await;

        {
            let mut pending = self.pending();
            let now = self.now_ms();
            if !pending.debouncer.take_ready(now) {
                return;
            }
            // Past this point the timer is not abortable; a new change arms
            // a fresh one.
            pending.timer = None;
        }

        let _guard = self.persist_lock.lock().await;
        // Whatever is latest once the lock is ours, not what was latest when
        // the timer fired.
        let Some(patch) = self.pending().latest.take() else {
            return;
        };
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        match self.store.update_document(&self.id, patch.clone()).await {
            Ok(_) if self.closed.load(Ordering::Acquire) => {
                tracing::debug!(id = %self.id, "autosave finished after close; result discarded");
            }
            Ok(_) => tracing::debug!(id = %self.id, "autosaved"),
            Err(err) => {
                tracing::warn!(id = %self.id, error = %err, "autosave failed");
                // Keep the content for the next attempt unless newer content
                // already replaced it.
                let mut pending = self.pending();
                if pending.latest.is_none() {
                    pending.latest = Some(patch);
                }
            }
        }
    }
}

/// Debounced, serialized persists of one document.
///
/// Dropping the coordinator closes it.
pub struct AutosaveCoordinator<S> {
    inner: Arc<Inner<S>>,
}

impl<S: RecordStore + 'static> AutosaveCoordinator<S> {
    pub fn new(store: Arc<S>, id: DocumentId, delay: Duration) -> Self {
        let delay_ms = delay.as_millis() as u64;
        Self {
            inner: Arc::new(Inner {
                store,
                id,
                delay,
                origin: Instant::now(),
                pending: Mutex::new(Pending {
                    debouncer: Debouncer::new(delay_ms),
                    timer: None,
                    latest: None,
                }),
                persist_lock: tokio::sync::Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.inner.id
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Record a change and (re)arm the timer. Ignored once closed.
    pub fn notify_change(&self, snapshot: DocumentPatch) {
        if self.is_closed() {
            return;
        }
        let mut pending = self.inner.pending();
        pending.latest = Some(snapshot);
        pending.debouncer.queue(self.inner.now_ms());
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        let task = tokio::spawn(Arc::clone(&self.inner).fire());
        pending.timer = Some(task.abort_handle());
        tracing::trace!(id = %self.inner.id, deadline = ?pending.debouncer.deadline(), "autosave armed");
    }

    /// Persist `patch` now, bypassing the debounce.
    ///
    /// The armed timer is cancelled: `patch` supersedes the pending
    /// snapshot. Waits for an in-flight background persist first.
    pub async fn save_now(&self, patch: DocumentPatch) -> Result<DocumentRecord, StoreError> {
        let superseded = self.inner.disarm();
        let _guard = self.inner.persist_lock.lock().await;
        let result = self.inner.store.update_document(&self.inner.id, patch).await;
        if result.is_err() {
            // Hand the cancelled snapshot back to the next timer.
            if let Some(patch) = superseded {
                self.inner.pending().latest.get_or_insert(patch);
            }
        }
        result
    }

    /// A change is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.inner.pending().debouncer.is_pending()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Cancel the armed timer and stop accepting changes. A persist already
    /// in flight completes; its result is discarded.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.disarm();
        tracing::debug!(id = %self.inner.id, "autosave closed");
    }
}

impl<S> Drop for AutosaveCoordinator<S> {
    fn drop(&mut self) {
        self.inner.closed.store(true, Ordering::Release);
        let mut pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }
}
