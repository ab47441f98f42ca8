//! Version tracking and long-poll waiter bookkeeping for one document collection.
//!
//! ```text
//! GET /api/talks ──► poll(tag, wait)
//!                      │ tag != version ───────────► Fresh(snapshot)
//!                      │ tag == version, no wait ──► NotModified
//!                      │ tag == version, wait ─────► park oneshot in waiters
//!                      ▼                                   │
//!               timeout(wait, rx) ◄── notify_changed() ────┘ (drain + send)
//! ```
//!
//! The version counter and the waiter map share one lock, so "compare tag and
//! register" in `poll` and "bump version and drain" in `notify_changed` are
//! each atomic. A waiter is resolved by whichever path removes it from the map
//! first; the other path finds it gone and backs off.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::trace;

use super::Version;
use crate::metrics::COLLECTION_VERSION_METRIC;
use crate::metrics::POLL_RESPONSES_METRIC;
use crate::metrics::POLL_WAITERS_METRIC;
use crate::PollConfig;

/// Source of the documents served in a snapshot.
///
/// Listing must reflect every mutation that completed before the call and must
/// not fail; implementations serve it from memory.
#[cfg_attr(test, automock(type Document = String;))]
pub trait Collection: Send + Sync + 'static {
    type Document: Serialize + Clone + Send + Sync + 'static;

    fn list_all(&self) -> Vec<Self::Document>;
}

/// The full collection paired with the version it was read at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<D> {
    pub version: Version,
    pub documents: Vec<D>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollResponse<D> {
    /// 200 with body, `ETag` and `Cache-Control: no-store`
    Fresh(Arc<Snapshot<D>>),
    /// 304, no body
    NotModified,
}

impl<D> PollResponse<D> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, PollResponse::Fresh(_))
    }
}

type WaiterSender<D> = oneshot::Sender<Arc<Snapshot<D>>>;

struct NotifierState<D> {
    version: Version,
    next_waiter_id: u64,
    waiters: HashMap<u64, WaiterSender<D>>,
    /// Set once by `close`; parking is refused afterwards
    closed: bool,
}

/// Removes a parked waiter when its request future goes away before resolution.
struct WaiterGuard<'a, D> {
    state: &'a Mutex<NotifierState<D>>,
    id: u64,
}

impl<D> Drop for WaiterGuard<'_, D> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.waiters.remove(&self.id).is_some() {
            POLL_WAITERS_METRIC.set(state.waiters.len() as i64);
            trace!(waiter_id = self.id, "Abandoned waiter removed");
        }
    }
}

/// Change-notification core for a collection of documents.
///
/// Construct once at process start and share through `Arc`; only
/// [`ChangeNotifier::notify_changed`] advances the version.
pub struct ChangeNotifier<C: Collection> {
    collection: Arc<C>,
    state: Mutex<NotifierState<C::Document>>,
    snapshots: watch::Sender<Arc<Snapshot<C::Document>>>,
    closed: watch::Sender<bool>,
    config: PollConfig,
}

impl<C: Collection> std::fmt::Debug for ChangeNotifier<C> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ChangeNotifier")
            .field("version", &state.version)
            .field("waiters", &state.waiters.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: Collection> ChangeNotifier<C> {
    pub fn new(
        collection: Arc<C>,
        config: PollConfig,
    ) -> Self {
        let initial = Arc::new(Snapshot {
            version: Version::INITIAL,
            documents: collection.list_all(),
        });
        let (snapshots, _) = watch::channel(initial);
        let (closed, _) = watch::channel(false);
        COLLECTION_VERSION_METRIC.set(0);

        Self {
            collection,
            state: Mutex::new(NotifierState {
                version: Version::INITIAL,
                next_waiter_id: 1,
                waiters: HashMap::new(),
                closed: false,
            }),
            snapshots,
            closed,
            config,
        }
    }

    pub fn version(&self) -> Version {
        self.state.lock().version
    }

    /// Number of requests currently parked.
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Receiver that always holds the latest snapshot; intermediate versions
    /// may be skipped by slow readers.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<C::Document>>> {
        self.snapshots.subscribe()
    }

    /// Answers a "give me the talks" request.
    ///
    /// `request_tag` is the client's last-seen version (quotes already
    /// stripped); `wait` is the client's wait budget, clamped to
    /// `max_wait_secs`. Never fails.
    pub async fn poll(
        &self,
        request_tag: Option<&str>,
        wait: Option<Duration>,
    ) -> PollResponse<C::Document> {
        let (id, mut rx, wait) = {
            let mut state = self.state.lock();

            if !state.version.matches_tag(request_tag) {
                let snapshot = self.snapshot_at(state.version);
                POLL_RESPONSES_METRIC.with_label_values(&["fresh"]).inc();
                return PollResponse::Fresh(snapshot);
            }

            let Some(wait) = wait.filter(|_| !state.closed) else {
                POLL_RESPONSES_METRIC.with_label_values(&["not_modified"]).inc();
                return PollResponse::NotModified;
            };

            let (tx, rx) = oneshot::channel();
            let id = state.next_waiter_id;
            state.next_waiter_id += 1;
            state.waiters.insert(id, tx);
            POLL_WAITERS_METRIC.set(state.waiters.len() as i64);

            (id, rx, self.config.clamp_wait(wait))
        };

        let _guard = WaiterGuard {
            state: &self.state,
            id,
        };
        trace!(waiter_id = id, ?wait, "Waiter parked");

        match tokio::time::timeout(wait, &mut rx).await {
            Ok(Ok(snapshot)) => {
                POLL_RESPONSES_METRIC.with_label_values(&["fresh"]).inc();
                PollResponse::Fresh(snapshot)
            }
            // Sender dropped without a snapshot: nothing changed for this client
            Ok(Err(_)) => {
                POLL_RESPONSES_METRIC.with_label_values(&["not_modified"]).inc();
                PollResponse::NotModified
            }
            Err(_elapsed) => {
                let removed = {
                    let mut state = self.state.lock();
                    let removed = state.waiters.remove(&id).is_some();
                    POLL_WAITERS_METRIC.set(state.waiters.len() as i64);
                    removed
                };

                if removed {
                    trace!(waiter_id = id, "Waiter timed out");
                    POLL_RESPONSES_METRIC.with_label_values(&["timeout"]).inc();
                    return PollResponse::NotModified;
                }

                // A notification drained this waiter before the timer was
                // handled; its snapshot is already in the channel.
                match rx.try_recv() {
                    Ok(snapshot) => {
                        POLL_RESPONSES_METRIC.with_label_values(&["fresh"]).inc();
                        PollResponse::Fresh(snapshot)
                    }
                    Err(_) => {
                        POLL_RESPONSES_METRIC.with_label_values(&["timeout"]).inc();
                        PollResponse::NotModified
                    }
                }
            }
        }
    }

    /// Advances the version by one and releases every parked waiter with a
    /// snapshot read at the new version.
    ///
    /// Must only be called after a mutation has been durably applied.
    pub fn notify_changed(&self) -> Version {
        let mut state = self.state.lock();
        state.version = state.version.next();
        let version = state.version;

        let snapshot = self.snapshot_at(version);
        let waiters = std::mem::take(&mut state.waiters);
        let released = waiters.len();
        for (_, tx) in waiters {
            // Receiver may already be gone if its request was dropped
            let _ = tx.send(Arc::clone(&snapshot));
        }
        self.snapshots.send_replace(snapshot);

        COLLECTION_VERSION_METRIC.set(version.get() as i64);
        POLL_WAITERS_METRIC.set(0);
        debug!(%version, released, "Collection changed");

        version
    }

    /// Stops parking requests and answers every parked one with `NotModified`.
    ///
    /// Called on shutdown so open connections can finish. Later polls still get
    /// immediate answers; later notifications still advance the version.
    pub fn close(&self) {
        let released = {
            let mut state = self.state.lock();
            state.closed = true;
            // Dropping the senders resolves each receiver with `NotModified`
            let waiters = std::mem::take(&mut state.waiters);
            POLL_WAITERS_METRIC.set(0);
            waiters.len()
        };
        self.closed.send_replace(true);
        info!(released, "Change notifier closed");
    }

    /// Resolves once [`ChangeNotifier::close`] has been called.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.closed.subscribe();
        async move {
            let _ = rx.wait_for(|closed| *closed).await;
        }
    }

    fn snapshot_at(
        &self,
        version: Version,
    ) -> Arc<Snapshot<C::Document>> {
        Arc::new(Snapshot {
            version,
            documents: self.collection.list_all(),
        })
    }
}
