//! The talk operations that sit between HTTP handlers and the document store.
//!
//! Every successful mutation is persisted before it becomes visible and then
//! advances the collection version exactly once. Rejected requests and failed
//! writes leave both the store and the version untouched.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::Comment;
use super::CommentSubmission;
use super::Talk;
use super::TalkStore;
use super::TalkSubmission;
use crate::metrics::MUTATIONS_METRIC;
use crate::ChangeNotifier;
use crate::Collection;
use crate::StorageError;
use crate::TalkError;
use crate::Version;

pub struct TalkService {
    talks: Arc<TalkStore>,
    notifier: Arc<ChangeNotifier<TalkStore>>,
    /// Serializes read-modify-write cycles so mutations apply in handler order
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for TalkService {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TalkService")
            .field("talks", &self.talks.len())
            .field("version", &self.notifier.version())
            .finish()
    }
}

impl TalkService {
    pub fn new(
        talks: Arc<TalkStore>,
        notifier: Arc<ChangeNotifier<TalkStore>>,
    ) -> Self {
        Self {
            talks,
            notifier,
            write_lock: Mutex::new(()),
        }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier<TalkStore>> {
        &self.notifier
    }

    pub fn list_all(&self) -> Vec<Talk> {
        self.talks.list_all()
    }

    /// Creates or replaces the talk titled `title`. A replaced talk loses its comments.
    pub async fn submit(
        &self,
        title: &str,
        body: &Value,
    ) -> Result<Version, TalkError> {
        let submission = TalkSubmission::from_json(body)?;

        let _guard = self.write_lock.lock().await;
        let mut next = self.talks.to_map();
        next.insert(title.to_string(), submission.into_talk(title));
        self.persist(next, "submit").await?;

        let version = self.notifier.notify_changed();
        info!(%version, title, "Talk submitted");
        Ok(version)
    }

    /// Removes `title` if present. Always advances the version.
    pub async fn delete(
        &self,
        title: &str,
    ) -> Result<Version, TalkError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.talks.to_map();
        let existed = next.shift_remove(title).is_some();
        self.persist(next, "delete").await?;

        let version = self.notifier.notify_changed();
        info!(%version, title, existed, "Talk deleted");
        Ok(version)
    }

    pub async fn add_comment(
        &self,
        title: &str,
        body: &Value,
    ) -> Result<Version, TalkError> {
        let comment: Comment = CommentSubmission::from_json(body)?.into();

        let _guard = self.write_lock.lock().await;
        let mut next = self.talks.to_map();
        let Some(talk) = next.get_mut(title) else {
            debug!(title, "Comment on unknown talk");
            return Err(TalkError::NotFound(title.to_string()));
        };
        talk.comments.push(comment);
        self.persist(next, "comment").await?;

        let version = self.notifier.notify_changed();
        info!(%version, title, "Comment added");
        Ok(version)
    }

    async fn persist(
        &self,
        next: IndexMap<String, Talk>,
        kind: &'static str,
    ) -> Result<(), StorageError> {
        self.talks.replace(next).await.map_err(|e| {
            error!("Failed to persist {} mutation: {}", kind, e);
            e
        })?;
        MUTATIONS_METRIC.with_label_values(&[kind]).inc();
        Ok(())
    }
}
