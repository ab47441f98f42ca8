use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::info;

use super::Talk;
use crate::Collection;
use crate::JsonFileStore;
use crate::StorageError;

/// Talks keyed by title, cached in memory and written through to a [`JsonFileStore`].
#[derive(Debug)]
pub struct TalkStore {
    talks: RwLock<IndexMap<String, Talk>>,
    file: JsonFileStore,
}

impl TalkStore {
    /// Loads existing talks from `file`; a missing file starts an empty board.
    pub async fn open(file: JsonFileStore) -> Result<Self, StorageError> {
        let talks = file.load::<Talk>().await?;
        info!("Talk store opened with {} talks", talks.len());
        Ok(Self {
            talks: RwLock::new(talks),
            file,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.talks.read().len()
    }

    /// Copy of the current mapping, for building the next state of a mutation.
    pub(crate) fn to_map(&self) -> IndexMap<String, Talk> {
        self.talks.read().clone()
    }

    /// Persists `next` and, only once the write succeeded, makes it current.
    pub(crate) async fn replace(
        &self,
        next: IndexMap<String, Talk>,
    ) -> Result<(), StorageError> {
        self.file.save(&next).await?;
        *self.talks.write() = next;
        Ok(())
    }
}

impl Collection for TalkStore {
    type Document = Talk;

    fn list_all(&self) -> Vec<Talk> {
        self.talks.read().values().cloned().collect()
    }
}
