use crate::BackendHandle;
use crate::entry::{EntryId, PersistedEntry};
use crate::error::{ErrorKind, Result};
use std::path::PathBuf;
use tracing::instrument;

const EXTENSION: &str = ".json";

/// The Local Cache Store: one persisted record per entry id.
///
/// Records live at `<id>.json` directly under the backend root and hold the
/// remote response body verbatim. Nothing is ever deleted from here.
#[derive(Clone)]
pub struct EntryStore {
    backend: BackendHandle,
}

impl EntryStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    /// Backend path of the record for `id`.
    pub fn path_for(id: &EntryId) -> PathBuf {
        PathBuf::from(format!("{id}{EXTENSION}"))
    }

    /// Every entry id currently cached, sorted.
    ///
    /// Files that aren't `<valid id>.json` (temporary files, strays dropped
    /// into the directory by hand) are ignored.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn ids(&self) -> Result<Vec<EntryId>> {
        let mut ids: Vec<EntryId> = self
            .backend
            .list()
            .await?
            .iter()
            .filter_map(|info| info.file_name()?.strip_suffix(EXTENSION)?.parse().ok())
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Raw cached body for `id`, or `None` when nothing is cached.
    pub async fn read_raw(&self, id: &EntryId) -> Result<Option<Vec<u8>>> {
        match self.backend.read(&Self::path_for(id)).await {
            Ok(body) => Ok(Some(body)),
            Err(err) if matches!(&*err, ErrorKind::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Decoded cached record for `id`, or `None` when nothing is cached.
    ///
    /// A cached body that doesn't decode is an
    /// [`InvalidRecord`](ErrorKind::InvalidRecord) error rather than `None`,
    /// so callers can tell "never fetched" from "corrupt".
    pub async fn get(&self, id: &EntryId) -> Result<Option<PersistedEntry>> {
        let Some(body) = self.read_raw(id).await? else {
            return Ok(None);
        };
        let record = PersistedEntry::from_slice(&body).map_err(|e| ErrorKind::InvalidRecord(format!("{id}: {e}")))?;
        if record.id != *id {
            exn::bail!(ErrorKind::InvalidRecord(format!("{id}: file holds record {}", record.id)));
        }
        Ok(Some(record))
    }

    /// Persist a record body for `id`, replacing whatever was cached.
    #[instrument(skip(self, body), fields(backend = self.backend.name(), bytes = body.len()))]
    pub async fn put(&self, id: &EntryId, body: &[u8]) -> Result<()> {
        self.backend.write(&Self::path_for(id), body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageBackend;
    use crate::backend::LocalBackend;
    use std::path::Path;
    use std::sync::Arc;

    fn store() -> (tempfile::TempDir, EntryStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("entries", temp_dir.path()).unwrap();
        (temp_dir, EntryStore::new(Arc::new(backend)))
    }

    fn id(s: &str) -> EntryId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (_tmp, store) = store();
        let body = br#"{"id":"abc","updated_at":"2020-01-01"}"#;
        store.put(&id("abc"), body).await.unwrap();
        assert_eq!(store.read_raw(&id("abc")).await.unwrap().unwrap(), body);
        let record = store.get(&id("abc")).await.unwrap().unwrap();
        assert_eq!(record.updated_at, "2020-01-01");
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (_tmp, store) = store();
        assert!(store.get(&id("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_corrupt_is_error() {
        let (_tmp, store) = store();
        store.put(&id("abc"), b"<html>rate limited</html>").await.unwrap();
        let err = store.get(&id("abc")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn test_get_rejects_mismatched_id() {
        let (_tmp, store) = store();
        store.put(&id("abc"), br#"{"id":"def","updated_at":"x"}"#).await.unwrap();
        let err = store.get(&id("abc")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn test_ids_are_sorted_and_filtered() {
        let (_tmp, store) = store();
        for name in ["b.json", "a.json", "notes.txt", "c.json.tmp", "bad id.json"] {
            store.backend().write(Path::new(name), b"{}").await.unwrap();
        }
        assert_eq!(store.ids().await.unwrap(), vec![id("a"), id("b")]);
    }
}
