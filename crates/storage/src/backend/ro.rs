//! Read-only storage backend.
//!
//! Wraps another backend and drops write operations while still reporting
//! success, so a dry-run sync can fetch and index without touching the cache.

use async_trait::async_trait;
use std::path::Path;

use crate::{BackendHandle, StorageBackend, backend::FileInfoStream, error::Result};

/// Read-only storage backend.
///
/// Silently drops all write operations, logging an
/// [`info event`](tracing::Event) for each.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream(&self) -> FileInfoStream<'_> {
        self.inner.list_stream()
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(backend = self.inner.name(), path = %path.display(), bytes = data.len(), "Skipping write during read-only mode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let inner = LocalBackend::new("entries", temp_dir.path()).unwrap();
        inner.write(Path::new("abc.json"), b"cached").await.unwrap();
        let backend = ReadOnlyBackend::new(Arc::new(inner));
        backend.write(Path::new("abc.json"), b"fresh").await.unwrap();
        backend.write(Path::new("def.json"), b"fresh").await.unwrap();
        assert_eq!(backend.read(Path::new("abc.json")).await.unwrap(), b"cached");
        assert_eq!(backend.list().await.unwrap().len(), 1);
        assert_eq!(backend.name(), "entries");
    }
}
