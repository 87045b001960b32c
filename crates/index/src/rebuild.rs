use crate::builder::SnapshotBuilder;
use crate::error::{ErrorKind, Result};
use crate::handle::SnapshotHandle;
use crate::models::Snapshot;
use exn::ResultExt;
use serde::Serialize;
use shelf_storage::{EntryId, EntryStore};
use std::sync::Arc;
use tracing::instrument;

/// Outcome of a rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// Build a fresh snapshot from everything in the cache.
///
/// Entries are visited in id order. An entry that can't be indexed is logged
/// and skipped; the rest of the build carries on without it.
///
/// # Errors
///
/// Returns [`Store`](ErrorKind::Store) when the cache can't be listed.
#[instrument(skip_all, fields(backend = store.backend().name()))]
pub async fn rebuild(store: &EntryStore) -> Result<(Snapshot, IndexReport)> {
    let ids = store.ids().await.or_raise(|| ErrorKind::Store)?;
    let mut builder = SnapshotBuilder::default();
    let mut report = IndexReport::default();
    for id in &ids {
        match index_one(store, &mut builder, id).await {
            Ok(()) => report.indexed += 1,
            Err(err) => {
                tracing::warn!(%id, error = ?err, "Skipping entry");
                report.skipped += 1;
            },
        }
    }
    tracing::info!(indexed = report.indexed, skipped = report.skipped, "Indexed cached entries");
    Ok((builder.finish(), report))
}

async fn index_one(store: &EntryStore, builder: &mut SnapshotBuilder, id: &EntryId) -> Result<()> {
    let record = store
        .get(id)
        .await
        .or_raise(|| ErrorKind::Unreadable(id.clone()))?
        // Listed a moment ago, gone now.
        .ok_or_else(|| ErrorKind::Unreadable(id.clone()))?;
    builder.add(&record)
}

/// [`rebuild`], then publish the result.
///
/// When the cache can't be listed, the previously published snapshot stays.
pub async fn reindex(store: &EntryStore, handle: &SnapshotHandle) -> Result<(Arc<Snapshot>, IndexReport)> {
    let (snapshot, report) = rebuild(store).await?;
    let snapshot = Arc::new(snapshot);
    handle.publish(Arc::clone(&snapshot));
    Ok((snapshot, report))
}
