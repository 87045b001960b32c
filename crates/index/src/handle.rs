use crate::models::Snapshot;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// The process-wide published snapshot.
///
/// Readers take a cheap reference to whichever snapshot is current and keep
/// reading it for as long as they like; publishing swaps in a new one
/// atomically without waiting for them. Until the first publish, readers see
/// an empty snapshot.
pub struct SnapshotHandle {
    current: ArcSwap<Snapshot>,
}

impl SnapshotHandle {
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the current snapshot, returning the one it replaced.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> Arc<Snapshot> {
        tracing::debug!(entries = snapshot.len(), "Publishing index snapshot");
        self.current.swap(snapshot)
    }
}
impl Default for SnapshotHandle {
    fn default() -> Self {
        Self { current: ArcSwap::from_pointee(Snapshot::default()) }
    }
}
