//! The sync cycle (list, reconcile, index) and its recurring schedule.

use crate::error::{ErrorKind, Result};
use crate::reconcile::{ReconcileReport, reconcile_all};
use exn::ResultExt;
use serde::Serialize;
use shelf_index::{IndexReport, SnapshotHandle, reindex};
use shelf_remote::{DEFAULT_MAX_PAGES, TransportHandle, list_all};
use shelf_storage::EntryStore;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::instrument;

/// Where and how to list remote entries.
#[derive(Debug, Clone)]
pub struct Remote {
    /// First page of the listing, credential included.
    pub first_page: String,
    /// Appended to every per-record request.
    pub credential: Option<String>,
    pub max_pages: usize,
}
impl Remote {
    pub fn new(first_page: impl Into<String>, credential: Option<String>) -> Self {
        Self { first_page: first_page.into(), credential, max_pages: DEFAULT_MAX_PAGES }
    }
}

/// Outcome of a completed cycle.
#[derive(Debug, Serialize)]
pub struct CycleReport {
    /// Summaries in the remote listing.
    pub listed: usize,
    pub reconcile: ReconcileReport,
    pub index: IndexReport,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was still running; this one did nothing.
    Skipped,
}

/// Runs sync cycles, at most one at a time.
pub struct Pipeline {
    store: EntryStore,
    transport: TransportHandle,
    remote: Remote,
    snapshots: Arc<SnapshotHandle>,
    in_flight: Mutex<()>,
}

impl Pipeline {
    pub fn new(store: EntryStore, transport: TransportHandle, remote: Remote, snapshots: Arc<SnapshotHandle>) -> Self {
        Self { store, transport, remote, snapshots, in_flight: Mutex::new(()) }
    }

    /// The handle every rebuilt index is published to.
    pub fn snapshots(&self) -> &Arc<SnapshotHandle> {
        &self.snapshots
    }

    /// Run one full cycle: list, reconcile, then rebuild and publish the
    /// index.
    ///
    /// Returns [`Skipped`](CycleOutcome::Skipped) straight away if a cycle is
    /// already running. A reconciliation pass that stops early still leads to
    /// a rebuild.
    ///
    /// # Errors
    ///
    /// - [`Listing`](ErrorKind::Listing) when the remote listing fails; the
    ///   cycle ends there and the published index is left as it was.
    /// - [`Index`](ErrorKind::Index) when the cache can't be scanned.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("A sync cycle is already running; skipping");
            return Ok(CycleOutcome::Skipped);
        };
        let summaries = list_all(&*self.transport, &self.remote.first_page, self.remote.max_pages)
            .await
            .or_raise(|| ErrorKind::Listing)?;
        let reconcile =
            reconcile_all(&self.store, &*self.transport, self.remote.credential.as_deref(), &summaries).await;
        let (_, index) = reindex(&self.store, &self.snapshots).await.or_raise(|| ErrorKind::Index)?;
        Ok(CycleOutcome::Completed(CycleReport { listed: summaries.len(), reconcile, index }))
    }

    /// Rebuild and publish the index from the cache alone, without touching
    /// the network. Waits for a running cycle to finish first.
    #[instrument(skip(self))]
    pub async fn refresh_index(&self) -> Result<IndexReport> {
        let _guard = self.in_flight.lock().await;
        let (_, report) = reindex(&self.store, &self.snapshots).await.or_raise(|| ErrorKind::Index)?;
        Ok(report)
    }

    /// Serve whatever is cached straight away, then run a cycle immediately
    /// and every `interval` after that until `shutdown` resolves.
    ///
    /// Cycles that fail are logged and retried at the next tick. Ticks missed
    /// while a slow cycle was running are dropped rather than run back to
    /// back. Shutdown is only observed between cycles.
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        if let Err(err) = self.refresh_index().await {
            tracing::error!(error = ?err, "Failed to index cached entries on startup");
        }
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown = pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutting down");
                    return;
                },
                _ = ticker.tick() => {},
            }
            match self.run_cycle().await {
                Ok(CycleOutcome::Completed(report)) => tracing::info!(
                    listed = report.listed,
                    fetched = report.reconcile.fetched,
                    indexed = report.index.indexed,
                    skipped = report.index.skipped,
                    complete = report.reconcile.is_complete(),
                    "Sync cycle finished"
                ),
                Ok(CycleOutcome::Skipped) => {},
                Err(err) => tracing::error!(error = ?err, "Sync cycle failed"),
            }
        }
    }
}
