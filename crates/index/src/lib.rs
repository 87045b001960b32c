//! The in-memory index over cached entries.
//!
//! [`rebuild`] scans the cache and produces an immutable [`Snapshot`];
//! [`SnapshotHandle`] holds the one currently published. Query
//! collaborators only ever read snapshots, so a rebuild never blocks them.

mod builder;
pub mod error;
mod handle;
mod models;
mod rebuild;

pub use crate::builder::{CODE_FILE, METADATA_FILE, SnapshotBuilder};
pub use crate::handle::SnapshotHandle;
pub use crate::models::{Entries, IndexedEntry, IndexedUser, Keywords, Snapshot, UserEntries, Users};
pub use crate::rebuild::{IndexReport, rebuild, reindex};
