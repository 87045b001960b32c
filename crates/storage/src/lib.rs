//! Durable storage for mirrored entries.
//!
//! Two layers live here:
//! - [`StorageBackend`] is a glorified key/value interface over byte blobs
//!   addressed by relative paths (local filesystem, in-memory mock, and a
//!   read-only wrapper).
//! - [`EntryStore`] is the Local Cache Store built on top of a backend: one
//!   `<id>.json` file per entry, holding the full remote record verbatim.

pub mod backend;
pub mod entry;
pub mod error;
pub mod file;
mod path;
mod store;

pub use crate::backend::StorageBackend;
pub use crate::entry::{EntryFile, EntryId, PersistedEntry, RemoteUser};
pub use crate::file::FileInfo;
pub use crate::path::validate as validate_path;
pub use crate::store::EntryStore;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
