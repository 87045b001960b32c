//! Sync Error Types
//!
//! A failed listing or index rebuild fails the whole cycle. The per-entry
//! kinds only ever end a reconciliation pass early; the cycle still goes on
//! to rebuild the index.

use derive_more::{Display, Error};
use shelf_storage::EntryId;

/// A sync error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote listing could not be retrieved.
    #[display("failed to list remote entries")]
    Listing,
    /// The full record for an entry could not be fetched.
    #[display("network failure fetching entry {_0}")]
    NetworkFailure(#[error(not(source))] EntryId),
    /// The remote answered with something that isn't the entry's record.
    #[display("malformed record for entry {_0}")]
    MalformedRecord(#[error(not(source))] EntryId),
    /// A fetched record could not be written to the cache.
    #[display("failed to persist entry {_0}")]
    PersistFailure(#[error(not(source))] EntryId),
    /// The cache could not be scanned to rebuild the index.
    #[display("failed to rebuild the index")]
    Index,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MalformedRecord(_))
    }
}
