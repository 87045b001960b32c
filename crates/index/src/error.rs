//! Index Error Types
//!
//! Only [`Store`](ErrorKind::Store) ever escapes a rebuild. Every other kind
//! describes a single entry that was skipped.

use derive_more::{Display, Error};
use shelf_storage::EntryId;

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The cache could not be listed; nothing was indexed.
    #[display("failed to list cached entries")]
    Store,
    /// A cached record could not be read or decoded.
    #[display("unreadable cached entry {_0}")]
    Unreadable(#[error(not(source))] EntryId),
    /// A record lacks one of the files every entry must carry.
    #[display("entry {id} has no {file}")]
    MissingFile { id: EntryId, file: &'static str },
    /// A record has neither a `user` nor an `owner`.
    #[display("entry {_0} has no author")]
    MissingAuthor(#[error(not(source))] EntryId),
    /// The metadata file could not be parsed, even leniently.
    #[display("malformed metadata in entry {_0}")]
    MalformedMetadata(#[error(not(source))] EntryId),
    /// The same id was added twice to one snapshot.
    #[display("entry {_0} already indexed")]
    Duplicate(#[error(not(source))] EntryId),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store | Self::Unreadable(_))
    }
}
