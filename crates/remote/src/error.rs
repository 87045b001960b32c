//! Remote Error Types
//!
//! Callers only ever need to tell two situations apart: the remote could not
//! be talked to ([`NetworkFailure`](ErrorKind::NetworkFailure)), or it
//! answered with something that isn't a record
//! ([`MalformedRecord`](ErrorKind::MalformedRecord)). The remaining kinds
//! are attached underneath those two as the cause.

use derive_more::{Display, Error};
use shelf_storage::EntryId;

/// A remote error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Listing or retrieval could not be completed.
    #[display("network failure")]
    NetworkFailure,
    /// The remote answered, but the body is not the record that was asked for.
    #[display("malformed record for entry {_0}")]
    MalformedRecord(#[error(not(source))] EntryId),
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[display("request to {_0} failed")]
    Transport(#[error(not(source))] String),
    /// The remote responded with a non-success status.
    #[display("{uri} responded with status {status}")]
    Status { uri: String, status: u16 },
    /// A listing page is not a JSON array of entry summaries.
    #[display("unexpected listing page from {_0}")]
    InvalidBody(#[error(not(source))] String),
    #[display("invalid URI: {_0}")]
    InvalidUri(#[error(not(source))] String),
    /// Pagination did not finish within the configured number of pages.
    #[display("gave up after {_0} pages")]
    PageLimit(#[error(not(source))] usize),
    /// A `next` link pointed back at a page that was already fetched.
    #[display("pagination loops back to {_0}")]
    PaginationLoop(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkFailure | Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
