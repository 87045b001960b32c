//! Talking to the remote: the paginated listing of starred entries, and
//! retrieval of individual records.
//!
//! All network access goes through the [`Transport`] trait, so the listing
//! and retrieval logic can be exercised against the in-memory
//! `MockTransport` (feature `mock`).

pub mod error;
pub mod link;
mod lister;
mod models;
mod record;
pub mod transport;
pub mod uri;

pub use crate::link::{Link, parse_link_header};
pub use crate::lister::{DEFAULT_MAX_PAGES, list_all};
pub use crate::models::RemoteRecordSummary;
pub use crate::record::fetch_record;
pub use crate::transport::{HttpTransport, Response, Transport, TransportHandle};
