//! Metadata parsing for mirrored entries.
//!
//! Every entry ships a small JSON metadata file (`package.json`). Those files
//! are written by hand and frequently aren't quite JSON, so [`parse`] first
//! tries a strict read and, failing that, retries on the output of
//! [`relax`](relax::relax).

pub mod error;
mod keyword;
mod models;
pub mod relax;

use exn::ResultExt;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
pub use crate::keyword::{normalize_keyword, normalize_keywords};
pub use crate::models::EntryMetadata;

/// Parse the raw text of a metadata file.
///
/// # Errors
///
/// Returns [`MalformedMetadata`](ErrorKind::MalformedMetadata), caused by the
/// error of the relaxed attempt, when neither reading succeeds.
#[instrument(level = "debug", skip(raw), fields(len = raw.len()))]
pub fn parse(raw: &str) -> Result<EntryMetadata> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let strict_err = match serde_json::from_str(raw) {
        Ok(metadata) => return Ok(metadata),
        Err(err) => ErrorKind::from(err),
    };
    tracing::debug!(error = %strict_err, "Strict metadata parse failed; retrying relaxed");
    let relaxed = relax::relax(raw).or_raise(|| ErrorKind::MalformedMetadata)?;
    serde_json::from_str(&relaxed).map_err(ErrorKind::from).or_raise(|| ErrorKind::MalformedMetadata)
}
