use serde::Deserialize;
use shelf_storage::EntryId;

/// One item of the remote listing: enough to decide whether the cached copy
/// is still current, and where to fetch the full record from otherwise.
///
/// Listing items carry many more fields (files, owner, ...); they are
/// ignored, the full record is fetched from `url` instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRecordSummary {
    pub id: EntryId,
    pub url: String,
    pub updated_at: String,
}
