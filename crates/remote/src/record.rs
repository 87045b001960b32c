use crate::error::{ErrorKind, Result};
use crate::models::RemoteRecordSummary;
use crate::transport::Transport;
use crate::uri::{redacted, with_credential};
use exn::ResultExt;
use shelf_storage::PersistedEntry;
use tracing::instrument;

/// Fetch the full record behind a listing summary.
///
/// Returns the response body untouched, ready to be cached verbatim, once it
/// has been checked to decode as the record the summary points at.
///
/// # Errors
///
/// - [`NetworkFailure`](ErrorKind::NetworkFailure) when there's no response
///   or the status is not a success.
/// - [`MalformedRecord`](ErrorKind::MalformedRecord) when the body isn't a
///   record, or is a record for a different id.
#[instrument(skip_all, fields(id = %summary.id))]
pub async fn fetch_record(
    transport: &dyn Transport,
    summary: &RemoteRecordSummary,
    credential: Option<&str>,
) -> Result<Vec<u8>> {
    let uri = with_credential(&summary.url, credential).or_raise(|| ErrorKind::NetworkFailure)?;
    let response = transport.get(&uri).await.or_raise(|| ErrorKind::NetworkFailure)?;
    if !response.is_success() {
        let status = ErrorKind::Status { uri: redacted(&uri), status: response.status };
        return Err(exn::Exn::from(status).raise(ErrorKind::NetworkFailure));
    }
    let record =
        PersistedEntry::from_slice(&response.body).or_raise(|| ErrorKind::MalformedRecord(summary.id.clone()))?;
    if record.id != summary.id {
        exn::bail!(ErrorKind::MalformedRecord(summary.id.clone()));
    }
    Ok(response.body)
}
