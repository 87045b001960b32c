use crate::error::{ErrorKind, Result};
use crate::models::RemoteRecordSummary;
use crate::transport::Transport;
use crate::uri::redacted;
use exn::ResultExt;
use std::collections::HashSet;
use tracing::instrument;

/// Default cap on the number of listing pages fetched in one go.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Fetch the complete remote listing, following `rel="next"` links.
///
/// Summaries come back in the order the remote listed them, page after page.
/// The listing is all or nothing: any failed page fails the whole call.
///
/// # Errors
///
/// Returns [`NetworkFailure`](ErrorKind::NetworkFailure) when a page can't be
/// fetched, isn't a success, or isn't a JSON array of summaries; and when
/// pagination runs past `max_pages` or loops back on itself.
#[instrument(skip(transport, first_page), fields(uri = %redacted(first_page)))]
pub async fn list_all(
    transport: &dyn Transport,
    first_page: &str,
    max_pages: usize,
) -> Result<Vec<RemoteRecordSummary>> {
    let mut summaries = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(first_page.to_string());
    while let Some(uri) = next.take() {
        if visited.len() >= max_pages {
            return Err(exn::Exn::from(ErrorKind::PageLimit(max_pages)).raise(ErrorKind::NetworkFailure));
        }
        if !visited.insert(uri.clone()) {
            return Err(exn::Exn::from(ErrorKind::PaginationLoop(redacted(&uri))).raise(ErrorKind::NetworkFailure));
        }
        let response = transport.get(&uri).await.or_raise(|| ErrorKind::NetworkFailure)?;
        if !response.is_success() {
            let status = ErrorKind::Status { uri: redacted(&uri), status: response.status };
            return Err(exn::Exn::from(status).raise(ErrorKind::NetworkFailure));
        }
        let page: Vec<RemoteRecordSummary> = serde_json::from_slice(&response.body)
            .or_raise(|| ErrorKind::InvalidBody(redacted(&uri)))
            .or_raise(|| ErrorKind::NetworkFailure)?;
        tracing::debug!(page = visited.len(), count = page.len(), "Fetched listing page");
        summaries.extend(page);
        next = response.next_page();
    }
    tracing::info!(pages = visited.len(), count = summaries.len(), "Listed remote entries");
    Ok(summaries)
}
