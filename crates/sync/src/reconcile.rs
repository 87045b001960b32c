use crate::error::{Error, ErrorKind, Result};
use crate::freshness::check;
use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use shelf_remote::error::ErrorKind as RemoteErrorKind;
use shelf_remote::{RemoteRecordSummary, Transport, fetch_record};
use shelf_storage::{EntryId, EntryStore};
use std::pin::pin;

/// Progress events emitted by [`reconcile`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. Per summary, in listing order: either [`UpToDate`](Self::UpToDate), or
///    [`Fetching`](Self::Fetching) followed by [`Stored`](Self::Stored).
/// 3. [`Complete`](Self::Complete), exactly once.
///
/// The first failure is yielded as an `Err` item and ends the stream; no
/// further summaries are processed and [`Complete`](Self::Complete) is never
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    Started,
    /// The cached copy matches the listing; nothing was fetched.
    UpToDate(EntryId),
    /// The cached copy is missing or stale and is being fetched.
    Fetching(EntryId),
    /// The fetched record replaced the cached copy.
    Stored(EntryId),
    Complete,
}

/// Bring the cache in line with `summaries`, one entry at a time.
///
/// Entries are handled strictly in order, and the next one is only looked at
/// once the previous one is settled. Cached entries that aren't listed are
/// left alone.
pub fn reconcile<'a>(
    store: &'a EntryStore,
    transport: &'a dyn Transport,
    credential: Option<&'a str>,
    summaries: &'a [RemoteRecordSummary],
) -> impl Stream<Item = Result<ReconcileEvent>> + 'a {
    stream!({
        yield Ok(ReconcileEvent::Started);
        for summary in summaries {
            let id = &summary.id;
            let freshness = check(store, summary).await;
            if !freshness.needs_fetch() {
                tracing::debug!(%id, "Entry is up to date");
                yield Ok(ReconcileEvent::UpToDate(id.clone()));
                continue;
            }
            tracing::info!(%id, ?freshness, "Fetching entry");
            yield Ok(ReconcileEvent::Fetching(id.clone()));

            let body = match fetch_record(transport, summary, credential).await {
                Ok(body) => body,
                Err(err) => {
                    let kind = match &*err {
                        RemoteErrorKind::MalformedRecord(_) => ErrorKind::MalformedRecord(id.clone()),
                        _ => ErrorKind::NetworkFailure(id.clone()),
                    };
                    yield Err(err.raise(kind));
                    return;
                },
            };
            if let Err(err) = store.put(id, &body).await {
                yield Err(err.raise(ErrorKind::PersistFailure(id.clone())));
                return;
            }
            yield Ok(ReconcileEvent::Stored(id.clone()));
        }
        yield Ok(ReconcileEvent::Complete);
    })
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default, Serialize)]
pub struct ReconcileReport {
    /// Summaries whose cached copy was looked at.
    pub checked: usize,
    pub up_to_date: usize,
    /// Records fetched and stored.
    pub fetched: usize,
    /// The failure that ended the pass early, if any.
    #[serde(serialize_with = "display_error")]
    pub aborted: Option<Error>,
}
impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

fn display_error<S: serde::Serializer>(err: &Option<Error>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match err {
        Some(err) => serializer.collect_str(&**err),
        None => serializer.serialize_none(),
    }
}

/// Run [`reconcile`] to completion and tally the events.
///
/// Never fails: a failure ends the pass and is recorded in
/// [`aborted`](ReconcileReport::aborted).
pub async fn reconcile_all(
    store: &EntryStore,
    transport: &dyn Transport,
    credential: Option<&str>,
    summaries: &[RemoteRecordSummary],
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut events = pin!(reconcile(store, transport, credential, summaries));
    while let Some(event) = events.next().await {
        match event {
            Ok(ReconcileEvent::Started | ReconcileEvent::Complete) => {},
            Ok(ReconcileEvent::UpToDate(_)) => {
                report.checked += 1;
                report.up_to_date += 1;
            },
            Ok(ReconcileEvent::Fetching(_)) => report.checked += 1,
            Ok(ReconcileEvent::Stored(_)) => report.fetched += 1,
            Err(err) => {
                tracing::error!(error = ?err, "Reconciliation stopped early");
                report.aborted = Some(err);
            },
        }
    }
    tracing::info!(
        checked = report.checked,
        up_to_date = report.up_to_date,
        fetched = report.fetched,
        remaining = summaries.len() - report.checked,
        "Reconciled cache with remote listing"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use shelf_remote::transport::{MockTransport, Response};
    use shelf_storage::backend::MockBackend;
    use std::sync::Arc;

    const UPDATED: &str = "2020-01-01T00:00:00Z";

    fn summary(id: &str, updated_at: &str) -> RemoteRecordSummary {
        RemoteRecordSummary {
            id: id.parse().unwrap(),
            url: format!("https://api.test/gists/{id}"),
            updated_at: updated_at.to_string(),
        }
    }

    fn record(id: &str, updated_at: &str) -> String {
        format!(r#"{{"id":"{id}","updated_at":"{updated_at}"}}"#)
    }

    fn id(s: &str) -> EntryId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_event_order() {
        let backend = Arc::new(MockBackend::with_files([("1.json", record("1", UPDATED))]));
        let store = EntryStore::new(backend.clone());
        let transport = MockTransport::default().with_response("https://api.test/gists/2", Response::ok(record("2", UPDATED)));
        let summaries = [summary("1", UPDATED), summary("2", UPDATED)];
        let events: Vec<ReconcileEvent> = reconcile(&store, &transport, None, &summaries).try_collect().await.unwrap();
        assert_eq!(
            events,
            vec![
                ReconcileEvent::Started,
                ReconcileEvent::UpToDate(id("1")),
                ReconcileEvent::Fetching(id("2")),
                ReconcileEvent::Stored(id("2")),
                ReconcileEvent::Complete,
            ]
        );
        assert_eq!(transport.requests(), vec!["https://api.test/gists/2"]);
        assert_eq!(backend.contents("2.json").await.unwrap(), record("2", UPDATED).as_bytes());
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let store = EntryStore::new(Arc::new(MockBackend::default()));
        let transport = MockTransport::default();
        let report = reconcile_all(&store, &transport, None, &[]).await;
        assert!(report.is_complete());
        assert_eq!(report.checked, 0);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_refetched() {
        let backend = Arc::new(MockBackend::with_files([("1.json", "{truncated")]));
        let store = EntryStore::new(backend.clone());
        let transport = MockTransport::default().with_response("https://api.test/gists/1", Response::ok(record("1", UPDATED)));
        let report = reconcile_all(&store, &transport, None, &[summary("1", UPDATED)]).await;
        assert_eq!(report.fetched, 1);
        assert_eq!(backend.contents("1.json").await.unwrap(), record("1", UPDATED).as_bytes());
    }

    #[tokio::test]
    async fn test_network_failure_stops_the_pass() {
        let store = EntryStore::new(Arc::new(MockBackend::default()));
        let transport = MockTransport::default()
            .with_response("https://api.test/gists/1", Response::status(500))
            .with_response("https://api.test/gists/2", Response::ok(record("2", UPDATED)));
        let report = reconcile_all(&store, &transport, None, &[summary("1", UPDATED), summary("2", UPDATED)]).await;
        assert_eq!(*report.aborted.unwrap(), ErrorKind::NetworkFailure(id("1")));
        assert_eq!(report.fetched, 0);
        assert_eq!(transport.requests(), vec!["https://api.test/gists/1"]);
    }

    #[tokio::test]
    async fn test_malformed_record_stops_the_pass() {
        let backend = Arc::new(MockBackend::default());
        let store = EntryStore::new(backend.clone());
        let transport = MockTransport::default()
            .with_response("https://api.test/gists/1", Response::ok(r#"{"message": "Not Found"}"#));
        let report = reconcile_all(&store, &transport, None, &[summary("1", UPDATED)]).await;
        assert_eq!(*report.aborted.unwrap(), ErrorKind::MalformedRecord(id("1")));
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_stops_the_pass() {
        let backend = Arc::new(MockBackend::default());
        backend.fail_writes(true);
        let store = EntryStore::new(backend.clone());
        let transport = MockTransport::default()
            .with_response("https://api.test/gists/1", Response::ok(record("1", UPDATED)))
            .with_response("https://api.test/gists/2", Response::ok(record("2", UPDATED)));
        let report = reconcile_all(&store, &transport, None, &[summary("1", UPDATED), summary("2", UPDATED)]).await;
        assert_eq!(*report.aborted.unwrap(), ErrorKind::PersistFailure(id("1")));
        assert_eq!(report.checked, 1);
        assert_eq!(transport.requests().len(), 1);
    }
}
