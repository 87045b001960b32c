use serde::Serialize;
use shelf_remote::RemoteRecordSummary;
use shelf_storage::EntryStore;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// How the cached copy of an entry compares to the remote listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Freshness {
    /// Nothing usable is cached.
    Missing,
    /// A copy is cached, but the remote has changed since.
    Stale,
    Fresh,
}
impl Freshness {
    /// Compare a cached `updated_at` (if any) against the listed one.
    ///
    /// Timestamps that both parse as RFC 3339 are compared as instants, so
    /// `2020-01-01T00:00:00Z` and `2020-01-01T00:00:00+00:00` agree. Anything
    /// else is compared verbatim.
    pub fn of(cached: Option<&str>, listed: &str) -> Self {
        let Some(cached) = cached else {
            return Self::Missing;
        };
        let same = match (OffsetDateTime::parse(cached, &Rfc3339), OffsetDateTime::parse(listed, &Rfc3339)) {
            (Ok(cached), Ok(listed)) => cached == listed,
            _ => cached == listed,
        };
        if same { Self::Fresh } else { Self::Stale }
    }

    pub fn needs_fetch(self) -> bool {
        self != Self::Fresh
    }
}

/// Freshness of the cached copy of `summary`'s entry.
///
/// A cached copy that can't be read or decoded counts as
/// [`Missing`](Freshness::Missing): fetching it again is the only way to
/// repair it.
pub(crate) async fn check(store: &EntryStore, summary: &RemoteRecordSummary) -> Freshness {
    match store.get(&summary.id).await {
        Ok(cached) => Freshness::of(cached.as_ref().map(|record| record.updated_at.as_str()), &summary.updated_at),
        Err(err) => {
            tracing::warn!(id = %summary.id, error = ?err, "Cached entry is unusable; refetching");
            Freshness::Missing
        },
    }
}
