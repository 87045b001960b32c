use serde::{Serialize, Serializer};
use shelf_storage::EntryId;
use std::collections::{BTreeMap, BTreeSet};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcDateTime};

/// An entry as presented to readers of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedEntry {
    pub id: EntryId,
    pub name: String,
    /// Contents of the entry's code file.
    pub code: String,
    /// The metadata description, or the record's own when that's missing.
    pub description: Option<String>,
    /// Login of the entry's author.
    pub author: String,
    /// Normalized keywords, in declaration order.
    pub keywords: Vec<String>,
}

/// An author and the entries they wrote.
///
/// Everything the remote reported about the author on first sighting is
/// carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedUser {
    pub id: u64,
    pub login: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Ids of the user's entries, in scan order.
    pub entries: Vec<EntryId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entries {
    pub by_id: BTreeMap<EntryId, IndexedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keywords {
    pub by_word: BTreeMap<String, BTreeSet<EntryId>>,
    /// `(word, ids)` pairs, most used first.
    pub list: Vec<(String, Vec<EntryId>)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Users {
    pub by_id: BTreeMap<u64, IndexedUser>,
    /// Keyed by every login an author was seen with.
    pub by_name: BTreeMap<String, IndexedUser>,
    /// Most prolific first.
    pub list: Vec<IndexedUser>,
}

/// One complete, immutable build of the index.
///
/// Every id referenced from `keywords` or `users` is present in
/// `entries.by_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub entries: Entries,
    pub keywords: Keywords,
    pub users: Users,
    /// `None` for the empty snapshot served before the first build.
    #[serde(serialize_with = "rfc3339")]
    pub built_at: Option<UtcDateTime>,
}

fn rfc3339<S: Serializer>(at: &Option<UtcDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match at {
        Some(at) => {
            let formatted = OffsetDateTime::from(*at).format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&formatted)
        },
        None => serializer.serialize_none(),
    }
}

/// A user together with their entries, resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEntries<'a> {
    pub user: &'a IndexedUser,
    pub entries: Vec<&'a IndexedEntry>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.by_id.is_empty()
    }

    pub fn entry(&self, id: &EntryId) -> Option<&IndexedEntry> {
        self.entries.by_id.get(id)
    }

    /// The user known by `login`, with their entries resolved.
    pub fn user(&self, login: &str) -> Option<UserEntries<'_>> {
        let user = self.users.by_name.get(login)?;
        let entries = user.entries.iter().filter_map(|id| self.entry(id)).collect();
        Some(UserEntries { user, entries })
    }

    /// Entries tagged with `word` (already normalized), in id order.
    pub fn keyword(&self, word: &str) -> Vec<&IndexedEntry> {
        self.keywords
            .by_word
            .get(word)
            .map(|ids| ids.iter().filter_map(|id| self.entry(id)).collect())
            .unwrap_or_default()
    }
}
