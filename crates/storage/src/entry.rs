//! Entry identifiers and the persisted record shape.

use crate::error::ErrorKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const MAX_ID_LEN: usize = 128;

/// Identifier of a mirrored entry.
///
/// Ids double as cache file names (`<id>.json`), so only ASCII alphanumerics,
/// `-` and `_` are accepted. Remote payloads may carry the id as a JSON
/// string or number; both deserialize to the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl TryFrom<String> for EntryId {
    type Error = ErrorKind;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let valid = !value.is_empty()
            && value.len() <= MAX_ID_LEN
            && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        match valid {
            true => Ok(Self(value)),
            false => Err(ErrorKind::InvalidId(value)),
        }
    }
}
impl FromStr for EntryId {
    type Err = ErrorKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}
impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }
        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Author of an entry, as the remote reports it.
///
/// Only `id` and `login` are interpreted; every other field is carried
/// through untouched so query collaborators can show avatars, profile links
/// and the like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: u64,
    pub login: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One file attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFile {
    #[serde(default)]
    pub content: String,
}

/// The full remote record of an entry, as stored in the cache.
///
/// The cache keeps the response body verbatim; this is the typed view the
/// reconciler and the indexer decode from it. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersistedEntry {
    pub id: EntryId,
    /// Freshness marker compared against the remote listing.
    pub updated_at: String,
    #[serde(default)]
    user: Option<RemoteUser>,
    /// Newer API versions report the author as `owner` (and `user` as null).
    #[serde(default)]
    owner: Option<RemoteUser>,
    #[serde(default)]
    pub files: BTreeMap<String, EntryFile>,
    #[serde(default)]
    pub description: Option<String>,
}
impl PersistedEntry {
    /// Decode a cached or freshly fetched record body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// The record's author, whichever field the remote used for it.
    pub fn author(&self) -> Option<&RemoteUser> {
        self.user.as_ref().or(self.owner.as_ref())
    }

    pub fn file(&self, name: &str) -> Option<&EntryFile> {
        self.files.get(name)
    }
}
