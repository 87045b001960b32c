use crate::error::{ErrorKind, Result};
use crate::models::{Entries, IndexedEntry, IndexedUser, Keywords, Snapshot, Users};
use exn::ResultExt;
use shelf_storage::{EntryId, PersistedEntry};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use time::UtcDateTime;

/// File holding an entry's metadata.
pub const METADATA_FILE: &str = "package.json";
/// File holding an entry's code.
pub const CODE_FILE: &str = "index.js";

/// Accumulates records into a [`Snapshot`].
///
/// Records are validated in full before anything is registered, so a record
/// that gets rejected leaves no trace in the snapshot.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entries: BTreeMap<EntryId, IndexedEntry>,
    by_word: BTreeMap<String, BTreeSet<EntryId>>,
    /// Words in the order they were first seen.
    words: Vec<String>,
    users: BTreeMap<u64, IndexedUser>,
    /// User ids in the order they were first seen.
    user_order: Vec<u64>,
    logins: BTreeMap<String, u64>,
}

impl SnapshotBuilder {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one record.
    ///
    /// # Errors
    ///
    /// The record is rejected, and the builder left untouched, when it is
    /// missing its metadata or code file or an author, when its metadata
    /// can't be parsed, or when its id was already added.
    pub fn add(&mut self, record: &PersistedEntry) -> Result<()> {
        let id = &record.id;
        if self.entries.contains_key(id) {
            exn::bail!(ErrorKind::Duplicate(id.clone()));
        }
        let metadata_file = record
            .file(METADATA_FILE)
            .ok_or_else(|| ErrorKind::MissingFile { id: id.clone(), file: METADATA_FILE })?;
        let code_file =
            record.file(CODE_FILE).ok_or_else(|| ErrorKind::MissingFile { id: id.clone(), file: CODE_FILE })?;
        let author = record.author().ok_or_else(|| ErrorKind::MissingAuthor(id.clone()))?;
        let metadata = shelf_meta::parse(&metadata_file.content).or_raise(|| ErrorKind::MalformedMetadata(id.clone()))?;
        let keywords = metadata.normalized_keywords();
        let description = metadata
            .description()
            .map(str::to_string)
            .or_else(|| record.description.clone().filter(|description| !description.is_empty()));

        for word in &keywords {
            self.by_word
                .entry(word.clone())
                .or_insert_with(|| {
                    self.words.push(word.clone());
                    BTreeSet::new()
                })
                .insert(id.clone());
        }

        let user = match self.users.entry(author.id) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                self.user_order.push(author.id);
                vacant.insert(IndexedUser {
                    id: author.id,
                    login: author.login.clone(),
                    extra: author.extra.clone(),
                    entries: Vec::new(),
                })
            },
        };
        user.entries.push(id.clone());
        self.logins.insert(author.login.clone(), author.id);

        let entry = IndexedEntry {
            id: id.clone(),
            name: metadata.name,
            code: code_file.content.clone(),
            description,
            author: user.login.clone(),
            keywords,
        };
        self.entries.insert(id.clone(), entry);
        Ok(())
    }

    /// Materialize the sorted lists and seal the snapshot.
    pub fn finish(self) -> Snapshot {
        let mut keyword_list: Vec<(String, Vec<EntryId>)> = self
            .words
            .into_iter()
            .map(|word| {
                let ids = self.by_word.get(&word).map(|ids| ids.iter().cloned().collect()).unwrap_or_default();
                (word, ids)
            })
            .collect();
        // Stable: equally popular words keep first-seen order.
        keyword_list.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut user_list: Vec<IndexedUser> =
            self.user_order.iter().filter_map(|id| self.users.get(id).cloned()).collect();
        user_list.sort_by(|a, b| b.entries.len().cmp(&a.entries.len()));

        let by_name = self
            .logins
            .into_iter()
            .filter_map(|(login, id)| Some((login, self.users.get(&id)?.clone())))
            .collect();

        Snapshot {
            entries: Entries { by_id: self.entries },
            keywords: Keywords { by_word: self.by_word, list: keyword_list },
            users: Users { by_id: self.users, by_name, list: user_list },
            built_at: Some(UtcDateTime::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, user: (u64, &str), metadata: &str) -> PersistedEntry {
        let body = json!({
            "id": id,
            "updated_at": "2020-01-01T00:00:00Z",
            "description": format!("gist {id}"),
            "user": {"id": user.0, "login": user.1, "avatar_url": format!("https://avatars/{}", user.0)},
            "files": {
                METADATA_FILE: {"content": metadata},
                CODE_FILE: {"content": format!("function(){{/*{id}*/}}")},
            },
        });
        PersistedEntry::from_slice(&serde_json::to_vec(&body).unwrap()).unwrap()
    }

    fn meta(name: &str, keywords: &[&str]) -> String {
        json!({"name": name, "keywords": keywords}).to_string()
    }

    fn id(s: &str) -> EntryId {
        s.parse().unwrap()
    }

    #[test]
    fn test_builds_entry() {
        let mut builder = SnapshotBuilder::default();
        builder
            .add(&record("1", (7, "jed"), r#"{"name": "map", "description": "Array map", "keywords": ["Array", "MAP!"]}"#))
            .unwrap();
        let snapshot = builder.finish();
        let entry = snapshot.entry(&id("1")).unwrap();
        assert_eq!(entry.name, "map");
        assert_eq!(entry.code, "function(){/*1*/}");
        assert_eq!(entry.description.as_deref(), Some("Array map"));
        assert_eq!(entry.author, "jed");
        assert_eq!(entry.keywords, vec!["array", "map"]);
        assert!(snapshot.built_at.is_some());
    }

    #[test]
    fn test_description_falls_back_to_record() {
        let mut builder = SnapshotBuilder::default();
        builder.add(&record("1", (7, "jed"), &meta("map", &[]))).unwrap();
        let snapshot = builder.finish();
        assert_eq!(snapshot.entry(&id("1")).unwrap().description.as_deref(), Some("gist 1"));
    }

    #[test]
    fn test_keywords_and_users() {
        let mut builder = SnapshotBuilder::default();
        builder.add(&record("1", (7, "jed"), &meta("a", &["dom", "array"]))).unwrap();
        builder.add(&record("2", (8, "atk"), &meta("b", &["array", "ARRAY", "string"]))).unwrap();
        builder.add(&record("3", (7, "jed"), &meta("c", &["array"]))).unwrap();
        let snapshot = builder.finish();

        assert_eq!(snapshot.keywords.by_word["array"], BTreeSet::from([id("1"), id("2"), id("3")]));
        assert_eq!(snapshot.keywords.by_word["dom"], BTreeSet::from([id("1")]));
        let words: Vec<&str> = snapshot.keywords.list.iter().map(|(word, _)| word.as_str()).collect();
        // "dom" and "string" tie; "dom" was seen first.
        assert_eq!(words, vec!["array", "dom", "string"]);

        let jed = &snapshot.users.by_id[&7];
        assert_eq!(jed.entries, vec![id("1"), id("3")]);
        assert_eq!(jed.extra["avatar_url"], "https://avatars/7");
        assert_eq!(snapshot.users.by_name["atk"].entries, vec![id("2")]);
        let logins: Vec<&str> = snapshot.users.list.iter().map(|user| user.login.as_str()).collect();
        assert_eq!(logins, vec!["jed", "atk"]);

        let atk = snapshot.user("atk").unwrap();
        assert_eq!(atk.user.id, 8);
        assert_eq!(atk.entries.iter().map(|entry| entry.name.as_str()).collect::<Vec<_>>(), vec!["b"]);
        assert!(snapshot.user("nobody").is_none());
        assert_eq!(snapshot.keyword("array").len(), 3);
        assert!(snapshot.keyword("nope").is_empty());
    }

    #[test]
    fn test_users_with_equal_counts_keep_scan_order() {
        let mut builder = SnapshotBuilder::default();
        builder.add(&record("1", (30, "zed"), &meta("a", &[]))).unwrap();
        builder.add(&record("2", (10, "amy"), &meta("b", &[]))).unwrap();
        builder.add(&record("3", (20, "kim"), &meta("c", &[]))).unwrap();
        let snapshot = builder.finish();
        let logins: Vec<&str> = snapshot.users.list.iter().map(|user| user.login.as_str()).collect();
        assert_eq!(logins, vec!["zed", "amy", "kim"]);
    }

    #[test]
    fn test_renamed_user_keeps_first_login() {
        let mut builder = SnapshotBuilder::default();
        builder.add(&record("1", (7, "jed"), &meta("a", &[]))).unwrap();
        builder.add(&record("2", (7, "jedschmidt"), &meta("b", &[]))).unwrap();
        let snapshot = builder.finish();
        assert_eq!(snapshot.users.by_id.len(), 1);
        assert_eq!(snapshot.users.by_name["jed"].entries.len(), 2);
        assert_eq!(snapshot.users.by_name["jedschmidt"].login, "jed");
        assert_eq!(snapshot.entry(&id("2")).unwrap().author, "jed");
    }

    #[test]
    fn test_rejected_record_leaves_no_trace() {
        let mut builder = SnapshotBuilder::default();
        let err = builder.add(&record("1", (7, "jed"), "{'keywords': ['orphan'],")).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedMetadata(id("1")));
        assert!(builder.is_empty());
        let snapshot = builder.finish();
        assert!(snapshot.keywords.by_word.is_empty());
        assert!(snapshot.users.by_id.is_empty());
    }

    #[test]
    fn test_missing_files_and_author() {
        let mut builder = SnapshotBuilder::default();
        let no_code = PersistedEntry::from_slice(
            br#"{"id": "1", "updated_at": "x", "user": {"id": 1, "login": "a"}, "files": {"package.json": {"content": "{\"name\": \"x\"}"}}}"#,
        )
        .unwrap();
        assert_eq!(*builder.add(&no_code).unwrap_err(), ErrorKind::MissingFile { id: id("1"), file: CODE_FILE });

        let no_author = PersistedEntry::from_slice(
            br#"{"id": "2", "updated_at": "x", "files": {"package.json": {"content": "{\"name\": \"x\"}"}, "index.js": {"content": ""}}}"#,
        )
        .unwrap();
        assert_eq!(*builder.add(&no_author).unwrap_err(), ErrorKind::MissingAuthor(id("2")));
    }

    #[test]
    fn test_duplicate_id() {
        let mut builder = SnapshotBuilder::default();
        builder.add(&record("1", (7, "jed"), &meta("a", &[]))).unwrap();
        let err = builder.add(&record("1", (7, "jed"), &meta("a", &[]))).unwrap_err();
        assert_eq!(*err, ErrorKind::Duplicate(id("1")));
        assert_eq!(builder.finish().users.by_id[&7].entries.len(), 1);
    }
}
