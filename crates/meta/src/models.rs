use serde::{Deserialize, Deserializer, Serialize};

/// The metadata an entry declares about itself in its metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw keywords, as written. See [`normalize_keywords`](crate::normalize_keywords).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
}
impl EntryMetadata {
    /// The declared description, unless it is missing or blank.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|description| !description.trim().is_empty())
    }

    /// Normalized keywords, deduplicated in declaration order.
    pub fn normalized_keywords(&self) -> Vec<String> {
        crate::normalize_keywords(self.keywords.iter().map(String::as_str))
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
