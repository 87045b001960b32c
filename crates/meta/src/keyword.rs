use regex::Regex;
use std::sync::LazyLock;

// Word characters are ASCII only: accented and non-Latin letters are dropped
// along with punctuation.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Normalize a single keyword: lower-case it, then drop every non-word
/// character.
///
/// Returns `None` when nothing is left.
pub fn normalize_keyword(word: &str) -> Option<String> {
    let normalized = NON_WORD.replace_all(&word.to_lowercase(), "").into_owned();
    (!normalized.is_empty()).then_some(normalized)
}

/// Normalize a list of keywords, dropping empty tokens and collapsing
/// duplicates. The first occurrence of each token decides its position.
pub fn normalize_keywords<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for token in words.into_iter().filter_map(normalize_keyword) {
        if !normalized.contains(&token) {
            normalized.push(token);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cli", Some("cli"))]
    #[case("CLI-Tool!", Some("clitool"))]
    #[case("cli_tool", Some("cli_tool"))]
    #[case("Café", Some("caf"))]
    #[case("ES 2015", Some("es2015"))]
    #[case("  Dom.Events ", Some("domevents"))]
    #[case("ÄÖÜ", None)]
    #[case("日本語", None)]
    #[case("naïve-JS", Some("navejs"))]
    #[case("140", Some("140"))]
    #[case("!!!", None)]
    #[case("", None)]
    fn test_normalize_keyword(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_keyword(input).as_deref(), expected);
    }

    #[test]
    fn test_normalize_keywords_dedupes_in_first_seen_order() {
        let words = ["Array", "dom", "ARRAY", "--", "D-O-M", "string"];
        assert_eq!(normalize_keywords(words), vec!["array", "dom", "string"]);
    }

    #[test]
    fn test_normalize_keywords_drops_non_ascii_tokens() {
        let words = ["日本語", "Café", "caf", "ÅÄÖ"];
        assert_eq!(normalize_keywords(words), vec!["caf"]);
    }
}
