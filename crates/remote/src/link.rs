//! `Link` response header parsing (RFC 8288), as used for pagination.

use regex::Regex;
use std::sync::LazyLock;

// One link-value: the target in angle brackets, then its parameters up to
// the next target.
static LINK_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^>]*)>([^<]*)").unwrap());

/// A single link-value from a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub uri: String,
    /// Relation types, lower-cased. A link may carry several
    /// (`rel="next last"`).
    pub rels: Vec<String>,
}
impl Link {
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse every link-value in a `Link` header.
///
/// Unknown parameters and relation types are kept or ignored rather than
/// rejected; a link without a `rel` parameter comes back with no relations.
pub fn parse_link_header(value: &str) -> Vec<Link> {
    LINK_VALUE
        .captures_iter(value)
        .map(|captures| Link {
            uri: captures[1].trim().to_string(),
            rels: relations(&captures[2]),
        })
        .collect()
}

/// The target of the first `rel="next"` link, if any.
pub fn next_link(value: &str) -> Option<String> {
    parse_link_header(value).into_iter().find(|link| link.has_rel("next")).map(|link| link.uri)
}

fn relations(params: &str) -> Vec<String> {
    params
        .trim()
        .trim_end_matches(',')
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .flat_map(|(_, value)| value.trim().trim_matches('"').split_whitespace().map(str::to_ascii_lowercase))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GITHUB: &str = r#"<https://api.github.com/gists/starred?per_page=100&page=2>; rel="next", <https://api.github.com/gists/starred?per_page=100&page=5>; rel="last""#;

    #[test]
    fn test_parse_github_header() {
        let links = parse_link_header(GITHUB);
        assert_eq!(
            links,
            vec![
                Link {
                    uri: "https://api.github.com/gists/starred?per_page=100&page=2".to_string(),
                    rels: vec!["next".to_string()],
                },
                Link {
                    uri: "https://api.github.com/gists/starred?per_page=100&page=5".to_string(),
                    rels: vec!["last".to_string()],
                },
            ]
        );
    }

    #[rstest]
    #[case::github(GITHUB, Some("https://api.github.com/gists/starred?per_page=100&page=2"))]
    #[case::next_not_first(r#"<https://x/1>; rel="prev", <https://x/3>; rel="next""#, Some("https://x/3"))]
    #[case::no_spaces(r#"<https://x/2>;rel="next""#, Some("https://x/2"))]
    #[case::extra_whitespace("  <https://x/2> ;  rel = \"next\" ,\n <https://x/9>; rel=\"last\"", Some("https://x/2"))]
    #[case::unquoted("<https://x/2>; rel=next", Some("https://x/2"))]
    #[case::multiple_rels(r#"<https://x/2>; rel="next last""#, Some("https://x/2"))]
    #[case::upper_case(r#"<https://x/2>; REL="Next""#, Some("https://x/2"))]
    #[case::other_params(r#"<https://x/2>; title="page two"; rel="next""#, Some("https://x/2"))]
    #[case::comma_in_uri(r#"<https://x/?ids=1,2>; rel="next""#, Some("https://x/?ids=1,2"))]
    #[case::last_page(r#"<https://x/1>; rel="first", <https://x/4>; rel="prev""#, None)]
    #[case::unknown_rel(r#"<https://x/2>; rel="nextish""#, None)]
    #[case::no_rel("<https://x/2>", None)]
    #[case::empty("", None)]
    fn test_next_link(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(next_link(header).as_deref(), expected);
    }
}
