//! Building request URIs, and keeping credentials out of the logs.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use reqwest::Url;

/// Query parameter carrying the access credential.
pub const CREDENTIAL_PARAM: &str = "access_token";

/// The first page of the starred-entries listing.
///
/// `api_base` may carry a path prefix (enterprise installs serve the API
/// under `/api/v3`); it is kept.
pub fn starred_endpoint(api_base: &str, page_size: u8, credential: Option<&str>) -> Result<String> {
    let mut base = Url::parse(api_base).or_raise(|| ErrorKind::InvalidUri(api_base.to_string()))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut endpoint = base.join("gists/starred").or_raise(|| ErrorKind::InvalidUri(api_base.to_string()))?;
    endpoint.query_pairs_mut().append_pair("per_page", &page_size.to_string());
    with_credential(endpoint.as_str(), credential)
}

/// Append the credential to `uri` as a query parameter, keeping any query
/// the URI already has. Without a credential the URI is only normalized.
pub fn with_credential(uri: &str, credential: Option<&str>) -> Result<String> {
    let mut url = Url::parse(uri).or_raise(|| ErrorKind::InvalidUri(redacted(uri)))?;
    if let Some(credential) = credential {
        url.query_pairs_mut().append_pair(CREDENTIAL_PARAM, credential);
    }
    Ok(url.into())
}

/// `uri` with every credential value masked, fit for logs and errors.
pub fn redacted(uri: &str) -> String {
    let Ok(mut url) = Url::parse(uri) else {
        return "<unparseable uri>".to_string();
    };
    if url.query_pairs().any(|(key, _)| key == CREDENTIAL_PARAM) {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| match key == CREDENTIAL_PARAM {
                true => (key.into_owned(), "REDACTED".to_string()),
                false => (key.into_owned(), value.into_owned()),
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.into()
}
