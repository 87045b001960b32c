//! The seam between listing/retrieval logic and the HTTP client.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockTransport;
use crate::error::Result;
use crate::link::next_link;
use async_trait::async_trait;
use std::sync::Arc;

pub type TransportHandle = Arc<dyn Transport + Send + Sync>;

/// What the remote answered to a `GET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Raw `Link` header, if the response carried one.
    pub link: Option<String>,
    pub body: Vec<u8>,
}
impl Response {
    /// A `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, link: None, body: body.into() }
    }

    /// An empty response with the given status.
    pub fn status(status: u16) -> Self {
        Self { status, link: None, body: Vec::new() }
    }

    /// Attach a `Link` header pointing at the next page.
    pub fn with_next(mut self, uri: impl AsRef<str>) -> Self {
        self.link = Some(format!(r#"<{}>; rel="next""#, uri.as_ref()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Target of the `rel="next"` link, if any.
    pub fn next_page(&self) -> Option<String> {
        self.link.as_deref().and_then(next_link)
    }
}

/// Performs `GET` requests against the remote.
///
/// Implementations only report failures to get *a* response; non-success
/// statuses come back as ordinary [`Response`]s for the caller to judge.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, uri: &str) -> Result<Response>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_helpers() {
        let response = Response::ok("[]").with_next("https://x/2");
        assert!(response.is_success());
        assert_eq!(response.next_page().as_deref(), Some("https://x/2"));
        assert!(!Response::status(404).is_success());
        assert_eq!(Response::status(304).next_page(), None);
    }
}
