use crate::error::{ErrorKind, Result};
use crate::transport::{Response, Transport};
use crate::uri::redacted;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, LINK};
use std::time::Duration;
use tracing::instrument;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Transport`] over HTTPS, backed by [`reqwest`].
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}
impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .or_raise(|| ErrorKind::Transport("client setup".to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(uri = %redacted(uri)))]
    async fn get(&self, uri: &str) -> Result<Response> {
        let response = self.client.get(uri).send().await.or_raise(|| ErrorKind::Transport(redacted(uri)))?;
        let status = response.status().as_u16();
        // A header that isn't visible ASCII can't hold a usable URI anyway.
        let link = response.headers().get(LINK).and_then(|value| value.to_str().ok()).map(str::to_string);
        let body = response.bytes().await.or_raise(|| ErrorKind::Transport(redacted(uri)))?.to_vec();
        tracing::debug!(status, bytes = body.len(), "Received response");
        Ok(Response { status, link, body })
    }
}
