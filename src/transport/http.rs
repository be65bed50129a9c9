//! HTTP transport implementation using reqwest

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use url::Url;

use super::{Transport, TransportRequest, TransportResponse};
use crate::protocol::ClientError;

/// HTTP transport for request/response and SSE streaming calls
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport rooted at `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a new HTTP transport with a custom reqwest client
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    /// The base URL this transport is rooted at
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn builder(&self, request: &TransportRequest) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.endpoint
        );

        let builder = match request.method.as_str() {
            "POST" => self.client.post(&url),
            "GET" => self.client.get(&url),
            "PUT" => self.client.put(&url),
            "DELETE" => self.client.delete(&url),
            other => {
                return Err(ClientError::Transport(format!(
                    "Unsupported HTTP method: {other}"
                )))
            }
        };

        Ok(builder)
    }

    /// Execute a streaming request, returning the raw byte stream
    ///
    /// Used for `message/stream` exchanges; the caller decodes the bytes as
    /// Server-Sent Events.
    pub async fn execute_streaming(
        &self,
        request: TransportRequest,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, ClientError> {
        let mut builder = self.builder(&request)?.header("Accept", "text/event-stream");

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "HTTP streaming request failed with status {status}: {body}"
            )));
        }

        Ok(response.bytes_stream())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        let mut builder = self.builder(&request)?;

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(TransportResponse { status, body })
    }
}
