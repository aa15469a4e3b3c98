use async_stream::try_stream;
use dify_core::{Accumulator, LineBuffer, StreamEvent, decode_event};
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client as HttpClient, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    api_v1::{
        ChatMessageRequest, ChatMessageResponse, ResponseMode, RetrieveRequest, RetrieveResponse,
    },
    error::DifyClientError,
};

pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the Dify service API.
///
/// * One app API key per client; knowledge retrieval expects a dataset key.
/// * Shares a single `reqwest::Client`, so cloning `DifyClient` is cheap.
/// * Performs no retries; a failed call is reported as is.
#[derive(Clone)]
pub struct DifyClient {
    api_key: String,
    http: HttpClient,
    base: String,
}

impl DifyClient {
    /// Convenience constructor with a default `reqwest` client (60 s timeout,
    /// Rustls TLS) against [`DEFAULT_BASE_URL`].
    pub fn new(api_key: impl Into<String>) -> Result<Self, DifyClientError> {
        let http = HttpClient::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_http(api_key, http, None))
    }

    /// Build with a custom `reqwest::Client` in case the caller needs proxy
    /// settings, custom TLS, a self-hosted base URL, etc.
    pub fn with_http(
        api_key: impl Into<String>,
        http: HttpClient,
        base_url: Option<String>,
    ) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self {
            api_key: api_key.into(),
            http,
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Send a chat message and wait for the complete answer.
    ///
    /// The request is always sent in blocking mode, whatever
    /// `request.response_mode` says.
    pub async fn chat_message(
        &self,
        mut request: ChatMessageRequest,
    ) -> Result<ChatMessageResponse, DifyClientError> {
        request.response_mode = ResponseMode::Blocking;
        self.post_json("chat-messages", &request).await
    }

    /// Send a chat message and receive the answer as a stream of events.
    ///
    /// Malformed or unrecognised event lines are skipped. The stream ends when
    /// the connection closes or right after a `message_end` / `error` event.
    /// Transport failures are yielded as `Err` and end the stream.
    pub fn chat_message_stream(
        &self,
        mut request: ChatMessageRequest,
    ) -> impl Stream<Item = Result<StreamEvent, DifyClientError>> + '_ {
        request.response_mode = ResponseMode::Streaming;
        let url = self.endpoint("chat-messages");

        try_stream! {
            let mut headers = self.headers()?;
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

            #[cfg(feature = "tracing")]
            tracing::debug!(%url, "opening chat message stream");

            let resp = self.http.post(url).headers(headers).json(&request).send().await?;
            let resp = ensure_success(resp).await?;

            let mut body = resp.bytes_stream();
            let mut lines = LineBuffer::new();

            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                for line in lines.push(&chunk) {
                    if let Some(event) = decode_event(&line) {
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal { return; }
                    }
                }
            }

            if let Some(event) = lines.finish().as_deref().and_then(decode_event) {
                yield event;
            }
        }
    }

    /// Stream a chat message and fold it into an [`Accumulator`].
    ///
    /// `observer` sees every event before it is applied, which is where a
    /// caller prints chunks or progress lines. A transport failure returns
    /// `Err` without a partial result; a server `error` event returns `Ok`
    /// with [`Accumulator::error`] set and the partial answer kept.
    pub async fn chat_message_collect<F>(
        &self,
        request: ChatMessageRequest,
        mut observer: F,
    ) -> Result<Accumulator, DifyClientError>
    where
        F: FnMut(&StreamEvent),
    {
        let stream = self.chat_message_stream(request);
        futures_util::pin_mut!(stream);

        let mut acc = Accumulator::new();
        while let Some(event) = stream.next().await {
            let event = event?;
            observer(&event);
            acc.apply(&event);
        }
        Ok(acc)
    }

    /// Retrieve the segments of `dataset_id` most relevant to the query.
    pub async fn retrieve(
        &self,
        dataset_id: &str,
        request: &RetrieveRequest,
    ) -> Result<RetrieveResponse, DifyClientError> {
        let dataset_id = dataset_id.trim();
        if dataset_id.is_empty() {
            return Err(DifyClientError::Format("dataset id must not be empty".into()));
        }
        self.post_json(&format!("datasets/{dataset_id}/retrieve"), request)
            .await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, DifyClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);

        #[cfg(feature = "tracing")]
        tracing::debug!(%url, "sending request");

        let resp = self
            .http
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    fn headers(&self) -> Result<HeaderMap, DifyClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        Ok(headers)
    }
}

async fn ensure_success(resp: Response) -> Result<Response, DifyClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();

    #[cfg(feature = "tracing")]
    tracing::warn!(%status, "Dify request failed");

    Err(DifyClientError::Api { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = DifyClient::with_http(
            "app-key",
            HttpClient::new(),
            Some("http://localhost/v1/".into()),
        );
        assert_eq!(client.base_url(), "http://localhost/v1");
        assert_eq!(
            client.endpoint("chat-messages"),
            "http://localhost/v1/chat-messages"
        );
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let client = DifyClient::with_http("bad\nkey", HttpClient::new(), None);
        assert!(matches!(client.headers(), Err(DifyClientError::Header(_))));
    }
}
