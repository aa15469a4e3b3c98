use dify_core::error::DifyError;
use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;

/// Every failure mode the HTTP client can hit.
#[derive(Debug, thiserror::Error)]
pub enum DifyClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn't (de)serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Dify returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("API key is not a valid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("Dify format error: {0}")]
    Format(String),
}

impl From<DifyClientError> for DifyError {
    fn from(value: DifyClientError) -> Self {
        DifyError::Backend(Box::new(value))
    }
}
