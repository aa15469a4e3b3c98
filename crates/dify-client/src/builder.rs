use std::{env, time::Duration};

use dify_core::error::{DifyError, Result};
use reqwest::Client as HttpClient;

use crate::client::{DEFAULT_TIMEOUT, DifyClient};

pub const API_KEY_ENV: &str = "DIFY_API_KEY";
pub const BASE_URL_ENV: &str = "DIFY_BASE_URL";
pub const TIMEOUT_ENV: &str = "DIFY_TIMEOUT_SECS";

/// Builder for [`DifyClient`].
///
/// # Typical usage
///
/// ```rust,no_run
/// use dify_client::DifyClientBuilder;
///
/// let client = DifyClientBuilder::new_from_env()
///     .build()
///     .expect("DIFY_API_KEY must be set");
/// ```
///
/// Values set explicitly win over the environment. Nothing is validated
/// until [`Self::build`].
#[derive(Default)]
pub struct DifyClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    timeout_raw: Option<String>,
    http: Option<HttpClient>,
}

impl DifyClientBuilder {
    /// Create an *empty* builder. Remember to supply an API key manually.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `DIFY_API_KEY`, `DIFY_BASE_URL` and `DIFY_TIMEOUT_SECS` from the
    /// environment.
    ///
    /// Never fails. A missing key or an unparsable timeout only surfaces during
    /// [`Self::build`].
    pub fn new_from_env() -> Self {
        Self {
            api_key: non_blank_var(API_KEY_ENV),
            base_url: non_blank_var(BASE_URL_ENV),
            timeout: None,
            timeout_raw: non_blank_var(TIMEOUT_ENV),
            http: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point the client at a self-hosted instance, e.g.
    /// `http://localhost/v1`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.timeout_raw = None;
        self
    }

    /// Use a preconfigured `reqwest::Client`. The timeout setting is ignored
    /// in that case.
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Finalise the builder and return a ready-to-use client.
    ///
    /// # Errors
    ///
    /// * [`DifyError::Invalid`] – the API key is missing or the timeout is
    ///   not a whole number of seconds.
    /// * [`DifyError::Backend`] – the HTTP client could not be constructed.
    pub fn build(self) -> Result<DifyClient> {
        let api_key = self.api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            DifyError::Invalid(format!("missing env variable: `{API_KEY_ENV}`"))
        })?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let timeout = match (self.timeout, self.timeout_raw) {
                    (Some(timeout), _) => timeout,
                    (None, Some(raw)) => parse_timeout(&raw)?,
                    (None, None) => DEFAULT_TIMEOUT,
                };
                HttpClient::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(|e| DifyError::Backend(Box::new(e)))?
            }
        };

        Ok(DifyClient::with_http(api_key, http, self.base_url))
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            DifyError::Invalid(format!(
                "`{TIMEOUT_ENV}` must be a whole number of seconds, got `{raw}`"
            ))
        })
}
