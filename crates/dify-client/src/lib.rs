//! HTTP client for the Dify service API.
//!
//! * [`DifyClient`] – one `reqwest::Client` plus the API key; blocking and
//!   streaming chat messages, knowledge retrieval.
//! * [`DifyClientBuilder`] – environment-driven configuration.
//! * [`api_v1`] – request / response bodies as they appear on the wire.
mod builder;
mod client;

pub mod api_v1;
pub mod error;

pub use builder::{API_KEY_ENV, BASE_URL_ENV, DifyClientBuilder, TIMEOUT_ENV};
pub use client::{DEFAULT_BASE_URL, DifyClient};
