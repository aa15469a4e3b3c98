//! Unified error type exposed by **`dify-core`**.
//!
//! The HTTP crate converts its transport errors into one of these variants
//! before handing them to callers that only depend on the core crate.

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DifyError>;

#[derive(Debug, Error)]
pub enum DifyError {
    /// Generic forwarding of any transport-specific error that doesn't fit
    /// another category.
    #[error("backend returned an error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Client configuration is incomplete or malformed.
    #[error("invalid: {0}")]
    Invalid(String),

    /// The server emitted an `error` event in the middle of a stream.
    #[error("stream terminated by server: {message}")]
    Stream {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },
}
