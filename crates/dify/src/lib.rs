//! # `dify` – The umbrella crate
//!
//! One import for the whole workspace:
//!
//! | Crate           | What it provides                                                          |
//! |-----------------|---------------------------------------------------------------------------|
//! | **`dify-core`** | Stream event model, SSE line decoding, the reassembler and its accumulator |
//! | **`dify-client`** | `reqwest` client for chat messages (blocking / streaming) and retrieval *(feature `client`)* |
//! | **`dify-report`** | Plain-text terminal reports *(feature `report`)*                         |
//!
//! Without the `client` feature only the I/O-free core is pulled in, which is
//! enough to reassemble event streams obtained through any other transport.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use dify::client::{DifyClientBuilder, api_v1::ChatMessageRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DifyClientBuilder::new_from_env().build()?;
//!     let acc = client
//!         .chat_message_collect(ChatMessageRequest::new("Hello!", "demo-user"), |_| {})
//!         .await?;
//!     println!("{}", acc.full_answer);
//!     Ok(())
//! }
//! ```
#![doc(html_root_url = "https://docs.rs/dify/latest")]

pub use dify_core::*;

#[cfg(feature = "client")]
pub use dify_client as client;

#[cfg(feature = "report")]
pub use dify_report as report;
