//! Plain-text reports for Dify chat and retrieval results.
//!
//! * [`builder::ReportBuilder`] – fluent line-oriented text builder.
//! * [`render`] – ready-made reports for blocking responses, folded streams,
//!   stream progress and knowledge retrieval.
pub mod builder;
pub mod render;

pub use builder::ReportBuilder;
pub use render::{describe_event, render_chat_response, render_retrieval, render_stream_summary};
