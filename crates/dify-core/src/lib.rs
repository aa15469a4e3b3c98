//! Core building blocks of the Dify client workspace.
//!
//! * [`event`] – typed model of the server-sent events emitted by the
//!   `chat-messages` endpoint in streaming mode.
//! * [`metadata`] – usage accounting and retriever citations attached to a
//!   finished message.
//! * [`reassembler`] – turns raw response lines into events and folds them
//!   into an [`Accumulator`].
//! * [`line_buffer`] – reassembles lines across network chunk boundaries.
//!
//! Nothing in this crate performs I/O; the HTTP transport lives in
//! `dify-client`.
pub mod accumulator;
mod de;
pub mod error;
pub mod event;
pub mod line_buffer;
pub mod metadata;
pub mod reassembler;

pub use accumulator::{Accumulator, StreamFailure};
pub use event::StreamEvent;
pub use line_buffer::LineBuffer;
pub use reassembler::{LineError, StreamEventReassembler, decode_event, decode_line};
