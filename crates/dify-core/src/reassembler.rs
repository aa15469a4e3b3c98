//! Turns the raw lines of a `text/event-stream` body into [`StreamEvent`]s and
//! folds them into an [`Accumulator`].
//!
//! Only lines starting with the literal `data: ` are candidates; blank
//! separator lines, comments and `event:` lines are skipped. A candidate whose
//! payload cannot be used is a *recovered* error: it is logged (with the
//! `tracing` feature) and dropped, and the stream carries on.
//!
//! ```rust
//! use dify_core::StreamEventReassembler;
//!
//! let lines = [
//!     r#"data: {"event":"message","answer":"Hi","message_id":"m1"}"#,
//!     "",
//!     r#"data: {"event":"message_end","metadata":{"usage":{"total_tokens":42}}}"#,
//! ];
//!
//! let acc = StreamEventReassembler::new(lines).accumulate();
//! assert_eq!(acc.full_answer, "Hi");
//! assert_eq!(acc.message_id.as_deref(), Some("m1"));
//! assert_eq!(acc.metadata.unwrap().usage.unwrap().total_tokens, 42);
//! ```
use std::iter::FusedIterator;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::accumulator::Accumulator;
use crate::event::{KNOWN_KINDS, StreamEvent};
use crate::metadata::MessageMetadata;

const DATA_PREFIX: &str = "data: ";

/// Why a `data: ` line did not produce an event.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("payload is not valid JSON: {0}")]
    Json(serde_json::Error),

    #[error("payload has no `event` discriminator")]
    MissingKind,

    #[error("unrecognised event kind `{0}`")]
    UnknownKind(String),

    #[error("payload fields do not match the event kind: {0}")]
    InvalidFields(serde_json::Error),
}

/// Decode a single line.
///
/// * `Ok(None)` – not a `data: ` line, nothing to do.
/// * `Ok(Some(_))` – a recognised event.
/// * `Err(_)` – a data line that must be skipped.
///
/// A `message_end` is terminal and is never skipped over a mistyped field:
/// the ids that are plain strings and the metadata, if it decodes, are kept
/// and the rest is dropped.
pub fn decode_line(line: &str) -> Result<Option<StreamEvent>, LineError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };

    let value: Value = serde_json::from_str(payload).map_err(LineError::Json)?;
    let Some(kind) = value.get("event").and_then(Value::as_str) else {
        return Err(LineError::MissingKind);
    };
    if !KNOWN_KINDS.contains(&kind) {
        return Err(LineError::UnknownKind(kind.to_owned()));
    }

    match StreamEvent::deserialize(&value) {
        Ok(event) => Ok(Some(event)),
        Err(err) if kind == "message_end" => {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %err, "keeping message_end with unreadable fields");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
            Ok(Some(salvage_message_end(&value)))
        }
        Err(err) => Err(LineError::InvalidFields(err)),
    }
}

fn salvage_message_end(value: &Value) -> StreamEvent {
    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
    StreamEvent::MessageEnd {
        message_id: text("message_id"),
        conversation_id: text("conversation_id"),
        task_id: text("task_id"),
        metadata: value
            .get("metadata")
            .and_then(|metadata| MessageMetadata::deserialize(metadata).ok()),
    }
}

/// Lazy adapter from lines to events.
///
/// Iteration ends when the line source is exhausted or right after a terminal
/// event (`message_end` or `error`) has been yielded.
pub struct StreamEventReassembler<I> {
    lines: I,
    done: bool,
}

impl<I, L> StreamEventReassembler<I>
where
    I: Iterator<Item = L>,
    L: AsRef<str>,
{
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            done: false,
        }
    }

    /// Drain the remaining lines and return the final state.
    pub fn accumulate(self) -> Accumulator {
        self.accumulate_with(|_| {})
    }

    /// Like [`Self::accumulate`], handing every event to `observer` before it
    /// is applied. Lifecycle events that do not touch the accumulator are
    /// delivered as well.
    pub fn accumulate_with<F>(self, mut observer: F) -> Accumulator
    where
        F: FnMut(&StreamEvent),
    {
        let mut acc = Accumulator::new();
        for event in self {
            observer(&event);
            acc.apply(&event);
        }
        acc
    }
}

impl<I, L> Iterator for StreamEventReassembler<I>
where
    I: Iterator<Item = L>,
    L: AsRef<str>,
{
    type Item = StreamEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for line in self.lines.by_ref() {
            if let Some(event) = decode_event(line.as_ref()) {
                self.done = event.is_terminal();
                return Some(event);
            }
        }

        self.done = true;
        None
    }
}

impl<I, L> FusedIterator for StreamEventReassembler<I>
where
    I: Iterator<Item = L>,
    L: AsRef<str>,
{
}

/// [`decode_line`] with the recovered errors logged and dropped.
pub fn decode_event(line: &str) -> Option<StreamEvent> {
    match decode_line(line) {
        Ok(event) => event,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %err, "skipping stream line");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
            None
        }
    }
}
