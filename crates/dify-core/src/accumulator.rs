//! Running fold state built from a stream of [`StreamEvent`]s.
//!
//! Two merge rules apply to identifiers:
//!
//! * **set-once** – `message` events fill an id only while it is still empty.
//! * **overwrite-when-present** – `message_end` carries the authoritative ids
//!   and replaces earlier values, but an omitted id keeps the earlier value.
//!
//! ```rust
//! use dify_core::{Accumulator, StreamEvent};
//!
//! let mut acc = Accumulator::new();
//! acc.apply(&StreamEvent::MessageReplace {
//!     answer: "X".into(),
//!     message_id: None,
//!     conversation_id: None,
//!     task_id: None,
//! });
//! acc.apply(&StreamEvent::Message {
//!     answer: "Y".into(),
//!     message_id: Some("m1".into()),
//!     conversation_id: None,
//!     task_id: None,
//!     created_at: None,
//! });
//! assert_eq!(acc.full_answer, "XY");
//! ```
use crate::error::{DifyError, Result};
use crate::event::StreamEvent;
use crate::metadata::MessageMetadata;

/// Error reported by the server through an `error` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFailure {
    pub message: String,
    pub code: Option<String>,
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    pub full_answer: String,
    pub message_id: Option<String>,
    pub conversation_id: Option<String>,
    pub task_id: Option<String>,
    /// Only ever captured from `message_end`.
    pub metadata: Option<MessageMetadata>,
    pub error: Option<StreamFailure>,
    /// Set once a terminal event has been applied.
    pub finished: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state.
    ///
    /// Events applied after a terminal event are ignored.
    pub fn apply(&mut self, event: &StreamEvent) {
        if self.finished {
            return;
        }

        match event {
            StreamEvent::Message {
                answer,
                message_id,
                conversation_id,
                task_id,
                ..
            } => {
                self.full_answer.push_str(answer);
                set_once(&mut self.message_id, message_id);
                set_once(&mut self.conversation_id, conversation_id);
                set_once(&mut self.task_id, task_id);
            }
            StreamEvent::MessageEnd {
                message_id,
                conversation_id,
                metadata,
                ..
            } => {
                self.metadata = Some(metadata.clone().unwrap_or_default());
                overwrite_when_present(&mut self.message_id, message_id);
                overwrite_when_present(&mut self.conversation_id, conversation_id);
                self.finished = true;
            }
            StreamEvent::MessageReplace { answer, .. } => {
                self.full_answer.clone_from(answer);
            }
            StreamEvent::Error {
                message,
                code,
                status,
                ..
            } => {
                let message = message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or("unknown stream error")
                    .to_owned();
                self.error = Some(StreamFailure {
                    message,
                    code: code.clone(),
                    status: *status,
                });
                self.finished = true;
            }
            StreamEvent::WorkflowStarted { .. }
            | StreamEvent::NodeStarted { .. }
            | StreamEvent::NodeFinished { .. }
            | StreamEvent::WorkflowFinished { .. }
            | StreamEvent::MessageFile { .. }
            | StreamEvent::Ping => {}
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Convert an error-terminated fold into [`DifyError::Stream`].
    ///
    /// Read the accumulator directly instead if the partial answer matters.
    pub fn into_result(self) -> Result<Self> {
        match self.error {
            Some(failure) => Err(DifyError::Stream {
                message: failure.message,
                code: failure.code,
                status: failure.status,
            }),
            None => Ok(self),
        }
    }
}

fn set_once(slot: &mut Option<String>, value: &Option<String>) {
    if slot.is_some() {
        return;
    }
    if let Some(value) = non_empty(value) {
        *slot = Some(value.to_owned());
    }
}

fn overwrite_when_present(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = non_empty(value) {
        *slot = Some(value.to_owned());
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(answer: &str, message_id: Option<&str>) -> StreamEvent {
        StreamEvent::Message {
            answer: answer.into(),
            message_id: message_id.map(Into::into),
            conversation_id: None,
            task_id: None,
            created_at: None,
        }
    }

    fn message_end(message_id: Option<&str>, conversation_id: Option<&str>) -> StreamEvent {
        StreamEvent::MessageEnd {
            message_id: message_id.map(Into::into),
            conversation_id: conversation_id.map(Into::into),
            task_id: None,
            metadata: None,
        }
    }

    #[test]
    fn empty_identifier_does_not_claim_the_slot() {
        let mut acc = Accumulator::new();
        acc.apply(&message("a", Some("")));
        acc.apply(&message("b", Some("m2")));
        assert_eq!(acc.message_id.as_deref(), Some("m2"));
    }

    #[test]
    fn message_end_without_ids_keeps_earlier_values() {
        let mut acc = Accumulator::new();
        acc.apply(&StreamEvent::Message {
            answer: "hi".into(),
            message_id: Some("m1".into()),
            conversation_id: Some("c1".into()),
            task_id: Some("t1".into()),
            created_at: None,
        });
        acc.apply(&message_end(None, Some("")));

        assert_eq!(acc.message_id.as_deref(), Some("m1"));
        assert_eq!(acc.conversation_id.as_deref(), Some("c1"));
        assert_eq!(acc.metadata, Some(MessageMetadata::default()));
        assert!(acc.finished);
    }

    #[test]
    fn events_after_terminal_are_ignored() {
        let mut acc = Accumulator::new();
        acc.apply(&message("done", None));
        acc.apply(&message_end(Some("m1"), None));
        acc.apply(&message("late", Some("m9")));
        assert_eq!(acc.full_answer, "done");
        assert_eq!(acc.message_id.as_deref(), Some("m1"));
    }

    #[test]
    fn error_event_preserves_partial_answer() {
        let mut acc = Accumulator::new();
        acc.apply(&message("partial ", None));
        acc.apply(&StreamEvent::Error {
            message: Some("quota exceeded".into()),
            code: Some("provider_quota_exceeded".into()),
            status: Some(400),
            task_id: None,
            message_id: None,
        });

        assert!(acc.is_failed());
        assert_eq!(acc.full_answer, "partial ");

        match acc.into_result() {
            Err(DifyError::Stream { message, status, .. }) => {
                assert_eq!(message, "quota exceeded");
                assert_eq!(status, Some(400));
            }
            other => panic!("expected stream error, got {other:?}"),
        }
    }

    #[test]
    fn error_event_without_message_still_reports_failure() {
        let mut acc = Accumulator::new();
        acc.apply(&StreamEvent::Error {
            message: None,
            code: None,
            status: None,
            task_id: None,
            message_id: None,
        });
        assert!(!acc.error.unwrap().message.is_empty());
    }
}
