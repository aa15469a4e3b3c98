//! Typed model of the server-sent events emitted by `chat-messages` in
//! streaming mode.
//!
//! Every `data: ` line carries a JSON object whose `event` field names the
//! kind. Each kind gets its own variant with explicit, optional fields, so the
//! fold in [`crate::reassembler`] is checked exhaustively by the compiler.
use serde::{Deserialize, Serialize};

use crate::de::{lenient_status, lenient_string};
use crate::metadata::MessageMetadata;

/// Every event kind the reassembler understands.
///
/// Kinds outside this list are reported as
/// [`LineError::UnknownKind`](crate::reassembler::LineError::UnknownKind) by
/// the decoder and never become a value of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental chunk of answer text.
    Message {
        #[serde(default)]
        answer: String,
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        conversation_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        created_at: Option<i64>,
    },

    /// Terminal event carrying the authoritative ids and the usage report.
    MessageEnd {
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        conversation_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        metadata: Option<MessageMetadata>,
    },

    /// Replaces the whole answer so far (content moderation, for instance).
    MessageReplace {
        #[serde(default)]
        answer: String,
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        conversation_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
    },

    WorkflowStarted {
        #[serde(default)]
        workflow_run_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        data: WorkflowData,
    },

    NodeStarted {
        #[serde(default)]
        workflow_run_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        data: NodeData,
    },

    NodeFinished {
        #[serde(default)]
        workflow_run_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        data: NodeData,
    },

    WorkflowFinished {
        #[serde(default)]
        workflow_run_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        data: WorkflowData,
    },

    /// Reference to a file produced alongside the message.
    MessageFile {
        #[serde(default)]
        id: Option<String>,
        #[serde(default, rename = "type")]
        file_type: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        belongs_to: Option<String>,
        #[serde(default)]
        conversation_id: Option<String>,
    },

    /// Terminal failure reported by the server.
    ///
    /// Every field is decoded leniently so that an `error` line is never
    /// dropped over a mistyped field.
    Error {
        #[serde(default, deserialize_with = "lenient_string")]
        message: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        code: Option<String>,
        #[serde(default, deserialize_with = "lenient_status")]
        status: Option<u16>,
        #[serde(default, deserialize_with = "lenient_string")]
        task_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        message_id: Option<String>,
    },

    /// Keep-alive.
    Ping,
}

/// Wire names of every variant, used by the decoder to tell an unknown kind
/// apart from a known kind with ill-typed fields.
pub(crate) const KNOWN_KINDS: &[&str] = &[
    "message",
    "message_end",
    "message_replace",
    "workflow_started",
    "node_started",
    "node_finished",
    "workflow_finished",
    "message_file",
    "error",
    "ping",
];

impl StreamEvent {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Message { .. } => "message",
            StreamEvent::MessageEnd { .. } => "message_end",
            StreamEvent::MessageReplace { .. } => "message_replace",
            StreamEvent::WorkflowStarted { .. } => "workflow_started",
            StreamEvent::NodeStarted { .. } => "node_started",
            StreamEvent::NodeFinished { .. } => "node_finished",
            StreamEvent::WorkflowFinished { .. } => "workflow_finished",
            StreamEvent::MessageFile { .. } => "message_file",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Ping => "ping",
        }
    }

    /// `message_end` and `error` close the logical stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::MessageEnd { .. } | StreamEvent::Error { .. })
    }
}

/// Node payload of `node_started` / `node_finished`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Workflow payload of `workflow_started` / `workflow_finished`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub total_steps: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}
