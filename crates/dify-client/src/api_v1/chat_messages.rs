use dify_core::metadata::MessageMetadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_optional_setters;

/// How the server should deliver the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// One JSON body once the answer is complete.
    #[default]
    Blocking,
    /// A `text/event-stream` body of incremental events.
    Streaming,
}

/// Body of `POST /chat-messages`.
///
/// ```rust
/// use dify_client::api_v1::ChatMessageRequest;
///
/// let request = ChatMessageRequest::new("What is Rust?", "test-user")
///     .with_input("topic", "programming")
///     .conversation_id("5f2c…");
/// assert_eq!(request.inputs["topic"], "programming");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageRequest {
    pub query: String,
    /// Values for the variables the app defines. Always sent, `{}` if empty.
    pub inputs: Map<String, Value>,
    pub response_mode: ResponseMode,
    pub user: String,
    /// Continue an earlier conversation. Blank ids are not sent.
    #[serde(skip_serializing_if = "is_blank")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_generate_name: Option<bool>,
}

impl ChatMessageRequest {
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            inputs: Map::new(),
            response_mode: ResponseMode::Blocking,
            user: user.into(),
            conversation_id: None,
            auto_generate_name: None,
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_inputs(mut self, inputs: Map<String, Value>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_response_mode(mut self, response_mode: ResponseMode) -> Self {
        self.response_mode = response_mode;
        self
    }
}

impl_optional_setters!(
    ChatMessageRequest,
    conversation_id: String,
    auto_generate_name: bool
);

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Blocking-mode reply of `POST /chat-messages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub metadata: MessageMetadata,
    #[serde(default)]
    pub created_at: Option<i64>,
}
