//! Metadata attached to a finished message: token usage, pricing and the
//! knowledge-base segments the answer cites.
//!
//! The same shapes appear in the `metadata` field of a blocking
//! `chat-messages` response and of the `message_end` stream event.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{lenient_decimal, null_as_default};

/// Metadata captured from `message_end` (or a blocking response).
///
/// Keys that are not modelled explicitly are retained in `extra` so callers
/// can still reach them without a crate update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub retriever_resources: Vec<RetrieverResource>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Token and cost accounting for one message.
///
/// Prices arrive as decimal strings (`"0.0001250"`); plain JSON numbers are
/// accepted as well. Token counts sent as `null` read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tokens: u64,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub prompt_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub completion_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Server-side latency in seconds.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub latency: Option<f64>,
}

impl Usage {
    /// Currency code, falling back to `USD` when the server omits it.
    pub fn currency_or_default(&self) -> &str {
        self.currency.as_deref().unwrap_or("USD")
    }
}

/// A knowledge-base segment cited by the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrieverResource {
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub segment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub score: Option<f64>,
    #[serde(default)]
    pub content: Option<String>,
}
