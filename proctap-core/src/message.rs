//! Agent message model
//!
//! Messages arrive from the injected agent as JSON documents with a `type`
//! discriminant. Only error messages get structure here; everything else is
//! passed through untouched as a raw JSON value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A message emitted by the injected agent.
///
/// Deserialization tries the error shape first; the `kind` tag only matches
/// the literal string `"error"`, so any other discriminant (or an error-typed
/// message missing its `stack`) falls through to [`AgentMessage::Raw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentMessage {
    Error(ErrorDetail),
    Raw(Value),
}

/// Detail carried by `type == "error"` messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    kind: ErrorTag,
    /// Human-readable trace from the agent runtime.
    pub stack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "fileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, rename = "lineNumber", skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum ErrorTag {
    #[serde(rename = "error")]
    Error,
}

impl ErrorDetail {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            kind: ErrorTag::Error,
            stack: stack.into(),
            description: None,
            file_name: None,
            line_number: None,
        }
    }
}

impl AgentMessage {
    /// Decode a wire payload.
    ///
    /// Never fails: a payload that is not valid JSON is wrapped as a raw
    /// string message so the relay still prints it.
    pub fn from_wire(payload: &str) -> Self {
        match serde_json::from_str(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!("agent payload is not valid JSON ({err}); relaying verbatim");
                AgentMessage::Raw(Value::String(payload.to_string()))
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AgentMessage::Error(_))
    }
}
