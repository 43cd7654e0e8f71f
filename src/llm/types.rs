//! Conversation and request types shared by the provider and the runtime

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Instructions, injected in front of the history for each request
    System { text: String },
    /// User-authored turn input
    Human { text: String },
    /// Model output: text, one tool call, or (degenerate) neither
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call: Option<ToolCall>,
    },
    /// Observation produced by running a tool call
    ToolResult {
        call_id: String,
        tool_name: String,
        text: String,
    },
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Message::System { text: text.into() }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Message::Human { text: text.into() }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Message::Assistant {
            text: Some(text.into()),
            tool_call: None,
        }
    }

    #[cfg(test)]
    pub fn assistant_tool_call(tool_call: ToolCall) -> Self {
        Message::Assistant {
            text: None,
            tool_call: Some(tool_call),
        }
    }

    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Message::ToolResult {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            text: text.into(),
        }
    }

    /// The tool call carried by an assistant message, if it names a tool
    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            Message::Assistant {
                tool_call: Some(call),
                ..
            } if !call.name.is_empty() => Some(call),
            _ => None,
        }
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::System { text }
            | Message::Human { text }
            | Message::ToolResult { text, .. } => Some(text.as_str()),
            Message::Assistant { text, .. } => text.as_deref(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Message::Assistant { .. })
    }
}

/// A structured tool invocation request from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    pub arguments: ToolArguments,
}

impl ToolCall {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Tool call arguments, normalized as soon as they leave the provider.
///
/// Providers send arguments either as a JSON object or as a string holding
/// JSON. Both shapes collapse into `Decoded`; a string that is not JSON is
/// kept verbatim as `Malformed` so the executor can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolArguments {
    Decoded { value: Value },
    Malformed { raw: String, error: String },
}

impl ToolArguments {
    pub fn decoded(value: Value) -> Self {
        ToolArguments::Decoded { value }
    }

    /// Decode a textual payload. Blank text and `null` mean "no arguments".
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return ToolArguments::decoded(Value::Object(serde_json::Map::new()));
        }
        match serde_json::from_str(raw) {
            Ok(Value::Null) => ToolArguments::decoded(Value::Object(serde_json::Map::new())),
            Ok(value) => ToolArguments::Decoded { value },
            Err(e) => ToolArguments::Malformed {
                raw: raw.to_string(),
                error: e.to_string(),
            },
        }
    }

    /// Normalize a payload of either shape
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(raw) => Self::from_raw(&raw),
            Value::Null => ToolArguments::decoded(Value::Object(serde_json::Map::new())),
            other => ToolArguments::Decoded { value: other },
        }
    }

    /// Wire encoding for echoing the call back to the provider
    pub fn to_wire_string(&self) -> String {
        match self {
            ToolArguments::Decoded { value } => {
                serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
            }
            ToolArguments::Malformed { raw, .. } => raw.clone(),
        }
    }
}

/// Tool descriptor advertised to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Request to the reasoning service
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Full prompt: the system message first, then the history
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Response from the reasoning service
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Always a `Message::Assistant` for well-behaved providers
    pub message: Message,
    pub end_turn: bool,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
