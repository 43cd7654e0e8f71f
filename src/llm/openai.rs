//! `OpenAI`-compatible chat completions provider (Groq by default)

use super::types::{LlmRequest, LlmResponse, Message, ToolArguments, ToolCall, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Groq's `OpenAI`-compatible API root
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAIService {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub(super) fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let answered = answered_call_ids(&request.messages);
        let messages = request
            .messages
            .iter()
            .map(|msg| translate_message(msg, &answered))
            .collect();

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|t| OpenAITool {
                        r#type: "function".to_string(),
                        function: OpenAIFunction {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: t.input_schema.clone(),
                        },
                    })
                    .collect(),
            )
        };

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            tools,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }

    pub(super) fn normalize_response(resp: OpenAIResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No choices in response"))?;

        let text = choice.message.content.filter(|t| !t.is_empty());

        // One tool call per turn; anything after the first is dropped here
        let mut calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter(|tc| !tc.function.name.is_empty());
        let tool_call = calls.next().map(|tc| {
            let call_id = if tc.id.is_empty() {
                format!("call_{}", uuid::Uuid::new_v4().simple())
            } else {
                tc.id
            };
            ToolCall::new(
                call_id,
                tc.function.name,
                ToolArguments::from_value(tc.function.arguments),
            )
        });
        let ignored = calls.count();
        if ignored > 0 {
            tracing::debug!(ignored, "Dropping extra tool calls from response");
        }

        let end_turn = tool_call.is_none() && choice.finish_reason.as_deref() == Some("stop");
        let usage = resp.usage.unwrap_or_default();

        Ok(LlmResponse {
            message: Message::Assistant { text, tool_call },
            end_turn,
            usage: Usage {
                input_tokens: u64::from(usage.prompt_tokens),
                output_tokens: u64::from(usage.completion_tokens),
            },
        })
    }
}

/// Ids of tool calls that already have a matching tool result
fn answered_call_ids(messages: &[Message]) -> HashSet<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::ToolResult { call_id, .. } => Some(call_id.as_str()),
            _ => None,
        })
        .collect()
}

/// Translate one message to the wire format.
///
/// A tool call with no result in the history (the executor answered it with
/// plain assistant text) is not echoed: providers reject an assistant
/// `tool_calls` entry that is never followed by a `tool` message.
fn translate_message(msg: &Message, answered: &HashSet<&str>) -> OpenAIMessage {
    match msg {
        Message::System { text } => OpenAIMessage::plain("system", text),
        Message::Human { text } => OpenAIMessage::plain("user", text),
        Message::Assistant { text, tool_call } => {
            let tool_calls = tool_call
                .as_ref()
                .filter(|call| answered.contains(call.call_id.as_str()))
                .map(|call| {
                    vec![OpenAIToolCall {
                        id: call.call_id.clone(),
                        r#type: "function".to_string(),
                        function: OpenAIFunctionCall {
                            name: call.name.clone(),
                            arguments: serde_json::Value::String(call.arguments.to_wire_string()),
                        },
                    }]
                });
            let content = match (text, &tool_calls) {
                (Some(text), _) => Some(text.clone()),
                (None, Some(_)) => None,
                (None, None) => Some(String::new()),
            };
            OpenAIMessage {
                role: "assistant".to_string(),
                content,
                tool_calls,
                tool_call_id: None,
                name: None,
            }
        }
        Message::ToolResult {
            call_id,
            tool_name,
            text,
        } => OpenAIMessage {
            role: "tool".to_string(),
            content: Some(text.clone()),
            tool_calls: None,
            tool_call_id: Some(call_id.clone()),
            name: Some(tool_name.clone()),
        },
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |error_resp| error_resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(openai_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
pub(super) struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct OpenAIMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl OpenAIMessage {
    fn plain(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(text.to_string()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct OpenAITool {
    pub r#type: String,
    pub function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
pub(super) struct OpenAIFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct OpenAIToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default = "function_type")]
    pub r#type: String,
    pub function: OpenAIFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct OpenAIFunctionCall {
    pub name: String,
    /// Usually a JSON-encoded string, some providers send an object
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[allow(clippy::struct_field_names)]
pub(super) struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
