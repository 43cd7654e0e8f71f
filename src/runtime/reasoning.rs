//! Reasoning step: one call to the model with the whole history

use super::traits::LlmClient;
use crate::llm::{LlmError, LlmRequest, Message, ToolDefinition};
use crate::state_machine::{ConversationState, StateUpdate};

/// Fixed inputs of every reasoning call
#[derive(Debug, Clone)]
pub struct ReasoningSettings {
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ReasoningSettings {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Build the prompt: the system message, then the history as-is
pub fn build_request(
    settings: &ReasoningSettings,
    tools: &[ToolDefinition],
    state: &ConversationState,
) -> LlmRequest {
    let mut messages = Vec::with_capacity(state.history.len() + 1);
    messages.push(Message::system(settings.system_prompt.clone()));
    messages.extend(state.history.iter().cloned());

    LlmRequest {
        messages,
        tools: tools.to_vec(),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

/// Ask the model for the next assistant message.
///
/// Service failures are returned as-is; nothing is appended on error.
pub async fn reason<L: LlmClient + ?Sized>(
    llm: &L,
    settings: &ReasoningSettings,
    tools: &[ToolDefinition],
    state: &ConversationState,
) -> Result<StateUpdate, LlmError> {
    let request = build_request(settings, tools, state);
    let response = llm.complete(&request).await?;

    if !response.message.is_assistant() {
        return Err(LlmError::unknown(format!(
            "Provider returned a non-assistant message: {:?}",
            response.message
        )));
    }

    tracing::debug!(
        model = %llm.model_id(),
        has_text = response.message.text().is_some(),
        tool_call = response.message.tool_call().map(|c| c.name.as_str()),
        end_turn = response.end_turn,
        "Reasoning step finished"
    );

    Ok(StateUpdate::message(response.message))
}
