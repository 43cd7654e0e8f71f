//! Tool execution step: runs the tool call carried by the latest message

use super::traits::ToolExecutor;
use crate::llm::{Message, ToolArguments};
use crate::state_machine::{ConversationState, StateUpdate};
use crate::tools::ToolKind;

/// Shown to the model when it produced arguments that are not JSON
pub const DECODE_ERROR_MESSAGE: &str =
    "Erro na Tool: O LLM gerou argumentos JSON inválidos para a função.";

/// Execute the pending tool call and describe the outcome as a state update.
///
/// - no tool call on the latest message: empty update
/// - undecodable arguments: one assistant message and no tool result, so the
///   call stays unanswered in the history
/// - unknown tool name: a tool result carrying the error
/// - known tool: a tool result with its observation. Running the loader sets
///   `data_loaded` even when its observation is an error; documents it hands
///   back are kept in `pending_documents`.
pub async fn execute_tool<T: ToolExecutor + ?Sized>(
    tools: &T,
    state: &ConversationState,
) -> StateUpdate {
    let Some(call) = state.last_message().and_then(Message::tool_call) else {
        tracing::debug!("No tool call on the latest message");
        return StateUpdate::none();
    };

    let input = match &call.arguments {
        ToolArguments::Decoded { value } => value.clone(),
        ToolArguments::Malformed { raw, error } => {
            tracing::warn!(
                tool = %call.name,
                call_id = %call.call_id,
                raw = %raw,
                error = %error,
                "Tool call arguments are not valid JSON"
            );
            return StateUpdate::message(Message::assistant_text(DECODE_ERROR_MESSAGE));
        }
    };

    tracing::info!(tool = %call.name, call_id = %call.call_id, "Executing tool");

    let Some(output) = tools.execute(&call.name, input).await else {
        let available: Vec<_> = tools.definitions().into_iter().map(|d| d.name).collect();
        tracing::warn!(tool = %call.name, ?available, "Model called an unknown tool");
        return StateUpdate::message(Message::tool_result(
            &call.call_id,
            &call.name,
            format!(
                "❌ Erro: a ferramenta '{}' não existe. Ferramentas disponíveis: {}",
                call.name,
                available.join(", ")
            ),
        ));
    };

    tracing::debug!(
        tool = %call.name,
        success = output.success,
        output_len = output.output.len(),
        "Tool finished"
    );

    let mut update = StateUpdate::message(Message::tool_result(
        &call.call_id,
        &call.name,
        output.output,
    ));
    if ToolKind::from_name(&call.name) == Some(ToolKind::LoadResumes) {
        update = update.with_data_loaded(true);
    }
    if let Some(documents) = output.documents {
        update = update.with_pending_documents(documents);
    }
    update
}
