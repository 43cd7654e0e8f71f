//! Mock implementations for testing
//!
//! These mocks let the graph run whole turns without a network or a disk.

use super::traits::{LlmClient, ToolExecutor};
use crate::llm::{
    LlmError, LlmRequest, LlmResponse, Message, ToolArguments, ToolCall, ToolDefinition, Usage,
};
use crate::tools::{ExtractError, TextExtractor, ToolOutput};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

// ============================================================================
// Response helpers
// ============================================================================

pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        message: Message::assistant_text(text),
        end_turn: true,
        usage: Usage::default(),
    }
}

pub fn tool_call_response(call_id: &str, name: &str, arguments: ToolArguments) -> LlmResponse {
    LlmResponse {
        message: Message::assistant_tool_call(ToolCall::new(call_id, name, arguments)),
        end_turn: false,
        usage: Usage::default(),
    }
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Mock tool executor with predefined outputs
pub struct MockToolExecutor {
    outputs: HashMap<String, ToolOutput>,
    definitions: Vec<ToolDefinition>,
    /// Record of tool executions
    executions: Mutex<Vec<(String, Value)>>,
}

impl MockToolExecutor {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            definitions: Vec::new(),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool with a predefined output
    pub fn with_tool(mut self, name: impl Into<String>, output: ToolOutput) -> Self {
        let name = name.into();
        self.definitions.push(ToolDefinition {
            name: name.clone(),
            description: format!("Mock {name}"),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        });
        self.outputs.insert(name, output);
        self
    }

    /// Get recorded executions
    pub fn recorded_executions(&self) -> Vec<(String, Value)> {
        self.executions.lock().unwrap().clone()
    }
}

impl Default for MockToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        self.executions
            .lock()
            .unwrap()
            .push((name.to_string(), input));
        self.outputs.get(name).cloned()
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }
}

// ============================================================================
// Plain-text extractor
// ============================================================================

/// Reads `.pdf` fixtures as UTF-8 so tests don't need real PDFs
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// Whole-turn tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use crate::runtime::{
        run_turn, CompiledGraph, GraphBuilder, ReasoningSettings, ToolRegistryExecutor, TurnError,
        DECODE_ERROR_MESSAGE,
    };
    use crate::tools::{LoadResumesTool, ToolContext, ToolRegistry, DOCUMENT_SEPARATOR};
    use serde_json::json;
    use std::sync::Arc;

    const SYSTEM: &str = "Você é um recrutador.";

    type MockGraph = CompiledGraph<Arc<MockLlmClient>, Arc<MockToolExecutor>>;

    fn loader_output() -> ToolOutput {
        let docs = vec!["João - Rust".to_string(), "Maria - Python".to_string()];
        let mut text = "✅ Documentos carregados com sucesso. Total de 2 currículos.".to_string();
        for doc in &docs {
            text.push_str(DOCUMENT_SEPARATOR);
            text.push_str(doc);
        }
        ToolOutput::success(text).with_documents(docs)
    }

    fn graph(
        llm: &Arc<MockLlmClient>,
        tools: &Arc<MockToolExecutor>,
        max_iterations: usize,
    ) -> MockGraph {
        GraphBuilder::standard(
            Arc::clone(llm),
            Arc::clone(tools),
            ReasoningSettings::new(SYSTEM).with_temperature(0.3),
        )
        .max_iterations(max_iterations)
        .compile()
        .unwrap()
    }

    fn setup() -> (Arc<MockLlmClient>, Arc<MockToolExecutor>) {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        let tools = Arc::new(MockToolExecutor::new().with_tool("carregar_pdf", loader_output()));
        (llm, tools)
    }

    #[tokio::test]
    async fn test_load_and_analyze() {
        let (llm, tools) = setup();
        llm.queue_response(tool_call_response(
            "call_1",
            "carregar_pdf",
            ToolArguments::from_raw(r#"{"path": "curriculos"}"#),
        ));
        llm.queue_response(text_response("João: Sim. Maria: Talvez."));
        let graph = graph(&llm, &tools, 10);

        let state = run_turn(&graph, "carregue e analise os currículos").await.unwrap();

        assert_eq!(state.final_text(), Some("João: Sim. Maria: Talvez."));
        assert!(state.data_loaded);
        assert_eq!(
            state.pending_documents,
            vec!["João - Rust".to_string(), "Maria - Python".to_string()]
        );
        assert_eq!(state.history.len(), 4);
        assert!(matches!(state.history[2], Message::ToolResult { ref call_id, .. } if call_id == "call_1"));

        assert_eq!(
            tools.recorded_executions(),
            vec![("carregar_pdf".to_string(), json!({"path": "curriculos"}))]
        );

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.messages[0], Message::system(SYSTEM));
            assert_eq!(request.tools.len(), 1);
            assert_eq!(request.tools[0].name, "carregar_pdf");
            assert_eq!(request.temperature, Some(0.3));
        }
        let second = &requests[1].messages;
        assert_eq!(second.len(), 4);
        match &second[3] {
            Message::ToolResult { text, .. } => {
                assert_eq!(text.matches(DOCUMENT_SEPARATOR).count(), 2);
            }
            other => panic!("expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hello_needs_one_round_trip() {
        let (llm, tools) = setup();
        llm.queue_response(text_response("Olá! Posso analisar currículos para você."));
        let graph = graph(&llm, &tools, 10);

        let state = run_turn(&graph, "olá").await.unwrap();

        assert_eq!(
            state.history,
            vec![
                Message::human("olá"),
                Message::assistant_text("Olá! Posso analisar currículos para você."),
            ]
        );
        assert!(!state.data_loaded);
        assert!(state.pending_documents.is_empty());
        assert!(tools.recorded_executions().is_empty());
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_service_error_ends_turn() {
        let (llm, tools) = setup();
        llm.queue_error(LlmError::rate_limit("slow down"));
        let graph = graph(&llm, &tools, 10);

        let err = run_turn(&graph, "olá").await.unwrap_err();

        assert!(matches!(err, TurnError::Service(ref e) if e.kind == LlmErrorKind::RateLimit));
        assert!(tools.recorded_executions().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_after_tool_ends_turn() {
        let (llm, tools) = setup();
        llm.queue_response(tool_call_response(
            "call_1",
            "carregar_pdf",
            ToolArguments::decoded(json!({})),
        ));
        llm.queue_error(LlmError::server_error("502"));
        let graph = graph(&llm, &tools, 10);

        let err = run_turn(&graph, "carregue").await.unwrap_err();

        assert!(matches!(err, TurnError::Service(_)));
        assert_eq!(tools.recorded_executions().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_arguments_loop_back_without_tool_result() {
        let (llm, tools) = setup();
        llm.queue_response(tool_call_response(
            "call_1",
            "carregar_pdf",
            ToolArguments::from_raw("{path: curriculos"),
        ));
        llm.queue_response(text_response("Desculpe, tente novamente."));
        let graph = graph(&llm, &tools, 10);

        let state = run_turn(&graph, "carregue").await.unwrap();

        assert!(tools.recorded_executions().is_empty());
        assert!(!state.data_loaded);
        assert!(!state
            .history
            .iter()
            .any(|m| matches!(m, Message::ToolResult { .. })));
        assert_eq!(state.history[2], Message::assistant_text(DECODE_ERROR_MESSAGE));
        assert_eq!(state.final_text(), Some("Desculpe, tente novamente."));
        assert_eq!(llm.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_answered() {
        let (llm, tools) = setup();
        llm.queue_response(tool_call_response(
            "call_9",
            "enviar_email",
            ToolArguments::decoded(json!({})),
        ));
        llm.queue_response(text_response("Não consigo enviar emails."));
        let graph = graph(&llm, &tools, 10);

        let state = run_turn(&graph, "mande um email").await.unwrap();

        match &state.history[2] {
            Message::ToolResult {
                call_id,
                tool_name,
                text,
            } => {
                assert_eq!(call_id, "call_9");
                assert_eq!(tool_name, "enviar_email");
                assert!(text.contains("carregar_pdf"));
            }
            other => panic!("expected tool result, got {other:?}"),
        }
        assert!(!state.data_loaded);
        assert_eq!(state.final_text(), Some("Não consigo enviar emails."));
    }

    #[tokio::test]
    async fn test_endless_tool_calls_hit_iteration_limit() {
        let (llm, tools) = setup();
        for i in 0..5 {
            llm.queue_response(tool_call_response(
                &format!("call_{i}"),
                "carregar_pdf",
                ToolArguments::decoded(json!({})),
            ));
        }
        let graph = graph(&llm, &tools, 3);

        let err = run_turn(&graph, "carregue").await.unwrap_err();

        assert!(matches!(err, TurnError::IterationLimit { limit: 3 }));
        assert_eq!(llm.recorded_requests().len(), 3);
        assert_eq!(tools.recorded_executions().len(), 3);
    }

    #[tokio::test]
    async fn test_turns_do_not_share_state() {
        let (llm, tools) = setup();
        llm.queue_response(text_response("primeira"));
        llm.queue_response(text_response("segunda"));
        let graph = graph(&llm, &tools, 10);

        run_turn(&graph, "um").await.unwrap();
        let state = run_turn(&graph, "dois").await.unwrap();

        assert_eq!(state.history.len(), 2);
        assert_eq!(llm.recorded_requests()[1].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_real_registry_loads_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ana.pdf"), "Ana - Go").unwrap();
        std::fs::write(dir.path().join("bruno.pdf"), "Bruno - Rust").unwrap();

        let registry = ToolRegistry::with_loader(
            LoadResumesTool::with_extractor(PlainTextExtractor),
            ToolContext::new(dir.path()),
        );
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(tool_call_response(
            "call_1",
            "carregar_pdf",
            ToolArguments::from_raw(""),
        ));
        llm.queue_response(text_response("Bruno: Sim."));
        let graph = GraphBuilder::standard(
            Arc::clone(&llm),
            ToolRegistryExecutor::new(registry),
            ReasoningSettings::new(SYSTEM),
        )
        .compile()
        .unwrap();

        let state = run_turn(&graph, "analise").await.unwrap();

        assert!(state.data_loaded);
        assert_eq!(
            state.pending_documents,
            vec!["Ana - Go".to_string(), "Bruno - Rust".to_string()]
        );
        let observation = state.history[2].text().unwrap();
        assert!(observation.contains("Total de 2 currículos"));
        assert_eq!(observation.matches(DOCUMENT_SEPARATOR).count(), 2);
    }
}
