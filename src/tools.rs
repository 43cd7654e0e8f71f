//! Tools the model can call
//!
//! The set of tools is closed: `ToolKind` lists every tool this agent knows,
//! and the registry only dispatches names that map to one of them.

mod load_resumes;

pub use load_resumes::LoadResumesTool;
#[cfg(test)]
pub use load_resumes::{ExtractError, TextExtractor, DOCUMENT_SEPARATOR};

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::llm::ToolDefinition;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    /// Observation handed back to the model
    pub output: String,
    /// Raw documents a loader chose to hand to the conversation state
    pub documents: Option<Vec<String>>,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            documents: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            documents: None,
        }
    }

    #[must_use]
    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        self.documents = Some(documents);
        self
    }
}

/// Per-call context. Tools hold no state of their own.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Folder the loader reads when the model doesn't name one
    pub resume_folder: PathBuf,
}

impl ToolContext {
    pub fn new(resume_folder: impl Into<PathBuf>) -> Self {
        Self {
            resume_folder: resume_folder.into(),
        }
    }
}

/// Trait for tools that can be executed by the agent
///
/// `run` never fails: every problem is reported in the returned observation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Every tool this agent can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    LoadResumes,
}

impl ToolKind {
    pub const ALL: &'static [ToolKind] = &[ToolKind::LoadResumes];

    /// Name the model uses to call the tool
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::LoadResumes => "carregar_pdf",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

/// Collection of tools available to the agent
pub struct ToolRegistry {
    tools: Vec<(ToolKind, Arc<dyn Tool>)>,
    context: ToolContext,
}

impl ToolRegistry {
    /// Registry with the built-in resume loader
    pub fn standard(context: ToolContext) -> Self {
        Self::with_loader(LoadResumesTool::default(), context)
    }

    /// Registry with a specific loader (e.g. a non-PDF extractor in tests)
    pub fn with_loader(loader: LoadResumesTool, context: ToolContext) -> Self {
        Self {
            tools: vec![(ToolKind::LoadResumes, Arc::new(loader))],
            context,
        }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(_, t)| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name. `None` means no registered tool has that name.
    pub async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        let kind = ToolKind::from_name(name)?;
        let (_, tool) = self.tools.iter().find(|(k, _)| *k == kind)?;
        Some(tool.run(input, self.context.clone()).await)
    }
}
