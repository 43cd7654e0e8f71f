//! Graph engine: a builder that wires the nodes, and the compiled graph
//! that drives one turn through them.
//!
//! The only topology this agent uses is
//!
//! ```text
//! reason --(tool)--> execute_tool --> reason
//!        --(end)---> __end__
//! ```
//!
//! but wiring goes through [`GraphBuilder`] so mistakes surface at
//! `compile()` instead of mid-turn.

use super::executor::execute_tool;
use super::reasoning::{reason, ReasoningSettings};
use super::traits::{LlmClient, ToolExecutor};
use crate::llm::{LlmError, Message, ToolDefinition};
use crate::state_machine::{route, ConversationState, Route};
use std::collections::HashMap;
use std::fmt::{self, Write};
use thiserror::Error;
use tracing::Instrument;

/// Reasoning steps allowed per turn unless configured otherwise
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// A step in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Reason,
    ExecuteTool,
    /// Terminal: the turn is over
    End,
}

impl Node {
    pub fn as_str(self) -> &'static str {
        match self {
            Node::Reason => "reason",
            Node::ExecuteTool => "execute_tool",
            Node::End => "__end__",
        }
    }

    fn is_terminal(self) -> bool {
        self == Node::End
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing function for a conditional edge
pub type Router = fn(Option<&Message>) -> Route;

#[derive(Clone, Copy)]
enum Edge {
    Direct(Node),
    Conditional {
        router: Router,
        on_tool: Node,
        on_end: Node,
    },
}

impl Edge {
    fn targets(self) -> Vec<Node> {
        match self {
            Edge::Direct(to) => vec![to],
            Edge::Conditional {
                on_tool, on_end, ..
            } => vec![on_tool, on_end],
        }
    }
}

/// Wiring mistakes caught by [`GraphBuilder::compile`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has no entry node")]
    MissingEntry,
    #[error("entry node cannot be the terminal node")]
    TerminalEntry,
    #[error("node '{0}' has no outgoing edge")]
    MissingEdge(Node),
    #[error("node '{0}' has more than one outgoing edge")]
    DuplicateEdge(Node),
    #[error("the terminal node cannot have outgoing edges")]
    EdgeFromTerminal,
    #[error("iteration limit must be at least 1")]
    ZeroIterationLimit,
}

/// Why a turn stopped without an answer
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("reasoning service failed: {0}")]
    Service(#[from] LlmError),
    #[error("turn exceeded {limit} reasoning steps")]
    IterationLimit { limit: usize },
}

/// Declares the graph; [`compile`](Self::compile) validates it.
pub struct GraphBuilder<L, T> {
    llm: L,
    tools: T,
    settings: ReasoningSettings,
    entry: Option<Node>,
    edges: HashMap<Node, Edge>,
    wiring_error: Option<GraphError>,
    max_iterations: usize,
}

impl<L: LlmClient, T: ToolExecutor> GraphBuilder<L, T> {
    /// Empty builder: no entry, no edges
    pub fn new(llm: L, tools: T, settings: ReasoningSettings) -> Self {
        Self {
            llm,
            tools,
            settings,
            entry: None,
            edges: HashMap::new(),
            wiring_error: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Builder with the agent's reason/tool loop already wired
    pub fn standard(llm: L, tools: T, settings: ReasoningSettings) -> Self {
        Self::new(llm, tools, settings)
            .entry(Node::Reason)
            .conditional_edge(Node::Reason, route, Node::ExecuteTool, Node::End)
            .edge(Node::ExecuteTool, Node::Reason)
    }

    #[must_use]
    pub fn entry(mut self, node: Node) -> Self {
        self.entry = Some(node);
        self
    }

    #[must_use]
    pub fn edge(self, from: Node, to: Node) -> Self {
        self.add_edge(from, Edge::Direct(to))
    }

    /// Edge whose target is picked by `router` from the latest message
    #[must_use]
    pub fn conditional_edge(self, from: Node, router: Router, on_tool: Node, on_end: Node) -> Self {
        self.add_edge(
            from,
            Edge::Conditional {
                router,
                on_tool,
                on_end,
            },
        )
    }

    /// Maximum reasoning steps per turn
    #[must_use]
    pub fn max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = limit;
        self
    }

    fn add_edge(mut self, from: Node, edge: Edge) -> Self {
        if self.wiring_error.is_some() {
            return self;
        }
        if from.is_terminal() {
            self.wiring_error = Some(GraphError::EdgeFromTerminal);
        } else if self.edges.insert(from, edge).is_some() {
            self.wiring_error = Some(GraphError::DuplicateEdge(from));
        }
        self
    }

    pub fn compile(self) -> Result<CompiledGraph<L, T>, GraphError> {
        if let Some(err) = self.wiring_error {
            return Err(err);
        }
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        if entry.is_terminal() {
            return Err(GraphError::TerminalEntry);
        }
        if self.max_iterations == 0 {
            return Err(GraphError::ZeroIterationLimit);
        }

        // Every node the turn can reach must know where to go next
        let mut pending = vec![entry];
        let mut seen = Vec::new();
        while let Some(node) = pending.pop() {
            if node.is_terminal() || seen.contains(&node) {
                continue;
            }
            seen.push(node);
            let edge = self.edges.get(&node).ok_or(GraphError::MissingEdge(node))?;
            pending.extend(edge.targets());
        }

        let tool_definitions = self.tools.definitions();
        Ok(CompiledGraph {
            llm: self.llm,
            tools: self.tools,
            settings: self.settings,
            tool_definitions,
            entry,
            edges: self.edges,
            max_iterations: self.max_iterations,
        })
    }
}

/// Validated, immutable graph. Shared by reference across turns.
pub struct CompiledGraph<L, T> {
    llm: L,
    tools: T,
    settings: ReasoningSettings,
    tool_definitions: Vec<ToolDefinition>,
    entry: Node,
    edges: HashMap<Node, Edge>,
    max_iterations: usize,
}

impl<L: LlmClient, T: ToolExecutor> CompiledGraph<L, T> {
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Node that follows `node` given the state it produced
    pub fn next(&self, node: Node, state: &ConversationState) -> Node {
        match self.edges.get(&node) {
            Some(Edge::Direct(to)) => *to,
            Some(Edge::Conditional {
                router,
                on_tool,
                on_end,
            }) => match router(state.last_message()) {
                Route::Tool => *on_tool,
                Route::End => *on_end,
            },
            // compile() guarantees reachable nodes have an edge
            None => Node::End,
        }
    }

    /// Drive `state` from the entry node until the terminal node.
    pub async fn invoke(&self, mut state: ConversationState) -> Result<ConversationState, TurnError> {
        let mut node = self.entry;
        let mut reasoning_steps = 0;

        loop {
            match node {
                Node::End => return Ok(state),
                Node::Reason => {
                    if reasoning_steps == self.max_iterations {
                        tracing::warn!(limit = self.max_iterations, "Turn hit the iteration limit");
                        return Err(TurnError::IterationLimit {
                            limit: self.max_iterations,
                        });
                    }
                    reasoning_steps += 1;
                    let update =
                        reason(&self.llm, &self.settings, &self.tool_definitions, &state).await?;
                    state.apply(update);
                }
                Node::ExecuteTool => {
                    let update = execute_tool(&self.tools, &state).await;
                    state.apply(update);
                }
            }

            let next = self.next(node, &state);
            tracing::debug!(from = %node, to = %next, step = reasoning_steps, "Graph transition");
            node = next;
        }
    }

    /// Topology as a Mermaid flowchart
    pub fn to_mermaid(&self) -> String {
        let mut nodes: Vec<_> = self.edges.keys().copied().collect();
        nodes.sort_by_key(|n| n.as_str());

        let mut out = String::from("graph TD;\n");
        let _ = writeln!(out, "    __start__ --> {};", self.entry);
        for from in nodes {
            match self.edges[&from] {
                Edge::Direct(to) => {
                    let _ = writeln!(out, "    {from} --> {to};");
                }
                Edge::Conditional {
                    on_tool, on_end, ..
                } => {
                    let _ = writeln!(out, "    {from} -.->|{}| {on_tool};", Route::Tool);
                    let _ = writeln!(out, "    {from} -.->|{}| {on_end};", Route::End);
                }
            }
        }
        out
    }
}

/// Run one user turn: seed a fresh state with `input` and drive the graph.
pub async fn run_turn<L: LlmClient, T: ToolExecutor>(
    graph: &CompiledGraph<L, T>,
    input: &str,
) -> Result<ConversationState, TurnError> {
    let turn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("turn", %turn_id);

    async {
        tracing::info!(input_len = input.len(), "Turn started");
        let result = graph.invoke(ConversationState::seeded(input)).await;
        match &result {
            Ok(state) => tracing::info!(
                messages = state.history.len(),
                data_loaded = state.data_loaded,
                "Turn finished"
            ),
            Err(e) => tracing::error!(error = %e, "Turn failed"),
        }
        result
    }
    .instrument(span)
    .await
}
