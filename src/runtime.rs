//! Runtime for executing turns
//!
//! The graph engine drives two steps, reasoning and tool execution, over a
//! fresh conversation state per turn. I/O goes through the `LlmClient` and
//! `ToolExecutor` traits so whole turns can run against mocks.

mod executor;
mod graph;
mod reasoning;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use graph::{run_turn, CompiledGraph, GraphBuilder, DEFAULT_MAX_ITERATIONS};
pub use reasoning::ReasoningSettings;
pub use traits::*;

#[cfg(test)]
pub use executor::DECODE_ERROR_MESSAGE;
#[cfg(test)]
pub use graph::TurnError;
