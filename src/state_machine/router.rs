//! Pure routing decision taken after every reasoning step

use crate::llm::Message;
use std::fmt;

/// Where the turn goes after the model has answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Run the tool call carried by the latest message
    Tool,
    /// The model produced its answer; the turn is over
    End,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Tool => "tool",
            Route::End => "end",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide the next step from the latest message only.
///
/// `Tool` iff the message is an assistant message with a named tool call.
pub fn route(latest: Option<&Message>) -> Route {
    match latest.and_then(Message::tool_call) {
        Some(_) => Route::Tool,
        None => Route::End,
    }
}
