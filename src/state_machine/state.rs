//! Conversation state and partial updates

use crate::llm::Message;

/// State threaded through every step of a turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    /// Append-only within a turn. Never holds the system message.
    pub history: Vec<Message>,
    /// Set once the loader has run, even if it reported an error. Nothing
    /// reads it yet.
    pub data_loaded: bool,
    /// Raw per-document text retained from the last load
    pub pending_documents: Vec<String>,
}

impl ConversationState {
    /// Fresh state for one user turn
    pub fn seeded(input: impl Into<String>) -> Self {
        Self {
            history: vec![Message::human(input)],
            ..Self::default()
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.history.last()
    }

    /// Text of the last assistant message, what the user gets to see
    pub fn final_text(&self) -> Option<&str> {
        self.history
            .last()
            .filter(|m| m.is_assistant())
            .and_then(Message::text)
    }

    /// Merge a step's output into the running state.
    ///
    /// `history` is appended; the other fields are overwritten only when the
    /// update sets them.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            history,
            data_loaded,
            pending_documents,
        } = update;

        self.history.extend(history);
        if let Some(loaded) = data_loaded {
            self.data_loaded = loaded;
        }
        if let Some(documents) = pending_documents {
            self.pending_documents = documents;
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn merged(mut self, update: StateUpdate) -> Self {
        self.apply(update);
        self
    }
}

/// Partial state produced by a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub history: Vec<Message>,
    pub data_loaded: Option<bool>,
    pub pending_documents: Option<Vec<String>>,
}

impl StateUpdate {
    /// An update that leaves the state untouched
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(message: Message) -> Self {
        Self {
            history: vec![message],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_data_loaded(mut self, loaded: bool) -> Self {
        self.data_loaded = Some(loaded);
        self
    }

    #[must_use]
    pub fn with_pending_documents(mut self, documents: Vec<String>) -> Self {
        self.pending_documents = Some(documents);
        self
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.data_loaded.is_none() && self.pending_documents.is_none()
    }
}
