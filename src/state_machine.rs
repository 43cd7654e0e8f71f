//! Conversation state and routing
//!
//! Everything here is pure: the state container, the merge of partial
//! updates, and the routing decision. I/O lives in `runtime`.

pub mod router;
pub mod state;


pub use router::{route, Route};
pub use state::{ConversationState, StateUpdate};
