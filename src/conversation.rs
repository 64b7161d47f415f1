//! Conversation state
//!
//! Holds the ordered message history for one chat and the single-flight
//! `awaiting_response` flag. All mutation goes through [`ConversationState`];
//! the registry only hands out shared handles.

mod message;
mod registry;
mod state;


pub use message::{Message, Role};
pub use registry::{Conversation, ConversationRegistry};
pub use state::{ConversationError, ConversationSnapshot, ConversationState};
#[cfg(test)]
pub use state::GREETING;
