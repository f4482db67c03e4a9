//! # promptcraft agent
//!
//! The flows that tie the core pieces together:
//! 1. `Conversation`: send instructions + input, record the answer, then keep
//!    asking follow-up questions with the whole transcript as context
//! 2. `VideoStudio`: collect a prompt and options, submit one generation job,
//!    poll it until it finishes, download the result
//!
//! Both are generic over the provider traits so they run against mocks in tests.

mod conversation;
mod studio;

pub use conversation::{Conversation, ConversationConfig, FOLLOW_UP_PROMPT};
pub use studio::{StudioConfig, StudioOutcome, VideoStudio};
