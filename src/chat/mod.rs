pub mod conversation;
pub mod terminal;

pub use conversation::{Conversation, PollSettings};
