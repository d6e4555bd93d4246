//! Per-agent conversation history and the active agent/conversation selection.

pub mod record;
pub mod store;

pub use record::ConversationRecord;
pub use store::ConversationStore;
