use chrono::{DateTime, Local};
use rand::Rng;
use uuid::Uuid;

/// Title every conversation starts with until its first message arrives.
pub const DEFAULT_TITLE: &str = "New chat";

/// Number of characters of the first message kept as the conversation title.
pub const TITLE_MAX_CHARS: usize = 32;

/// A single conversation in an agent's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Local>,
    /// Correlates with the backend's thread; sent as `x-thread-id`.
    pub thread_id: String,
}

impl ConversationRecord {
    pub fn new() -> Self {
        Self {
            id: new_conversation_id(),
            title: DEFAULT_TITLE.to_string(),
            updated_at: Local::now(),
            thread_id: new_thread_id(),
        }
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Human readable "last updated" label relative to `now`.
    pub fn updated_label(&self, now: DateTime<Local>) -> String {
        let elapsed = now.signed_duration_since(self.updated_at);
        let minutes = elapsed.num_minutes();
        if minutes < 1 {
            String::from("just now")
        } else if minutes < 60 {
            format!("{minutes} min ago")
        } else if elapsed.num_hours() < 24 {
            format!("{} h ago", elapsed.num_hours())
        } else {
            self.updated_at.format("%m-%d %H:%M").to_string()
        }
    }
}

impl Default for ConversationRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// `c-{unix millis}-{6 hex chars}`. Unique enough for one session, not globally.
pub fn new_conversation_id() -> String {
    let millis = Local::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
    format!("c-{millis}-{suffix:06x}")
}

pub fn new_thread_id() -> String {
    Uuid::new_v4().to_string()
}

/// First [`TITLE_MAX_CHARS`] characters of the trimmed message.
pub fn title_from_message(text: &str) -> String {
    text.trim().chars().take(TITLE_MAX_CHARS).collect()
}
