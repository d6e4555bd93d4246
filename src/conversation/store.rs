use std::collections::HashMap;

use chrono::Local;
use log::debug;

use super::record::{ConversationRecord, title_from_message};

/// In-memory conversation history keyed by agent id, plus the active selection.
///
/// Every mutation goes through the methods below. Two invariants hold after each
/// of them:
/// - an agent that has been selected maps to a non-empty list;
/// - a non-empty active conversation id names a record of the active agent.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Vec<ConversationRecord>>,
    active_agent_id: String,
    active_conversation_id: String,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_agent_id(&self) -> &str {
        &self.active_agent_id
    }

    pub fn active_conversation_id(&self) -> &str {
        &self.active_conversation_id
    }

    /// Conversations of `agent_id`, newest user-added first. Empty if never visited.
    pub fn conversations_for(&self, agent_id: &str) -> &[ConversationRecord] {
        self.conversations
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_conversations_for(&self, agent_id: &str) -> bool {
        self.conversations.contains_key(agent_id)
    }

    pub fn active_conversation(&self) -> Option<&ConversationRecord> {
        self.find(&self.active_agent_id, &self.active_conversation_id)
    }

    pub fn find(&self, agent_id: &str, conversation_id: &str) -> Option<&ConversationRecord> {
        self.conversations
            .get(agent_id)?
            .iter()
            .find(|record| record.id == conversation_id)
    }

    /// Replaces all history with one fresh conversation for `agent_id` and
    /// makes both active. Used once, when the agent directory first loads.
    pub fn seed(&mut self, agent_id: &str) {
        let record = ConversationRecord::new();
        debug!("Seeding conversation {} for agent {}", record.id, agent_id);
        self.active_agent_id = agent_id.to_string();
        self.active_conversation_id = record.id.clone();
        self.conversations.clear();
        self.conversations.insert(agent_id.to_string(), vec![record]);
    }

    /// Creates a single conversation for an agent without history and makes it
    /// active. Returns `true` if a conversation was created.
    pub fn ensure_conversations_for(&mut self, agent_id: &str) -> bool {
        if agent_id.is_empty() || self.has_conversations_for(agent_id) {
            return false;
        }
        let record = ConversationRecord::new();
        debug!("Creating fallback conversation {} for agent {}", record.id, agent_id);
        self.active_conversation_id = record.id.clone();
        self.conversations.insert(agent_id.to_string(), vec![record]);
        true
    }

    /// Prepends a new conversation for `agent_id` and makes it active.
    /// Does nothing while no agent is active.
    pub fn add_conversation(&mut self, agent_id: &str) -> Option<&ConversationRecord> {
        if self.active_agent_id.is_empty() || agent_id.is_empty() {
            return None;
        }
        let record = ConversationRecord::new();
        self.active_agent_id = agent_id.to_string();
        self.active_conversation_id = record.id.clone();
        let list = self.conversations.entry(agent_id.to_string()).or_default();
        list.insert(0, record);
        list.first()
    }

    /// Activates `agent_id` and its most recent conversation; an agent without
    /// history gets one immediately.
    pub fn select_agent(&mut self, agent_id: &str) {
        self.active_agent_id = agent_id.to_string();
        self.active_conversation_id = self
            .conversations
            .get(agent_id)
            .and_then(|list| list.first())
            .map(|record| record.id.clone())
            .unwrap_or_default();
        self.ensure_conversations_for(agent_id);
    }

    /// Activates a specific conversation, possibly of a non-active agent.
    /// Returns `false` and leaves the selection alone if it does not exist.
    pub fn select_conversation(&mut self, agent_id: &str, conversation_id: &str) -> bool {
        if self.find(agent_id, conversation_id).is_none() {
            return false;
        }
        self.active_agent_id = agent_id.to_string();
        self.active_conversation_id = conversation_id.to_string();
        true
    }

    /// Names a conversation after its first message. Only the first call with a
    /// non-blank message changes anything; later calls are no-ops.
    pub fn record_first_message(&mut self, agent_id: &str, conversation_id: &str, text: &str) -> bool {
        let title = title_from_message(text);
        if title.is_empty() {
            return false;
        }
        let Some(record) = self.find_mut(agent_id, conversation_id) else {
            return false;
        };
        if !record.has_default_title() {
            return false;
        }
        record.title = title;
        record.updated_at = Local::now();
        true
    }

    /// Refreshes the "last updated" timestamp of a conversation.
    pub fn touch(&mut self, agent_id: &str, conversation_id: &str) {
        if let Some(record) = self.find_mut(agent_id, conversation_id) {
            record.updated_at = Local::now();
        }
    }

    fn find_mut(&mut self, agent_id: &str, conversation_id: &str) -> Option<&mut ConversationRecord> {
        self.conversations
            .get_mut(agent_id)?
            .iter_mut()
            .find(|record| record.id == conversation_id)
    }
}
