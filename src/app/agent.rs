use log::{debug, info, warn};

use super::App;
use crate::agent::AgentDescriptor;
use crate::definitions::FocusArea;

// Implementation block for agent and conversation actions in the App.
impl App {
    pub fn active_agent(&self) -> Option<&AgentDescriptor> {
        let active = self.conversations.active_agent_id();
        self.agents.iter().find(|agent| agent.id == active)
    }

    /// Backend thread of the active conversation.
    pub fn active_thread_id(&self) -> Option<&str> {
        self.conversations
            .active_conversation()
            .map(|record| record.thread_id.as_str())
    }

    pub fn is_active_run(&self) -> bool {
        self.active_thread_id()
            .is_some_and(|thread_id| self.bridge.is_running(thread_id))
    }

    /// Activates the agent at `index` of the agent list.
    pub(crate) fn select_agent(&mut self, index: usize) {
        let Some(agent) = self.agents.get(index) else {
            return;
        };
        let (id, name) = (agent.id.clone(), agent.name.clone());
        self.conversations.select_agent(&id);
        self.transcript_scroll = 0;
        self.status_message = format!("Agent: {name}");
        info!("Selected agent {name} ({id})");
    }

    pub(crate) fn select_conversation(&mut self, agent_id: &str, conversation_id: &str) {
        if self.conversations.select_conversation(agent_id, conversation_id) {
            self.transcript_scroll = 0;
            if let Some(record) = self.conversations.active_conversation() {
                self.status_message = format!("Conversation: {}", record.title);
            }
        } else {
            warn!("Ignoring selection of unknown conversation {conversation_id} for agent {agent_id}");
        }
    }

    /// Starts a new conversation for the active agent and focuses the composer.
    pub(crate) fn new_conversation(&mut self) {
        let agent_id = self.conversations.active_agent_id().to_string();
        match self.conversations.add_conversation(&agent_id) {
            Some(record) => {
                debug!("New conversation {} for agent {agent_id}", record.id);
                self.status_message = String::from("Started a new chat");
            }
            None => {
                self.status_message = String::from("No agent selected yet");
                return;
            }
        }
        self.transcript_scroll = 0;
        self.focus = FocusArea::Composer;
        self.clamp_sidebar_selection();
    }

    /// Sends `text` to the active agent on the active conversation's thread.
    ///
    /// Returns `false` without sending when the text is blank, nothing is
    /// active, or the conversation's previous run has not finished. A send
    /// that fails after that point is recorded in the transcript and still
    /// counts as submitted.
    pub(crate) async fn send_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let agent_id = self.conversations.active_agent_id().to_string();
        let conversation_id = self.conversations.active_conversation_id().to_string();
        let Some(thread_id) = self
            .conversations
            .find(&agent_id, &conversation_id)
            .map(|record| record.thread_id.clone())
        else {
            self.status_message = String::from("Select an agent and a conversation first");
            return false;
        };
        if self.bridge.is_running(&thread_id) {
            self.status_message = String::from("The agent is still responding, wait for it to finish");
            return false;
        }

        self.conversations
            .record_first_message(&agent_id, &conversation_id, text);
        self.conversations.touch(&agent_id, &conversation_id);
        self.transcript_scroll = 0;

        match self.bridge.send_message(&agent_id, &thread_id, text).await {
            Ok(()) => {
                let name = self
                    .active_agent()
                    .map(|agent| agent.name.clone())
                    .unwrap_or(agent_id);
                self.status_message = format!("Waiting for {name}...");
            }
            Err(err) => {
                self.status_message = format!("Send failed: {err}");
            }
        }
        true
    }

    /// Handles Enter in the composer: slash commands run locally, anything
    /// else is sent. The input is kept when nothing could be sent.
    pub(crate) async fn submit_composer(&mut self) {
        let input = self.composer.buffer().trim().to_string();
        if input.is_empty() {
            return;
        }
        if input.starts_with('/') {
            self.composer.take();
            self.execute_command(&input);
            return;
        }
        if self.send_message(&input).await {
            self.composer.take();
        }
    }
}
