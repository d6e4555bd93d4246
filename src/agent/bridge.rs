use std::collections::HashMap;

use anyhow::Result;
use log::{debug, error};

use super::message::{AgentRequest, ChatMessage};
use super::providers::AgentBackend;
use super::session::Transcript;

/// Forwards chat messages to the agent backend and keeps one transcript per thread.
///
/// The bridge owns message state; the conversation store only knows which
/// thread belongs to which conversation.
pub struct ChatBridge {
    backend: Box<dyn AgentBackend>,
    transcripts: HashMap<String, Transcript>,
}

impl ChatBridge {
    pub fn new(backend: Box<dyn AgentBackend>) -> Self {
        Self {
            backend,
            transcripts: HashMap::new(),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn transcript(&self, thread_id: &str) -> Option<&Transcript> {
        self.transcripts.get(thread_id)
    }

    pub fn transcript_mut(&mut self, thread_id: &str) -> &mut Transcript {
        self.transcripts.entry(thread_id.to_string()).or_default()
    }

    pub fn is_running(&self, thread_id: &str) -> bool {
        self.transcripts
            .get(thread_id)
            .is_some_and(Transcript::is_running)
    }

    /// Records the user message and starts a run with the full thread history.
    pub async fn send_message(&mut self, agent_id: &str, thread_id: &str, text: &str) -> Result<()> {
        let transcript = self.transcripts.entry(thread_id.to_string()).or_default();
        transcript.push_user(ChatMessage::user(text));
        let request = AgentRequest::new(agent_id, thread_id, transcript.history());
        debug!(
            "Sending run {} to agent {} on thread {} ({} messages)",
            request.run_id,
            agent_id,
            thread_id,
            request.messages.len()
        );

        if let Err(err) = self.backend.send(request).await {
            error!("Failed to send message on thread {thread_id}: {err:#}");
            let transcript = self.transcript_mut(thread_id);
            transcript.push_error("Send failed", format!("{err:#}"));
            transcript.apply(super::AgentEventKind::RunFinished);
            return Err(err);
        }
        Ok(())
    }

    /// Applies every pending backend event. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.backend.poll_event() {
            self.transcripts
                .entry(event.thread_id)
                .or_default()
                .apply(event.kind);
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::*;
    use crate::agent::message::ChatRole;
    use crate::agent::session::TranscriptEntry;
    use crate::agent::{AgentEvent, AgentEventKind};

    /// Backend that records requests and replays queued events.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedBackend {
        pub requests: Arc<Mutex<Vec<AgentRequest>>>,
        pub events: Arc<Mutex<VecDeque<AgentEvent>>>,
        pub fail_sends: bool,
    }

    impl ScriptedBackend {
        pub fn queue(&self, thread_id: &str, kind: AgentEventKind) {
            self.events
                .lock()
                .unwrap()
                .push_back(AgentEvent::new(thread_id, kind));
        }

        pub fn sent(&self) -> Vec<AgentRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&mut self, request: AgentRequest) -> Result<()> {
            if self.fail_sends {
                return Err(anyhow!("backend offline"));
            }
            self.requests.lock().unwrap().push(request);
            Ok(())
        }

        fn poll_event(&mut self) -> Option<AgentEvent> {
            self.events.lock().unwrap().pop_front()
        }
    }

    #[tokio::test]
    async fn send_message_carries_agent_thread_and_history() {
        let backend = ScriptedBackend::default();
        let mut bridge = ChatBridge::new(Box::new(backend.clone()));

        bridge.send_message("a1", "t1", "first").await.unwrap();
        backend.queue("t1", AgentEventKind::TextDelta { message_id: "m1".into(), delta: "ok".into() });
        backend.queue("t1", AgentEventKind::RunFinished);
        assert_eq!(bridge.poll(), 2);
        assert!(!bridge.is_running("t1"));

        bridge.send_message("a1", "t1", "second").await.unwrap();
        assert!(bridge.is_running("t1"));

        let sent = backend.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].agent_id, "a1");
        assert_eq!(sent[1].thread_id, "t1");
        let roles: Vec<ChatRole> = sent[1].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
        assert_eq!(sent[1].messages[2].content, "second");
        assert_ne!(sent[0].run_id, sent[1].run_id);
    }

    #[tokio::test]
    async fn events_are_routed_to_their_own_thread() {
        let backend = ScriptedBackend::default();
        let mut bridge = ChatBridge::new(Box::new(backend.clone()));
        bridge.send_message("a1", "t1", "one").await.unwrap();
        bridge.send_message("a2", "t2", "two").await.unwrap();

        backend.queue("t2", AgentEventKind::TextDelta { message_id: "m2".into(), delta: "for two".into() });
        bridge.poll();

        assert_eq!(bridge.transcript("t1").unwrap().entries().len(), 1);
        let t2 = bridge.transcript("t2").unwrap();
        assert!(matches!(
            t2.entries().last(),
            Some(TranscriptEntry::Assistant { text, .. }) if text == "for two"
        ));
    }

    #[tokio::test]
    async fn failed_send_is_recorded_and_returned() {
        let backend = ScriptedBackend {
            fail_sends: true,
            ..ScriptedBackend::default()
        };
        let mut bridge = ChatBridge::new(Box::new(backend));

        assert!(bridge.send_message("a1", "t1", "hello").await.is_err());
        let transcript = bridge.transcript("t1").unwrap();
        assert!(!transcript.is_running());
        assert!(matches!(
            transcript.entries().last(),
            Some(TranscriptEntry::Error { detail, .. }) if detail.contains("backend offline")
        ));
    }
}
