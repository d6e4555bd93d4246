use log::{debug, info};

use super::App;
use crate::agent::{AgentDescriptor, DirectoryLoader};

impl App {
    /// Called on every tick of the event loop.
    ///
    /// Drains finished background work: the agent directory fetch and any
    /// events streamed back by the agent backend.
    pub(crate) fn on_tick(&mut self) {
        let loaded = self
            .directory_loader
            .as_mut()
            .and_then(DirectoryLoader::try_recv);
        if let Some(agents) = loaded {
            self.directory_loader = None;
            self.apply_agent_directory(agents);
        }

        let applied = self.bridge.poll();
        if applied > 0 {
            debug!("Applied {applied} agent events");
        }
    }

    /// Installs a freshly loaded agent list.
    ///
    /// The first non-empty list seeds the store with one conversation for the
    /// first agent; later lists only replace the agents.
    pub(crate) fn apply_agent_directory(&mut self, agents: Vec<AgentDescriptor>) {
        if !self.agents_initialized
            && let Some(first) = agents.first()
        {
            info!("Seeding first agent {} ({})", first.name, first.id);
            self.conversations.seed(&first.id);
            self.agents_initialized = true;
        }

        self.status_message = match agents.len() {
            0 => String::from("Backend reported no agents"),
            1 => String::from("Loaded 1 agent"),
            count => format!("Loaded {count} agents"),
        };
        self.agents = agents;
        self.clamp_sidebar_selection();
    }
}
