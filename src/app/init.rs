use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};

use super::{App, ChatComposer};
use crate::agent::providers::http::AgUiBackend;
use crate::agent::{AgentDirectory, ChatBridge, DirectoryLoader};
use crate::config::{ConfigResolver, ConsoleSettings, FileStore, ProcessEnv};
use crate::conversation::ConversationStore;
use crate::definitions::FocusArea;

/// Collaborators an [`App`] is assembled from.
pub struct AppParts {
    pub workspace_root: PathBuf,
    pub backend_url: String,
    pub config: ConfigResolver,
    pub bridge: ChatBridge,
    pub directory_loader: Option<DirectoryLoader>,
    pub tick_rate: Duration,
}

impl App {
    /// Creates the application for `workspace_root`.
    ///
    /// Resolves the backend URL, wires the file-backed storage and the process
    /// environment into the config resolver, and starts the agent directory
    /// fetch in the background. Must be called inside a tokio runtime.
    pub fn new(workspace_root: PathBuf, settings: &ConsoleSettings) -> Self {
        let canonical_root = workspace_root.canonicalize().unwrap_or(workspace_root);
        debug!("Initializing App with workspace: {}", canonical_root.display());

        let backend_url = settings.backend_base_url(&ProcessEnv);
        info!("Using agent-core at {backend_url}");

        let config = ConfigResolver::new(
            Some(Box::new(FileStore::in_workspace(&canonical_root))),
            Box::new(ProcessEnv),
        );
        let bridge = ChatBridge::new(Box::new(AgUiBackend::new(&backend_url)));
        let directory_loader = DirectoryLoader::spawn(AgentDirectory::new(&backend_url));

        Self::from_parts(AppParts {
            workspace_root: canonical_root,
            backend_url,
            config,
            bridge,
            directory_loader: Some(directory_loader),
            tick_rate: settings.tick_rate(),
        })
    }

    pub fn from_parts(parts: AppParts) -> Self {
        Self {
            should_quit: false,
            focus: FocusArea::Composer,
            agents: Vec::new(),
            agents_initialized: false,
            conversations: ConversationStore::new(),
            composer: ChatComposer::new(),
            sidebar_selected: 0,
            transcript_scroll: 0,
            status_message: String::from("Loading agents... Tab switches focus, Ctrl+Q quits"),
            workspace_root: parts.workspace_root,
            backend_url: parts.backend_url,
            config: parts.config,
            tick_rate: parts.tick_rate,
            bridge: parts.bridge,
            directory_loader: parts.directory_loader,
        }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Withdraws interest in any pending background work.
    pub fn shutdown(&mut self) {
        if let Some(loader) = self.directory_loader.take() {
            loader.cancel();
        }
    }
}
