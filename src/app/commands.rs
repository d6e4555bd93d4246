use log::{error, info};

use super::App;
use crate::config::StandaloneConfig;

const HELP_TEXT: &str = "\
/new                               start a new chat with the active agent
/config                            show the LangGraph deployment settings
/config save <url> <assistant> [key]  store deployment settings
/clear                             clear the screen (the agent keeps the history)
/quit                              exit
Tab focus sidebar/input · Ctrl+N new chat · PgUp/PgDn scroll · Ctrl+Q quit";

impl App {
    /// Runs a `/command` typed into the composer.
    pub(crate) fn execute_command(&mut self, input: &str) {
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        info!("Running command {command}");

        match (command, args.as_slice()) {
            ("/help", _) => self.notify("Commands", HELP_TEXT),
            ("/new", _) => self.new_conversation(),
            ("/quit", _) => self.should_quit = true,
            ("/clear", _) => self.clear_transcript(),
            ("/config", []) => self.show_config(),
            ("/config", ["save", url, assistant, rest @ ..]) if rest.len() <= 1 => {
                let config = StandaloneConfig {
                    deployment_url: url.to_string(),
                    assistant_id: assistant.to_string(),
                    langsmith_api_key: rest.first().map(|key| key.to_string()),
                };
                self.save_config(config);
            }
            ("/config", _) => {
                self.status_message = String::from("Usage: /config save <url> <assistant> [key]");
            }
            (other, _) => {
                self.status_message = format!("Unknown command {other}, try /help");
            }
        }
    }

    /// Shows a notice in the active transcript, or in the status bar when no
    /// conversation is open.
    fn notify(&mut self, title: &str, detail: impl Into<String>) {
        match self.active_thread_id().map(str::to_string) {
            Some(thread_id) => {
                self.bridge.transcript_mut(&thread_id).push_info(title, detail);
                self.status_message = title.to_string();
            }
            None => self.status_message = format!("{title}: {}", detail.into()),
        }
    }

    fn clear_transcript(&mut self) {
        let Some(thread_id) = self.active_thread_id().map(str::to_string) else {
            self.status_message = String::from("No conversation to clear");
            return;
        };
        self.bridge.transcript_mut(&thread_id).clear();
        self.transcript_scroll = 0;
        self.status_message = String::from("Transcript cleared");
    }

    fn show_config(&mut self) {
        let detail = match self.config.get_config() {
            Some(config) => {
                let key = config
                    .masked_api_key()
                    .unwrap_or_else(|| String::from("(none)"));
                format!(
                    "deployment: {}\nassistant: {}\nLangSmith key: {}",
                    config.deployment_url, config.assistant_id, key
                )
            }
            None if self.config.has_storage() => String::from(
                "Not configured. Use /config save <url> <assistant> [key] \
                 or set NEXT_PUBLIC_LANGGRAPH_API_URL and NEXT_PUBLIC_LANGGRAPH_ASSISTANT_ID.",
            ),
            None => String::from("Not available without local storage."),
        };
        self.notify("Deployment config", detail);
    }

    fn save_config(&mut self, config: StandaloneConfig) {
        if !self.config.has_storage() {
            self.status_message = String::from("No local storage, config not saved");
            return;
        }
        match self.config.save_config(&config) {
            Ok(()) => {
                info!("Saved deployment config for assistant {}", config.assistant_id);
                self.status_message = format!("Saved config for {}", config.assistant_id);
            }
            Err(err) => {
                error!("Failed to save deployment config: {err}");
                self.status_message = format!("Failed to save config: {err}");
            }
        }
    }
}
