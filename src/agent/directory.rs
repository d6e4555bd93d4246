use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// An agent exposed by the backend's `/agents` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl AgentDescriptor {
    /// Single upper-case letter shown as the agent's avatar.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|ch| ch.to_uppercase().collect())
            .unwrap_or_else(|| String::from("?"))
    }
}

#[derive(Debug, Deserialize)]
struct AgentsPayload {
    #[serde(default)]
    agents: Vec<AgentDescriptor>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("agent directory request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("agent directory at {url} returned an unreadable body: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Client for `GET {base_url}/agents`.
#[derive(Debug, Clone)]
pub struct AgentDirectory {
    agents_url: String,
    client: Client,
}

impl AgentDirectory {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            agents_url: format!("{}/agents", base_url.trim_end_matches('/')),
            client,
        }
    }

    pub fn agents_url(&self) -> &str {
        &self.agents_url
    }

    /// Fetches the agent list. A non-success status is not an error: it
    /// resolves to `Ok(None)`, meaning "no agents yet".
    pub async fn fetch(&self) -> Result<Option<Vec<AgentDescriptor>>, DirectoryError> {
        let response = self
            .client
            .get(&self.agents_url)
            .send()
            .await
            .map_err(|source| DirectoryError::Request {
                url: self.agents_url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            debug!(
                "Agent directory {} answered {}, treating as empty",
                self.agents_url,
                response.status()
            );
            return Ok(None);
        }

        let payload: AgentsPayload =
            response
                .json()
                .await
                .map_err(|source| DirectoryError::Decode {
                    url: self.agents_url.clone(),
                    source,
                })?;
        Ok(Some(payload.agents))
    }
}

/// Background load of the agent directory.
///
/// The result is handed over only while the loader is still interested;
/// [`DirectoryLoader::cancel`] (or dropping the loader) withdraws interest, and
/// a response arriving afterwards is discarded.
pub struct DirectoryLoader {
    interested: Arc<AtomicBool>,
    rx: UnboundedReceiver<Vec<AgentDescriptor>>,
}

impl DirectoryLoader {
    pub fn spawn(directory: AgentDirectory) -> Self {
        let interested = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::unbounded_channel();
        let flag = Arc::clone(&interested);
        tokio::spawn(async move {
            match directory.fetch().await {
                Ok(Some(agents)) => {
                    if !flag.load(Ordering::Acquire) {
                        debug!("Agent directory loaded after teardown, discarding");
                        return;
                    }
                    debug!("Loaded {} agents from {}", agents.len(), directory.agents_url());
                    let _ = tx.send(agents);
                }
                Ok(None) => {}
                Err(err) => warn!("Failed to load agents: {err}"),
            }
        });
        Self { interested, rx }
    }

    /// Returns the loaded agents once they arrive.
    pub fn try_recv(&mut self) -> Option<Vec<AgentDescriptor>> {
        if !self.is_interested() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    pub fn is_interested(&self) -> bool {
        self.interested.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.interested.store(false, Ordering::Release);
    }
}

impl Drop for DirectoryLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_agents(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/agents"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetch_decodes_agent_list() {
        let server = MockServer::start().await;
        mount_agents(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "agents": [
                    {"id": "a1", "name": "Ava", "description": "x"},
                    {"id": "a2", "name": "bo"}
                ]
            })),
        )
        .await;

        let directory = AgentDirectory::new(&format!("{}/", server.uri()));
        let agents = directory.fetch().await.unwrap().unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(
            agents[0],
            AgentDescriptor {
                id: "a1".into(),
                name: "Ava".into(),
                description: "x".into()
            }
        );
        assert_eq!(agents[1].description, "");
        assert_eq!(agents[1].initial(), "B");
    }

    #[tokio::test]
    async fn missing_agents_field_is_an_empty_list() {
        let server = MockServer::start().await;
        mount_agents(&server, ResponseTemplate::new(200).set_body_json(serde_json::json!({}))).await;
        let agents = AgentDirectory::new(&server.uri()).fetch().await.unwrap();
        assert_eq!(agents, Some(Vec::new()));
    }

    #[tokio::test]
    async fn non_success_status_is_silently_empty() {
        let server = MockServer::start().await;
        mount_agents(&server, ResponseTemplate::new(503)).await;
        let agents = AgentDirectory::new(&server.uri()).fetch().await.unwrap();
        assert_eq!(agents, None);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        mount_agents(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;
        let result = AgentDirectory::new(&server.uri()).fetch().await;
        assert!(matches!(result, Err(DirectoryError::Decode { .. })));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        let result = AgentDirectory::new("http://127.0.0.1:9").fetch().await;
        assert!(matches!(result, Err(DirectoryError::Request { .. })));
    }

    #[tokio::test]
    async fn loader_delivers_agents_while_interested() {
        let server = MockServer::start().await;
        mount_agents(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"agents": [{"id": "a1", "name": "Ava", "description": "x"}]})),
        )
        .await;

        let mut loader = DirectoryLoader::spawn(AgentDirectory::new(&server.uri()));
        let mut received = None;
        for _ in 0..200 {
            if let Some(agents) = loader.try_recv() {
                received = Some(agents);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(received.unwrap()[0].id, "a1");
    }

    #[tokio::test]
    async fn cancelled_loader_never_delivers() {
        let server = MockServer::start().await;
        mount_agents(
            &server,
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_json(serde_json::json!({"agents": [{"id": "a1", "name": "Ava"}]})),
        )
        .await;

        let mut loader = DirectoryLoader::spawn(AgentDirectory::new(&server.uri()));
        loader.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!loader.is_interested());
        assert_eq!(loader.try_recv(), None);
    }
}
