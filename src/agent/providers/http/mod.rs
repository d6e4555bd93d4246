use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Client;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::agent::{AgentEvent, AgentEventKind, AgentRequest};

use super::AgentBackend;

mod models;
mod sse;

pub use models::AgUiEvent;
pub use sse::SseDecoder;

/// 代理執行端點相對於後端位址的固定路徑。
pub const RUNTIME_PATH: &str = "/";

pub const HEADER_AGENT_ID: &str = "x-agent-id";
pub const HEADER_THREAD_ID: &str = "x-thread-id";

/// 透過 AG-UI HTTP 串流協定與 agent-core 通訊的後端。
pub struct AgUiBackend {
    /// 執行端點的完整位址。
    endpoint: String,
    /// `reqwest` 的非同步 HTTP 客戶端。
    client: Client,
    /// 非同步任務透過此通道把事件送回 UI 執行緒。
    events_tx: UnboundedSender<AgentEvent>,
    /// `poll_event` 從這裡取出事件。
    events_rx: UnboundedReceiver<AgentEvent>,
}

impl AgUiBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RUNTIME_PATH),
            client,
            events_tx: tx,
            events_rx: rx,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentBackend for AgUiBackend {
    fn name(&self) -> &str {
        "agent-core"
    }

    /// 立即回傳；實際的 HTTP 請求在另一個 tokio 任務中進行，
    /// 結果與錯誤都透過事件通道送回。
    async fn send(&mut self, request: AgentRequest) -> Result<()> {
        let tx = self.events_tx.clone();
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            let thread_id = request.thread_id.clone();
            if let Err(err) = dispatch_run(&client, &endpoint, request, &tx).await {
                warn!("Agent run on thread {thread_id} failed: {err:#}");
                let _ = tx.send(AgentEvent::new(
                    thread_id.clone(),
                    AgentEventKind::Error(format!("{err:#}")),
                ));
                let _ = tx.send(AgentEvent::new(thread_id, AgentEventKind::RunFinished));
            }
        });
        Ok(())
    }

    fn poll_event(&mut self) -> Option<AgentEvent> {
        self.events_rx.try_recv().ok()
    }
}

fn build_headers(request: &AgentRequest) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers.insert(
        HEADER_AGENT_ID,
        HeaderValue::from_str(&request.agent_id).context("代理 ID 不是合法的標頭值")?,
    );
    headers.insert(
        HEADER_THREAD_ID,
        HeaderValue::from_str(&request.thread_id).context("執行緒 ID 不是合法的標頭值")?,
    );
    Ok(headers)
}

/// 送出一次執行並把串流事件轉送到通道。
async fn dispatch_run(
    client: &Client,
    endpoint: &str,
    request: AgentRequest,
    tx: &UnboundedSender<AgentEvent>,
) -> Result<()> {
    let payload = models::RunAgentInput {
        thread_id: &request.thread_id,
        run_id: &request.run_id,
        state: serde_json::json!({}),
        messages: &request.messages,
        tools: Vec::new(),
        context: Vec::new(),
        forwarded_props: serde_json::json!({}),
    };

    let response = client
        .post(endpoint)
        .headers(build_headers(&request)?)
        .json(&payload)
        .send()
        .await
        .context("代理執行請求失敗")?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(anyhow!("代理回應錯誤 {}: {}", status, text.trim()));
    }

    let thread_id = request.thread_id;
    let mut decoder = SseDecoder::new();
    let mut finished = false;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("讀取代理串流失敗")?;
        for data in decoder.feed(&chunk) {
            finished |= forward_event(&thread_id, &data, tx);
        }
    }
    if let Some(data) = decoder.finish() {
        finished |= forward_event(&thread_id, &data, tx);
    }

    if !finished {
        debug!("Stream for thread {thread_id} ended without RUN_FINISHED");
        let _ = tx.send(AgentEvent::new(thread_id, AgentEventKind::RunFinished));
    }
    Ok(())
}

/// 解析一個事件並送出；回傳此事件是否結束了執行。
fn forward_event(thread_id: &str, data: &str, tx: &UnboundedSender<AgentEvent>) -> bool {
    let event = match serde_json::from_str::<AgUiEvent>(data) {
        Ok(event) => event,
        Err(err) => {
            debug!("Skipping undecodable agent event ({err}): {data}");
            return false;
        }
    };
    let Some(kind) = event.into_kind() else {
        return false;
    };
    let terminal = matches!(kind, AgentEventKind::RunFinished | AgentEventKind::Error(_));
    let _ = tx.send(AgentEvent::new(thread_id, kind));
    terminal
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::agent::ChatMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn collect_until_finished(backend: &mut AgUiBackend) -> Vec<AgentEventKind> {
        let mut kinds = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            while let Some(event) = backend.poll_event() {
                let done = event.kind == AgentEventKind::RunFinished;
                kinds.push(event.kind);
                if done {
                    return kinds;
                }
            }
            assert!(tokio::time::Instant::now() < deadline, "run never finished: {kinds:?}");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn sse_body(events: &[&str]) -> String {
        events.iter().map(|event| format!("data: {event}\n\n")).collect()
    }

    #[tokio::test]
    async fn streams_text_events_with_routing_headers() {
        let server = MockServer::start().await;
        let body = sse_body(&[
            r#"{"type":"RUN_STARTED","threadId":"t-1","runId":"r"}"#,
            r#"{"type":"TEXT_MESSAGE_START","messageId":"m1","role":"assistant"}"#,
            r#"{"type":"TEXT_MESSAGE_CONTENT","messageId":"m1","delta":"Hello"}"#,
            r#"{"type":"TEXT_MESSAGE_CONTENT","messageId":"m1","delta":" there"}"#,
            r#"{"type":"TEXT_MESSAGE_END","messageId":"m1"}"#,
            r#"{"type":"RUN_FINISHED","threadId":"t-1","runId":"r"}"#,
        ]);
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-agent-id", "a1"))
            .and(header("x-thread-id", "t-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut backend = AgUiBackend::new(&server.uri());
        backend
            .send(AgentRequest::new("a1", "t-1", vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        let kinds = collect_until_finished(&mut backend).await;
        assert_eq!(
            kinds,
            vec![
                AgentEventKind::RunStarted,
                AgentEventKind::TextStart { message_id: "m1".into() },
                AgentEventKind::TextDelta { message_id: "m1".into(), delta: "Hello".into() },
                AgentEventKind::TextDelta { message_id: "m1".into(), delta: " there".into() },
                AgentEventKind::TextEnd { message_id: "m1".into() },
                AgentEventKind::RunFinished,
            ]
        );
    }

    #[tokio::test]
    async fn non_success_status_becomes_error_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("agent exploded"))
            .mount(&server)
            .await;

        let mut backend = AgUiBackend::new(&format!("{}/", server.uri()));
        backend
            .send(AgentRequest::new("a1", "t-2", vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        let kinds = collect_until_finished(&mut backend).await;
        assert_eq!(kinds.len(), 2);
        match &kinds[0] {
            AgentEventKind::Error(message) => {
                assert!(message.contains("500"), "{message}");
                assert!(message.contains("agent exploded"), "{message}");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_without_run_finished_still_finishes() {
        let server = MockServer::start().await;
        let body = format!(
            "{}data: not json\n\ndata: {}",
            sse_body(&[r#"{"type":"TEXT_MESSAGE_CONTENT","messageId":"m1","delta":"partial"}"#]),
            r#"{"type":"STATE_DELTA","delta":[]}"#
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let mut backend = AgUiBackend::new(&server.uri());
        backend
            .send(AgentRequest::new("a1", "t-3", vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        let kinds = collect_until_finished(&mut backend).await;
        assert_eq!(
            kinds,
            vec![
                AgentEventKind::TextDelta { message_id: "m1".into(), delta: "partial".into() },
                AgentEventKind::RunFinished,
            ]
        );
    }

    #[test]
    fn endpoint_joins_runtime_path_once() {
        let backend = AgUiBackend::new("http://127.0.0.1:8000/");
        assert_eq!(backend.endpoint(), "http://127.0.0.1:8000/");
        let backend = AgUiBackend::new("http://127.0.0.1:8000");
        assert_eq!(backend.endpoint(), "http://127.0.0.1:8000/");
    }
}
