use serde::{Deserialize, Serialize};

/// 對話中訊息的角色。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// 送往代理的一則歷史訊息。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 代表一次送往代理的執行請求。
///
/// `agent_id` 與 `thread_id` 會以 `x-agent-id`、`x-thread-id` 標頭傳送，
/// `messages` 則是該執行緒到目前為止的完整歷史（含本次使用者訊息）。
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub agent_id: String,
    pub thread_id: String,
    pub run_id: String,
    pub messages: Vec<ChatMessage>,
}

impl AgentRequest {
    pub fn new(agent_id: impl Into<String>, thread_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            agent_id: agent_id.into(),
            thread_id: thread_id.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
            messages,
        }
    }
}

/// 後端回傳、屬於某個執行緒的事件。
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEvent {
    pub thread_id: String,
    pub kind: AgentEventKind,
}

impl AgentEvent {
    pub fn new(thread_id: impl Into<String>, kind: AgentEventKind) -> Self {
        Self {
            thread_id: thread_id.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEventKind {
    /// 後端已開始處理此次執行。
    RunStarted,
    /// 代理開始一則新的回覆。
    TextStart { message_id: String },
    /// 回覆的串流片段。
    TextDelta { message_id: String, delta: String },
    TextEnd { message_id: String },
    /// 代理呼叫了工具。
    ToolCallStart { tool_call_id: String, name: String },
    ToolCallArgs { tool_call_id: String, delta: String },
    ToolCallEnd { tool_call_id: String },
    /// 執行失敗（HTTP 錯誤、連線中斷或後端回報的錯誤）。
    Error(String),
    RunFinished,
}
