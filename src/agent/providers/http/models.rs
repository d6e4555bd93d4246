//! AG-UI 協定的請求與事件結構。

use serde::{Deserialize, Serialize};

use crate::agent::message::{AgentEventKind, ChatMessage};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentInput<'a> {
    pub thread_id: &'a str,
    pub run_id: &'a str,
    pub state: serde_json::Value,
    pub messages: &'a [ChatMessage],
    pub tools: Vec<serde_json::Value>,
    pub context: Vec<serde_json::Value>,
    pub forwarded_props: serde_json::Value,
}

/// 串流中的單一事件。未知的事件類型以 `Unknown` 表示並被忽略。
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgUiEvent {
    #[serde(rename_all = "camelCase")]
    RunStarted {
        #[serde(default)]
        run_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RunFinished {
        #[serde(default)]
        run_id: Option<String>,
    },
    RunError {
        message: String,
        #[serde(default)]
        code: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    TextMessageStart { message_id: String },
    #[serde(rename_all = "camelCase")]
    TextMessageContent { message_id: String, delta: String },
    #[serde(rename_all = "camelCase")]
    TextMessageEnd { message_id: String },
    #[serde(rename_all = "camelCase")]
    TextMessageChunk {
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        delta: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ToolCallStart {
        tool_call_id: String,
        tool_call_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCallArgs { tool_call_id: String, delta: String },
    #[serde(rename_all = "camelCase")]
    ToolCallEnd { tool_call_id: String },
    #[serde(other)]
    Unknown,
}

impl AgUiEvent {
    /// 轉換為主控台內部事件；不需處理的事件回傳 `None`。
    pub fn into_kind(self) -> Option<AgentEventKind> {
        Some(match self {
            AgUiEvent::RunStarted { .. } => AgentEventKind::RunStarted,
            AgUiEvent::RunFinished { .. } => AgentEventKind::RunFinished,
            AgUiEvent::RunError { message, code } => match code {
                Some(code) => AgentEventKind::Error(format!("{message} ({code})")),
                None => AgentEventKind::Error(message),
            },
            AgUiEvent::TextMessageStart { message_id } => AgentEventKind::TextStart { message_id },
            AgUiEvent::TextMessageContent { message_id, delta } => {
                AgentEventKind::TextDelta { message_id, delta }
            }
            AgUiEvent::TextMessageEnd { message_id } => AgentEventKind::TextEnd { message_id },
            AgUiEvent::TextMessageChunk { message_id, delta } => AgentEventKind::TextDelta {
                message_id: message_id.unwrap_or_default(),
                delta: delta?,
            },
            AgUiEvent::ToolCallStart {
                tool_call_id,
                tool_call_name,
            } => AgentEventKind::ToolCallStart {
                tool_call_id,
                name: tool_call_name,
            },
            AgUiEvent::ToolCallArgs { tool_call_id, delta } => {
                AgentEventKind::ToolCallArgs { tool_call_id, delta }
            }
            AgUiEvent::ToolCallEnd { tool_call_id } => AgentEventKind::ToolCallEnd { tool_call_id },
            AgUiEvent::Unknown => return None,
        })
    }
}
