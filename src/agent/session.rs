use super::message::{AgentEventKind, ChatMessage, ChatRole};

/// 對話紀錄中單一可顯示的條目。
///
/// 使用者訊息、代理回覆、工具呼叫與系統訊息統一為一個類型，簡化渲染邏輯。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// 使用者送出的訊息。
    User(ChatMessage),
    /// 代理的回覆；`streaming` 為真表示仍在接收片段。
    Assistant {
        message_id: String,
        text: String,
        streaming: bool,
    },
    /// 代理呼叫的工具與累積的參數。
    ToolCall {
        tool_call_id: String,
        name: String,
        args: String,
        done: bool,
    },
    Info { title: String, detail: String },
    Error { title: String, detail: String },
}

/// 單一執行緒的完整對話紀錄。
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    /// 在此索引之前的條目已從畫面清除，但仍屬於送往代理的歷史。
    cleared_at: usize,
    running: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前可顯示的條目（最後一次 `clear` 之後）。
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries[self.cleared_at..]
    }

    /// 是否有執行正在進行中。
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// 加入使用者訊息並標記執行開始。
    pub fn push_user(&mut self, message: ChatMessage) {
        self.entries.push(TranscriptEntry::User(message));
        self.running = true;
    }

    pub fn push_info(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(TranscriptEntry::Info {
            title: title.into(),
            detail: detail.into(),
        });
    }

    pub fn push_error(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(TranscriptEntry::Error {
            title: title.into(),
            detail: detail.into(),
        });
    }

    /// 清除畫面上的條目；執行緒的歷史不受影響。
    pub fn clear(&mut self) {
        self.cleared_at = self.entries.len();
    }

    /// 送往代理的訊息歷史：只包含使用者訊息與有內容的代理回覆，
    /// 包括已從畫面清除的部分。
    pub fn history(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::User(message) => Some(message.clone()),
                TranscriptEntry::Assistant {
                    message_id, text, ..
                } if !text.is_empty() => Some(ChatMessage {
                    id: message_id.clone(),
                    role: ChatRole::Assistant,
                    content: text.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// 套用一個後端事件。
    pub fn apply(&mut self, kind: AgentEventKind) {
        match kind {
            AgentEventKind::RunStarted => self.running = true,
            AgentEventKind::TextStart { message_id } => {
                self.entries.push(TranscriptEntry::Assistant {
                    message_id,
                    text: String::new(),
                    streaming: true,
                });
            }
            AgentEventKind::TextDelta { message_id, delta } => {
                if let Some(text) = self.assistant_text_mut(&message_id) {
                    text.push_str(&delta);
                } else {
                    self.entries.push(TranscriptEntry::Assistant {
                        message_id,
                        text: delta,
                        streaming: true,
                    });
                }
            }
            AgentEventKind::TextEnd { message_id } => {
                for entry in self.entries.iter_mut().rev() {
                    if let TranscriptEntry::Assistant {
                        message_id: id,
                        streaming,
                        ..
                    } = entry
                        && *id == message_id
                    {
                        *streaming = false;
                        break;
                    }
                }
            }
            AgentEventKind::ToolCallStart { tool_call_id, name } => {
                self.entries.push(TranscriptEntry::ToolCall {
                    tool_call_id,
                    name,
                    args: String::new(),
                    done: false,
                });
            }
            AgentEventKind::ToolCallArgs { tool_call_id, delta } => {
                if let Some(TranscriptEntry::ToolCall { args, .. }) =
                    self.tool_call_mut(&tool_call_id)
                {
                    args.push_str(&delta);
                }
            }
            AgentEventKind::ToolCallEnd { tool_call_id } => {
                if let Some(TranscriptEntry::ToolCall { done, .. }) =
                    self.tool_call_mut(&tool_call_id)
                {
                    *done = true;
                }
            }
            AgentEventKind::Error(message) => {
                self.push_error("Agent error", message);
                self.finish_run();
            }
            AgentEventKind::RunFinished => self.finish_run(),
        }
    }

    fn finish_run(&mut self) {
        self.running = false;
        for entry in &mut self.entries {
            if let TranscriptEntry::Assistant { streaming, .. } = entry {
                *streaming = false;
            }
        }
    }

    /// 最近一則仍在串流的同 ID 回覆。
    fn assistant_text_mut(&mut self, message_id: &str) -> Option<&mut String> {
        self.entries.iter_mut().rev().find_map(|entry| match entry {
            TranscriptEntry::Assistant {
                message_id: id,
                text,
                streaming: true,
            } if id == message_id => Some(text),
            _ => None,
        })
    }

    fn tool_call_mut(&mut self, tool_call_id: &str) -> Option<&mut TranscriptEntry> {
        self.entries.iter_mut().rev().find(|entry| {
            matches!(entry, TranscriptEntry::ToolCall { tool_call_id: id, .. } if id == tool_call_id)
        })
    }
}
