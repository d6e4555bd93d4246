//! 代理相關的資料結構與通訊。
//!
//! 包括代理清單的載入、訊息與事件格式、每個執行緒的對話紀錄，
//! 以及把聊天訊息轉送到後端的橋接層。

/// `bridge` 模組：`ChatBridge`，把使用者訊息送往後端並維護各執行緒的對話紀錄。
pub mod bridge;

/// `directory` 模組：從後端 `/agents` 載入代理清單。
pub mod directory;

/// `message` 模組：請求、歷史訊息與後端事件的格式。
pub mod message;

/// `providers` 模組：與代理後端通訊的具體實作。
pub mod providers;

/// `session` 模組：單一執行緒的對話紀錄 (`Transcript`)。
pub mod session;

pub use bridge::ChatBridge;
pub use directory::{AgentDescriptor, AgentDirectory, DirectoryLoader};
pub use message::{AgentEvent, AgentEventKind, AgentRequest, ChatMessage};
pub use session::{Transcript, TranscriptEntry};
