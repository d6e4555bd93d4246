//! `providers` 模組負責與代理後端通訊的具體實作。
//!
//! 目前只有 `http`：以 AG-UI 串流協定連線到 agent-core。

/// `http` 模組：透過 HTTP 串流（SSE）與 agent-core 通訊。
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::agent::{AgentEvent, AgentRequest};

/// 所有代理後端都必須遵守的通用介面。
#[async_trait]
pub trait AgentBackend: Send {
    /// 回傳此後端的名稱，用於 UI 顯示或日誌記錄。
    fn name(&self) -> &str;

    /// 非同步地送出一次執行請求。
    ///
    /// 實作不應等待代理回覆完成；回覆以事件形式經由 `poll_event` 取得。
    async fn send(&mut self, request: AgentRequest) -> Result<()>;

    /// 非阻塞地取出一個事件；沒有事件時立即回傳 `None`。
    fn poll_event(&mut self) -> Option<AgentEvent>;
}
