//! `app` 模組是主控台的核心。
//!
//! 它負責管理整體狀態、處理鍵盤輸入，並把使用者操作轉成對話儲存區與
//! 聊天橋接層上的具名操作。

/// `agent` 模組：選擇代理與對話、開新對話、送出訊息。
mod agent;
/// `commands` 模組：輸入框中的斜線指令（`/help`、`/config` 等）。
mod commands;
/// `init` 模組：負責 `App` 結構的初始化。
mod init;
/// `keyboard` 模組：專門處理所有的鍵盤輸入事件。
mod keyboard;
/// `sidebar` 模組：側邊欄的扁平化項目與游標移動。
mod sidebar;
/// `state` 模組：定義了 `App` 結構以及輸入框狀態。
mod state;
/// `tick` 模組：處理定時更新，收取背景工作的結果。
mod tick;

pub use init::AppParts;
pub use state::{App, ChatComposer, SidebarItem};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{App, AppParts};
    use crate::agent::bridge::tests::ScriptedBackend;
    use crate::agent::{AgentDescriptor, ChatBridge};
    use crate::config::ConfigResolver;
    use crate::config::env::MapEnv;
    use crate::config::storage::MemoryStore;

    pub fn agent(id: &str, name: &str, description: &str) -> AgentDescriptor {
        AgentDescriptor {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// An app wired to a scripted backend, in-memory storage and an empty environment.
    pub fn test_app() -> (App, ScriptedBackend) {
        let _ = env_logger::builder().is_test(true).try_init();
        let backend = ScriptedBackend::default();
        let app = App::from_parts(AppParts {
            workspace_root: PathBuf::from("."),
            backend_url: String::from("http://127.0.0.1:8000"),
            config: ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(MapEnv::new())),
            bridge: ChatBridge::new(Box::new(backend.clone())),
            directory_loader: None,
            tick_rate: Duration::from_millis(100),
        });
        (app, backend)
    }
}
