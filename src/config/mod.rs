//! 主控台的設定來源。
//!
//! - `env`：環境變數來源的抽象。
//! - `storage`：本地持久化鍵值儲存（對應瀏覽器的 `localStorage`）。
//! - `standalone`：LangGraph 部署設定的解析與保存。
//! - `settings`：`config/console.toml` 主控台設定。

pub mod env;
pub mod settings;
pub mod standalone;
pub mod storage;

pub use env::{EnvSource, ProcessEnv};
pub use settings::ConsoleSettings;
pub use standalone::{ConfigResolver, StandaloneConfig};
pub use storage::{FileStore, KeyValueStore, StorageError};
