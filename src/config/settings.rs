use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::env::EnvSource;

/// 伺服器端專用的後端位址變數，優先於公開變數。
pub const ENV_AGENT_CORE_URL: &str = "AGENT_CORE_URL";
/// 與網頁前端共用的公開後端位址變數。
pub const ENV_PUBLIC_AGENT_CORE_URL: &str = "NEXT_PUBLIC_AGENT_CORE_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("讀取主控台設定失敗: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析主控台設定失敗: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 主控台設定，對應 `config/console.toml`。所有欄位皆可省略。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    /// agent-core 的基礎位址，例如 `http://127.0.0.1:8000`。
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

fn default_tick_rate_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 相對路徑以工作區根目錄為基準。
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/amy-console.log")
}

impl ConsoleSettings {
    /// 從工作區讀取 `config/console.toml`；檔案不存在時使用預設值。
    pub fn load(workspace_root: &Path) -> Result<Self, SettingsError> {
        let path = workspace_root.join("config/console.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| SettingsError::Parse { path, source })
    }

    /// 解析後端位址，順序：`AGENT_CORE_URL` > `NEXT_PUBLIC_AGENT_CORE_URL` > 設定檔 > 預設值。
    /// 結尾的 `/` 會被移除，方便之後組合路徑。
    pub fn backend_base_url(&self, env: &dyn EnvSource) -> String {
        let url = env
            .var(ENV_AGENT_CORE_URL)
            .or_else(|| env.var(ENV_PUBLIC_AGENT_CORE_URL))
            .or_else(|| {
                self.backend
                    .base_url
                    .clone()
                    .filter(|url| !url.trim().is_empty())
            })
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(10))
    }

    pub fn log_file(&self, workspace_root: &Path) -> PathBuf {
        if self.logging.file.is_relative() {
            workspace_root.join(&self.logging.file)
        } else {
            self.logging.file.clone()
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.logging
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}
