#[cfg(test)]
use std::collections::BTreeMap;

/// 環境變數的唯讀來源。
///
/// 正式執行時讀取行程環境；測試時以固定的對照表替代，避免修改全域環境。
pub trait EnvSource {
    /// 讀取變數；未設定或為空字串時回傳 `None`。
    fn var(&self, name: &str) -> Option<String>;
}

/// 讀取目前行程的環境變數。
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .filter(|value| !value.is_empty())
    }
}

/// 以記憶體中的對照表模擬環境變數。
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

#[cfg(test)]
impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}
