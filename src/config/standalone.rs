use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::env::EnvSource;
use super::storage::KeyValueStore;

/// 本地儲存中保存設定的固定鍵名。
pub const CONFIG_KEY: &str = "deep-agent-config";

pub const ENV_DEPLOYMENT_URL: &str = "NEXT_PUBLIC_LANGGRAPH_API_URL";
pub const ENV_ASSISTANT_ID: &str = "NEXT_PUBLIC_LANGGRAPH_ASSISTANT_ID";
pub const ENV_LANGSMITH_API_KEY: &str = "NEXT_PUBLIC_LANGSMITH_API_KEY";

/// 連線到 LangGraph 部署所需的設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneConfig {
    pub deployment_url: String,
    pub assistant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langsmith_api_key: Option<String>,
}

impl StandaloneConfig {
    /// 供畫面顯示的金鑰，只保留末四碼。
    pub fn masked_api_key(&self) -> Option<String> {
        self.langsmith_api_key.as_ref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 4 {
                "****".to_string()
            } else {
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{tail}")
            }
        })
    }
}

/// 依序從本地儲存與環境變數解析 `StandaloneConfig`。
///
/// `storage` 為 `None` 代表目前環境沒有持久化儲存，此時解析結果一律為 `None`，
/// 寫入亦不生效。
pub struct ConfigResolver {
    storage: Option<Box<dyn KeyValueStore>>,
    env: Box<dyn EnvSource>,
}

impl ConfigResolver {
    pub fn new(storage: Option<Box<dyn KeyValueStore>>, env: Box<dyn EnvSource>) -> Self {
        Self { storage, env }
    }

    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// 解析目前生效的設定，永不回傳錯誤。
    pub fn get_config(&self) -> Option<StandaloneConfig> {
        let storage = self.storage.as_ref()?;

        let stored = match storage.get_item(CONFIG_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                warn!("Failed to read stored config: {err}");
                None
            }
        };

        if let Some(raw) = stored.filter(|raw| !raw.is_empty()) {
            match serde_json::from_str::<StandaloneConfig>(&raw) {
                Ok(config) => return Some(config),
                Err(err) => {
                    debug!("Stored config under {CONFIG_KEY} is not decodable ({err}), using environment");
                }
            }
        }

        self.env_config()
    }

    /// 將設定序列化後寫入本地儲存；不做任何欄位驗證。
    pub fn save_config(&self, config: &StandaloneConfig) -> Result<(), super::StorageError> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(());
        };
        let serialized = serde_json::to_string(config)?;
        storage.set_item(CONFIG_KEY, &serialized)
    }

    fn env_config(&self) -> Option<StandaloneConfig> {
        let deployment_url = self.env.var(ENV_DEPLOYMENT_URL)?;
        let assistant_id = self.env.var(ENV_ASSISTANT_ID)?;
        Some(StandaloneConfig {
            deployment_url,
            assistant_id,
            langsmith_api_key: self.env.var(ENV_LANGSMITH_API_KEY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::MapEnv;
    use crate::config::storage::MemoryStore;

    fn full_env() -> MapEnv {
        MapEnv::new()
            .with(ENV_DEPLOYMENT_URL, "https://graph.example.com")
            .with(ENV_ASSISTANT_ID, "deep-agent")
    }

    fn env_result() -> StandaloneConfig {
        StandaloneConfig {
            deployment_url: "https://graph.example.com".into(),
            assistant_id: "deep-agent".into(),
            langsmith_api_key: None,
        }
    }

    #[test]
    fn without_storage_resolves_to_none_even_with_env() {
        let resolver = ConfigResolver::new(None, Box::new(full_env()));
        assert!(!resolver.has_storage());
        assert_eq!(resolver.get_config(), None);
    }

    #[test]
    fn save_without_storage_is_a_noop() {
        let resolver = ConfigResolver::new(None, Box::new(MapEnv::new()));
        assert!(resolver.save_config(&env_result()).is_ok());
        assert_eq!(resolver.get_config(), None);
    }

    #[test]
    fn falls_back_to_env_when_nothing_stored() {
        let resolver = ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(full_env()));
        assert_eq!(resolver.get_config(), Some(env_result()));
    }

    #[test]
    fn env_api_key_is_carried_when_set() {
        let env = full_env().with(ENV_LANGSMITH_API_KEY, "lsv2-secret");
        let resolver = ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(env));
        let config = resolver.get_config().unwrap();
        assert_eq!(config.langsmith_api_key.as_deref(), Some("lsv2-secret"));
    }

    #[test]
    fn malformed_stored_json_yields_exactly_the_env_result() {
        for garbage in ["{", "not json", "[1,2", "{\"deploymentUrl\":"] {
            let store = MemoryStore::new().with_item(CONFIG_KEY, garbage);
            let resolver = ConfigResolver::new(Some(Box::new(store)), Box::new(full_env()));
            assert_eq!(resolver.get_config(), Some(env_result()), "input: {garbage}");

            let store = MemoryStore::new().with_item(CONFIG_KEY, garbage);
            let resolver = ConfigResolver::new(Some(Box::new(store)), Box::new(MapEnv::new()));
            assert_eq!(resolver.get_config(), None, "input: {garbage}");
        }
    }

    #[test]
    fn stored_json_of_the_wrong_shape_falls_back_to_env() {
        let shapes = [
            "42",
            "{}",
            "[]",
            r#"{"deploymentUrl":"http://stored"}"#,
            r#"{"assistantId":"stored"}"#,
        ];
        for stored in shapes {
            let store = MemoryStore::new().with_item(CONFIG_KEY, stored);
            let resolver = ConfigResolver::new(Some(Box::new(store)), Box::new(full_env()));
            assert_eq!(resolver.get_config(), Some(env_result()), "stored: {stored}");
        }
    }

    #[test]
    fn missing_required_env_value_resolves_to_none() {
        let only_url = MapEnv::new().with(ENV_DEPLOYMENT_URL, "https://graph.example.com");
        let resolver = ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(only_url));
        assert_eq!(resolver.get_config(), None);

        let only_id = MapEnv::new().with(ENV_ASSISTANT_ID, "deep-agent");
        let resolver = ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(only_id));
        assert_eq!(resolver.get_config(), None);

        let empty_id = MapEnv::new()
            .with(ENV_DEPLOYMENT_URL, "https://graph.example.com")
            .with(ENV_ASSISTANT_ID, "");
        let resolver = ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(empty_id));
        assert_eq!(resolver.get_config(), None);
    }

    #[test]
    fn stored_config_wins_over_env_and_round_trips() {
        let resolver = ConfigResolver::new(Some(Box::new(MemoryStore::new())), Box::new(full_env()));
        let saved = StandaloneConfig {
            deployment_url: "http://localhost:2024".into(),
            assistant_id: "research".into(),
            langsmith_api_key: Some("lsv2-abc".into()),
        };
        resolver.save_config(&saved).unwrap();
        assert_eq!(resolver.get_config(), Some(saved));
    }

    #[test]
    fn stored_values_are_returned_without_validation() {
        let store = MemoryStore::new().with_item(
            CONFIG_KEY,
            r#"{"deploymentUrl":"","assistantId":""}"#,
        );
        let resolver = ConfigResolver::new(Some(Box::new(store)), Box::new(full_env()));
        let config = resolver.get_config().unwrap();
        assert_eq!(config.deployment_url, "");
        assert_eq!(config.assistant_id, "");
    }

    #[test]
    fn serialized_form_uses_camel_case_and_omits_missing_key() {
        let json = serde_json::to_string(&env_result()).unwrap();
        assert_eq!(
            json,
            r#"{"deploymentUrl":"https://graph.example.com","assistantId":"deep-agent"}"#
        );
    }

    #[test]
    fn masked_api_key_keeps_only_the_tail() {
        let mut config = env_result();
        assert_eq!(config.masked_api_key(), None);
        config.langsmith_api_key = Some("lsv2-abcdef".into());
        assert_eq!(config.masked_api_key().as_deref(), Some("****cdef"));
        config.langsmith_api_key = Some("abc".into());
        assert_eq!(config.masked_api_key().as_deref(), Some("****"));
    }
}
