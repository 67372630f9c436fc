//! Persistent configuration: selected model and per-provider API keys.
//!
//! Stored as JSON at `~/.kicad/kicad_llm_config.json`. Loading is
//! fail-soft: a missing or malformed file yields the defaults. Every
//! mutating call rewrites the whole file with a refreshed timestamp.
//! Write failures are logged and swallowed, so in-memory state can run
//! ahead of disk. Single-process, single-writer; nothing guards two
//! instances editing the file at once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".kicad";
const CONFIG_FILE: &str = "kicad_llm_config.json";

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

// Every field defaults individually so a partial file (older revision,
// hand-edited) keeps whatever it does carry instead of being discarded
// wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    #[serde(default)]
    selected_model: String,
    #[serde(default)]
    provider_api_keys: BTreeMap<String, String>,
    #[serde(default)]
    last_updated: Option<String>,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            selected_model: DEFAULT_MODEL.to_string(),
            provider_api_keys: BTreeMap::new(),
            last_updated: None,
        }
    }
}

/// Key-value store for the selected model and provider API keys.
pub struct ConfigManager {
    path: PathBuf,
    data: ConfigData,
}

/// Provider prefix of a model id: substring before the first `/`, or the
/// whole id when there is none. Two models sharing a prefix share one key.
pub fn provider_for_model(model_id: &str) -> &str {
    match model_id.split_once('/') {
        Some((provider, _)) => provider,
        None => model_id,
    }
}

impl ConfigManager {
    /// Open the per-user config, creating the parent directory if needed.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_path(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Open a config at an explicit path (tests, alternate installs).
    pub fn with_path(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!("failed to create config directory {}: {}", parent.display(), e);
            }
        }
        let data = Self::load(&path);
        Self { path, data }
    }

    fn load(path: &Path) -> ConfigData {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("malformed config {}: {}; using defaults", path.display(), e);
                    ConfigData::default()
                }
            },
            Err(_) => ConfigData::default(),
        }
    }

    fn save(&mut self) {
        self.data.last_updated = Some(chrono::Utc::now().to_rfc3339());
        match serde_json::to_string_pretty(&self.data) {
            Ok(text) => {
                if let Err(e) = fs::write(&self.path, text) {
                    tracing::warn!("failed to save configuration to {}: {}", self.path.display(), e);
                }
            }
            Err(e) => tracing::warn!("failed to serialize configuration: {}", e),
        }
    }

    /// Currently selected model id, falling back to [`DEFAULT_MODEL`].
    pub fn selected_model(&self) -> &str {
        if self.data.selected_model.is_empty() {
            DEFAULT_MODEL
        } else {
            &self.data.selected_model
        }
    }

    pub fn set_selected_model(&mut self, model_id: &str) {
        self.data.selected_model = model_id.to_string();
        self.save();
    }

    /// API key for a model, looked up via its provider prefix.
    pub fn api_key_for_model(&self, model_id: &str) -> Option<&str> {
        self.data
            .provider_api_keys
            .get(provider_for_model(model_id))
            .map(String::as_str)
    }

    pub fn set_api_key_for_provider(&mut self, provider: &str, api_key: &str) {
        self.data
            .provider_api_keys
            .insert(provider.to_string(), api_key.to_string());
        self.save();
    }

    pub fn remove_api_key_for_provider(&mut self, provider: &str) {
        if self.data.provider_api_keys.remove(provider).is_some() {
            self.save();
        }
    }

    /// Providers that currently have a key stored.
    pub fn providers_with_keys(&self) -> Vec<String> {
        self.data.provider_api_keys.keys().cloned().collect()
    }

    /// Copy of the full provider → key mapping.
    pub fn all_provider_api_keys(&self) -> BTreeMap<String, String> {
        self.data.provider_api_keys.clone()
    }

    pub fn config_file_path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config() -> (TempDir, ConfigManager) {
        let dir = TempDir::new().unwrap();
        let config = ConfigManager::with_path(dir.path().join("config.json"));
        (dir, config)
    }

    #[test]
    fn test_defaults_when_file_absent() {
        let (_dir, config) = temp_config();
        assert_eq!(config.selected_model(), DEFAULT_MODEL);
        assert!(config.api_key_for_model("openai/gpt-4o").is_none());
        assert!(config.providers_with_keys().is_empty());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json at all").unwrap();
        let config = ConfigManager::with_path(path);
        assert_eq!(config.selected_model(), DEFAULT_MODEL);
        assert!(config.providers_with_keys().is_empty());
    }

    #[test]
    fn test_partial_file_keeps_stored_keys() {
        // A file missing selected_model must not throw away the keys it
        // does carry.
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider_api_keys": {"openai": "sk-test"}}"#).unwrap();

        let config = ConfigManager::with_path(path);
        assert_eq!(config.api_key_for_model("openai/gpt-4o"), Some("sk-test"));
        assert_eq!(config.selected_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_provider_prefix_extraction() {
        assert_eq!(provider_for_model("openai/gpt-4o"), "openai");
        assert_eq!(provider_for_model("google/gemini-2.5-flash"), "google");
        assert_eq!(provider_for_model("ollama"), "ollama");
        assert_eq!(provider_for_model("a/b/c"), "a");
    }

    #[test]
    fn test_key_scoped_to_provider() {
        let (_dir, mut config) = temp_config();
        config.set_api_key_for_provider("openai", "sk-test");

        assert_eq!(config.api_key_for_model("openai/gpt-4o"), Some("sk-test"));
        assert_eq!(
            config.api_key_for_model("openai/gpt-4o-mini"),
            Some("sk-test")
        );
        assert!(config.api_key_for_model("google/gemini-2.5-flash").is_none());
    }

    #[test]
    fn test_remove_key() {
        let (_dir, mut config) = temp_config();
        config.set_api_key_for_provider("google", "g-key");
        assert!(config.api_key_for_model("google/gemini-2.5-flash").is_some());

        config.remove_api_key_for_provider("google");
        assert!(config.api_key_for_model("google/gemini-2.5-flash").is_none());
        assert!(config.api_key_for_model("google/gemini-2.5-flash-lite").is_none());
    }

    #[test]
    fn test_mutations_persist_across_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ConfigManager::with_path(path.clone());
        config.set_selected_model("anthropic/claude-sonnet-4-20250514");
        config.set_api_key_for_provider("anthropic", "ant-key");

        let reloaded = ConfigManager::with_path(path);
        assert_eq!(
            reloaded.selected_model(),
            "anthropic/claude-sonnet-4-20250514"
        );
        assert_eq!(
            reloaded.api_key_for_model("anthropic/claude-sonnet-4-20250514"),
            Some("ant-key")
        );
    }

    #[test]
    fn test_save_refreshes_timestamp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ConfigManager::with_path(path.clone());
        config.set_selected_model("openai/gpt-4o");

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["last_updated"].is_string());
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        // Point at a path whose parent cannot be created as a directory.
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not dir").unwrap();
        let mut config = ConfigManager::with_path(blocker.join("sub").join("config.json"));

        config.set_api_key_for_provider("openai", "sk-test");
        // Disk write failed, but the in-memory mapping still reflects it.
        assert_eq!(config.api_key_for_model("openai/gpt-4o"), Some("sk-test"));
    }
}
