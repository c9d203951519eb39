//! Implements ConfigStore using a JSON file.
//!
//! Flat JSON object. Our keys are written as strings; values of any other
//! kind (hand-edited numbers, foreign keys) are kept as they are. The file is
//! re-read on every access and rewritten whole on save; single process,
//! single writer.

use crate::domain::{ConfigKey, DomainError};
use crate::ports::ConfigStore;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// JSON file-based credentials storage.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Whole mapping. Missing file, read errors, invalid JSON and a non-object
    /// top level all yield an empty map.
    async fn load(&self) -> Map<String, Value> {
        let Ok(s) = fs::read_to_string(&self.path).await else {
            return Map::new();
        };
        match serde_json::from_str(&s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Write-replace: temp file, sync_all, rename over the target.
    async fn write(&self, data: &Map<String, Value>) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(data).map_err(|e| DomainError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Io(format!("create config directory: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Io(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Io(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Io(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Io(format!("replace config file: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConfigStore for JsonConfigStore {
    async fn get(&self, key: ConfigKey) -> Option<String> {
        self.load().await.remove(key.as_str()).and_then(scalar_to_string)
    }

    async fn save(&self, entries: HashMap<ConfigKey, String>) -> Result<(), DomainError> {
        let mut current = self.load().await;
        for (key, value) in entries {
            current.insert(key.as_str().to_string(), Value::String(value));
        }
        self.write(&current).await?;
        debug!(path = %self.path.display(), keys = current.len(), "config saved");
        Ok(())
    }
}

/// Strings as-is, numbers and booleans in their JSON form. Null, arrays and
/// objects count as unset.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.get(ConfigKey::ApiId).await, None);
    }

    #[tokio::test]
    async fn save_merges_instead_of_replacing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));

        store
            .save(HashMap::from([(ConfigKey::ApiId, "1".to_string())]))
            .await
            .unwrap();
        store
            .save(HashMap::from([(ConfigKey::GeminiKey, "2".to_string())]))
            .await
            .unwrap();

        assert_eq!(store.get(ConfigKey::ApiId).await.as_deref(), Some("1"));
        assert_eq!(store.get(ConfigKey::GeminiKey).await.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn save_overwrites_given_key_and_keeps_unknown_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_hash": "old", "theme": "dark"}"#).unwrap();
        let store = JsonConfigStore::new(&path);

        store
            .save(HashMap::from([(ConfigKey::ApiHash, "new".to_string())]))
            .await
            .unwrap();

        assert_eq!(store.get(ConfigKey::ApiHash).await.as_deref(), Some("new"));
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[tokio::test]
    async fn non_string_values_are_read_and_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_id": 12345, "api_hash": "abc", "window": {"w": 800}, "beta": true}"#,
        )
        .unwrap();
        let store = JsonConfigStore::new(&path);

        assert_eq!(store.get(ConfigKey::ApiId).await.as_deref(), Some("12345"));
        assert_eq!(store.get(ConfigKey::ApiHash).await.as_deref(), Some("abc"));

        store
            .save(HashMap::from([(ConfigKey::GeminiKey, "AIza".to_string())]))
            .await
            .unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["api_id"], 12345);
        assert_eq!(raw["api_hash"], "abc");
        assert_eq!(raw["window"]["w"], 800);
        assert_eq!(raw["beta"], true);
        assert_eq!(raw["gemini_key"], "AIza");
    }

    #[tokio::test]
    async fn non_object_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"["api_id"]"#).unwrap();
        let store = JsonConfigStore::new(&path);
        assert_eq!(store.get(ConfigKey::ApiId).await, None);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty_and_is_replaced_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonConfigStore::new(&path);

        assert_eq!(store.get(ConfigKey::ApiId).await, None);
        store
            .save(HashMap::from([(ConfigKey::ApiId, "42".to_string())]))
            .await
            .unwrap();
        assert_eq!(store.get(ConfigKey::ApiId).await.as_deref(), Some("42"));
    }
}
