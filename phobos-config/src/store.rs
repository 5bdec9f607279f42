// Dot-notation configuration store

use crate::ConfigError;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// A configuration tree addressed by dot-notation keys.
///
/// `get("database.pool.size")` walks the nested objects; `set` creates any
/// missing intermediate objects along the way.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    root: Value,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            root: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let root = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(Self { root })
    }

    /// Look up a value by dot-notation key
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for part in key.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    /// String lookup with a fallback
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value by dot-notation key, creating intermediate objects.
    /// A non-object value encountered along the path is replaced.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut current = &mut self.root;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if !current.is_object() {
                *current = Value::Object(serde_json::Map::new());
            }
            match current {
                Value::Object(map) => {
                    if parts.peek().is_none() {
                        map.insert(part.to_string(), value);
                        return;
                    }
                    current = map
                        .entry(part.to_string())
                        .or_insert_with(|| Value::Object(serde_json::Map::new()));
                }
                _ => return,
            }
        }
    }

    /// Merge a flat key/value map under a dot-notation prefix
    pub fn merge_flat(&mut self, prefix: &str, entries: impl IntoIterator<Item = (String, String)>) {
        for (name, value) in entries {
            let key = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}.{name}")
            };
            self.set(&key, Value::String(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_walks_nested_objects() {
        let store = ConfigStore::from_value(json!({
            "database": { "pool": { "size": 10 }, "url": "postgres://x" }
        }));
        assert_eq!(store.get_i64("database.pool.size"), Some(10));
        assert_eq!(store.get_str("database.url"), Some("postgres://x"));
        assert!(store.get("database.missing").is_none());
        assert!(store.get("database.url.deeper").is_none());
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut store = ConfigStore::new();
        store.set("app.name", json!("phobos"));
        store.set("app.debug", json!(true));
        assert_eq!(store.get_str("app.name"), Some("phobos"));
        assert_eq!(store.get_bool("app.debug"), Some(true));
    }

    #[test]
    fn test_set_replaces_scalar_on_path() {
        let mut store = ConfigStore::from_value(json!({ "app": "flat" }));
        store.set("app.name", json!("phobos"));
        assert_eq!(store.get_str("app.name"), Some("phobos"));
    }

    #[test]
    fn test_get_or_falls_back() {
        let store = ConfigStore::new();
        assert_eq!(store.get_or("app.name", "default"), "default");
    }

    #[test]
    fn test_merge_flat_with_prefix() {
        let mut store = ConfigStore::new();
        store.merge_flat(
            "env",
            vec![("APP_NAME".to_string(), "phobos".to_string())],
        );
        assert_eq!(store.get_str("env.APP_NAME"), Some("phobos"));
    }
}
