// .env file loading

use crate::{ConfigError, ConfigStore};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Loader for `.env` files.
///
/// Variables are read from the file only; the process environment is never
/// mutated, so loads are isolated and repeatable.
pub struct EnvFile;

impl EnvFile {
    /// Read every variable from a `.env` file
    pub fn load(path: impl AsRef<Path>) -> Result<HashMap<String, String>, ConfigError> {
        let path = path.as_ref();
        let mut variables = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(|source| ConfigError::Env {
            path: path.display().to_string(),
            source,
        })? {
            let (key, value) = item.map_err(|source| ConfigError::Env {
                path: path.display().to_string(),
                source,
            })?;
            variables.insert(key, value);
        }
        debug!(path = %path.display(), count = variables.len(), "Loaded env file");
        Ok(variables)
    }

    /// Load a `.env` file into a config store under the `env` prefix
    pub fn load_into(path: impl AsRef<Path>, store: &mut ConfigStore) -> Result<(), ConfigError> {
        let variables = Self::load(path)?;
        store.merge_flat("env", variables);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_env(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("phobos-config-{name}-{}.env", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_parses_variables() {
        let path = write_temp_env("basic", "APP_NAME=phobos\nAPP_DEBUG=true\n# a comment\n");
        let vars = EnvFile::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(vars.get("APP_NAME").map(String::as_str), Some("phobos"));
        assert_eq!(vars.get("APP_DEBUG").map(String::as_str), Some("true"));
        assert!(!vars.contains_key("# a comment"));
    }

    #[test]
    fn test_load_into_store_under_env_prefix() {
        let path = write_temp_env("store", "PORT=8080\n");
        let mut store = ConfigStore::new();
        EnvFile::load_into(&path, &mut store).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.get_str("env.PORT"), Some("8080"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let outcome = EnvFile::load("/definitely/not/here/.env");
        assert!(matches!(outcome, Err(ConfigError::Env { .. })));
    }
}
