// Configuration for the Phobos framework
// A dot-notation store over a nested JSON tree, plus .env file loading.

mod env;
mod store;

pub use env::EnvFile;
pub use store::ConfigStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to load env file {path}: {source}")]
    Env {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}
