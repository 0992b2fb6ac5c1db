//! # dirtsim-engine::config_io
//!
//! Loads `ServerConfig`/`UiConfig` from a TOML file on disk, the same
//! read-to-string-then-parse shape the CLI uses for scenario files.
//! Unlike scenario loading there is only one format here; a config file
//! is always TOML.

use dirtsim_types::config::{ServerConfig, UiConfig};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("reading '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

fn read_and_parse<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigLoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a `ServerConfig` from `path`, falling back to defaults (bind
/// `127.0.0.1:8080`, in-memory training-result store) if the file doesn't
/// exist.
pub fn load_server_config(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigLoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    read_and_parse(path)
}

/// Loads a `UiConfig` from `path`, falling back to defaults (bind
/// `127.0.0.1:7070`, forwarding to `ws://127.0.0.1:8080`) if the file
/// doesn't exist.
pub fn load_ui_config(path: impl AsRef<Path>) -> Result<UiConfig, ConfigLoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(UiConfig::default());
    }
    read_and_parse(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_server_config("/nonexistent/dirtsim-server.toml").unwrap();
        assert_eq!(config.transport.port, 8080);
    }

    #[test]
    fn parses_a_minimal_server_config() {
        let path = std::env::temp_dir().join("dirtsim-config-io-test-server.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[transport]\nport = 9090\n").unwrap();
        drop(file);
        let config = load_server_config(&path).unwrap();
        assert_eq!(config.transport.port, 9090);
        std::fs::remove_file(path).unwrap();
    }
}
