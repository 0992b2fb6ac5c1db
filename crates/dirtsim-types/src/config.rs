//! # dirtsim-types::config
//!
//! Strongly-typed configuration structs, parsed by `serde` from TOML
//! (server/UI process config) mirroring the teacher's config module.

use serde::{Deserialize, Serialize};

/// Process-wide transport configuration shared by Server and UI binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Bind port. Server default 8080, UI default 7070 (spec §6).
    pub port: u16,
    /// When `false` (default), bind `127.0.0.1` and ignore `access_token`.
    /// When `true`, bind `0.0.0.0` and require the bearer token on the
    /// opening handshake for every non-loopback peer (spec §4.3/§6).
    #[serde(default)]
    pub network_access_enabled: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Maximum accepted envelope payload size in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Default outbound request timeout in milliseconds (spec §3, 5000ms).
    #[serde(default = "default_request_timeout_ms")]
    pub default_timeout_ms: u64,
}

fn default_max_payload_bytes() -> usize {
    crate::envelope::DEFAULT_MAX_PAYLOAD_BYTES
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            network_access_enabled: false,
            access_token: None,
            max_payload_bytes: default_max_payload_bytes(),
            default_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Top-level Server process configuration file shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub transport: TransportConfig,
    /// Path to the SQLite file backing the training-result repository.
    /// `None` selects the in-memory backend.
    #[serde(default)]
    pub training_result_db_path: Option<String>,
}

/// Top-level UI process configuration file shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub transport: TransportConfig,
    /// URL of the Server this UI forwards authoritative mutations to.
    pub server_url: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig {
                port: 7070,
                ..Default::default()
            },
            server_url: "ws://127.0.0.1:8080".to_string(),
        }
    }
}
