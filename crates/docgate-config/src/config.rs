// docgate-config/src/config.rs
// ============================================================================
// Module: Docgate Configuration
// Description: Configuration model, loading, and validation for Docgate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with a size cap and validated
//! field by field. Defaults exist for every tunable; the store credentials
//! and table reference are the only required inputs. The config path is the
//! explicit argument when given, else the `DOCGATE_CONFIG` environment
//! variable, else `docgate.toml` in the working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "docgate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "DOCGATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of the configured bearer secret.
pub(crate) const MAX_BEARER_SECRET_LENGTH: usize = 256;
/// Minimum allowed liveness ping interval in milliseconds.
pub(crate) const MIN_PING_INTERVAL_MS: u64 = 1_000;
/// Maximum allowed liveness ping interval in milliseconds.
pub(crate) const MAX_PING_INTERVAL_MS: u64 = 600_000;
/// Minimum store request timeout in milliseconds.
pub(crate) const MIN_STORE_TIMEOUT_MS: u64 = 100;
/// Maximum store request timeout in milliseconds.
pub(crate) const MAX_STORE_TIMEOUT_MS: u64 = 60_000;
/// Maximum records per store listing page (store-imposed cap).
pub(crate) const MAX_STORE_PAGE_SIZE: u32 = 100;
/// Maximum number of configured project slugs.
pub(crate) const MAX_PROJECT_ENTRIES: usize = 1_024;
/// Maximum depth of the state-log queue.
pub(crate) const MAX_STATE_LOG_QUEUE_DEPTH: usize = 65_536;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Docgate gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DocGateConfig {
    /// Gateway server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backing-store configuration.
    pub store: StoreConfig,
    /// Known project slugs served by `list_projects`.
    #[serde(default)]
    pub projects: Vec<String>,
    /// State-log sink configuration.
    #[serde(default)]
    pub state_log: StateLogConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the WebSocket listener binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Expected bearer secret for inbound connections.
    ///
    /// A missing or short secret does not fail validation; the gateway
    /// rejects every connection until a usable secret is configured.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Liveness ping interval in milliseconds.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            bearer_token: None,
            ping_interval_ms: default_ping_interval_ms(),
        }
    }
}

/// Backing-store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// API key presented as a bearer credential to the store.
    pub api_key: String,
    /// Store base identifier.
    pub base_id: String,
    /// Table reference; the table id is preferred, the name is accepted.
    pub table: String,
    /// Store endpoint root. Overridable so tests can target a stub server.
    #[serde(default = "default_store_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
    /// Records requested per listing page.
    #[serde(default = "default_store_page_size")]
    pub page_size: u32,
}

/// State-log sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StateLogConfig {
    /// Append-only JSONL file path; stderr is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Bounded queue depth between the RPC path and the terminal sink.
    #[serde(default = "default_state_log_queue_depth")]
    pub queue_depth: usize,
}

impl Default for StateLogConfig {
    fn default() -> Self {
        Self {
            path: None,
            queue_depth: default_state_log_queue_depth(),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default gateway bind address.
fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

/// Default liveness ping interval (milliseconds).
const fn default_ping_interval_ms() -> u64 {
    30_000
}

/// Default backing-store endpoint root.
fn default_store_base_url() -> String {
    "https://api.airtable.com/v0".to_string()
}

/// Default store request timeout (milliseconds).
const fn default_store_timeout_ms() -> u64 {
    10_000
}

/// Default store listing page size.
const fn default_store_page_size() -> u32 {
    100
}

/// Default state-log queue depth.
const fn default_state_log_queue_depth() -> usize {
    1_024
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl DocGateConfig {
    /// Loads and validates configuration.
    ///
    /// The path is resolved as: explicit argument, `DOCGATE_CONFIG`
    /// environment variable, then `docgate.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size cap, fails to parse, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(path) => path.to_path_buf(),
            None => env::var(CONFIG_ENV_VAR).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
        };
        let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Read {
            path: resolved.display().to_string(),
            error: err.to_string(),
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE as u64 {
            return Err(ConfigError::TooLarge {
                path: resolved.display().to_string(),
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }
        let raw = fs::read_to_string(&resolved).map_err(|err| ConfigError::Read {
            path: resolved.display().to_string(),
            error: err.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: resolved.display().to_string(),
            error: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section against its hard limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.state_log.validate()?;
        if self.projects.len() > MAX_PROJECT_ENTRIES {
            return Err(ConfigError::Invalid("too many project entries".to_string()));
        }
        if self.projects.iter().any(|project| project.trim().is_empty()) {
            return Err(ConfigError::Invalid("projects entries must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind string does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind is not a socket address".to_string()))
    }
}

impl ServerConfig {
    /// Validates the server section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid("server.bind is not a socket address".to_string()));
        }
        if let Some(token) = &self.bearer_token {
            if token.len() > MAX_BEARER_SECRET_LENGTH {
                return Err(ConfigError::Invalid("server.bearer_token exceeds length limit".to_string()));
            }
        }
        if !(MIN_PING_INTERVAL_MS..=MAX_PING_INTERVAL_MS).contains(&self.ping_interval_ms) {
            return Err(ConfigError::Invalid("server.ping_interval_ms out of range".to_string()));
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Validates the store section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("store.api_key must be non-empty".to_string()));
        }
        if self.base_id.trim().is_empty() {
            return Err(ConfigError::Invalid("store.base_id must be non-empty".to_string()));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::Invalid("store.table must be non-empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("store.base_url must be non-empty".to_string()));
        }
        if !(MIN_STORE_TIMEOUT_MS..=MAX_STORE_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid("store.timeout_ms out of range".to_string()));
        }
        if self.page_size == 0 || self.page_size > MAX_STORE_PAGE_SIZE {
            return Err(ConfigError::Invalid("store.page_size out of range".to_string()));
        }
        Ok(())
    }
}

impl StateLogConfig {
    /// Validates the state-log section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_depth == 0 || self.queue_depth > MAX_STATE_LOG_QUEUE_DEPTH {
            return Err(ConfigError::Invalid("state_log.queue_depth out of range".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file cannot be read.
    #[error("config read failed: {path}: {error}")]
    Read {
        /// Path to the config file.
        path: String,
        /// Error details.
        error: String,
    },
    /// The config file exceeds the size cap.
    #[error("config file too large: {path} (limit {limit} bytes)")]
    TooLarge {
        /// Path to the config file.
        path: String,
        /// Size cap in bytes.
        limit: usize,
    },
    /// The config file is not valid TOML for this model.
    #[error("config parse failed: {path}: {error}")]
    Parse {
        /// Path to the config file.
        path: String,
        /// Error details.
        error: String,
    },
    /// A field failed range or shape validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}
