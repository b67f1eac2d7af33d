//! Configuration loading from file and environment variables.

use std::sync::Arc;

use eventdock_db::{open_slot_store, DbError, DbRuntimeSettings};
use eventdock_log::MemorySlot;
use eventdock_types::{DockConfig, LimitError, SlotStorage};
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Dock behavior and log limits.
    #[serde(default)]
    pub dock: DockConfig,

    /// Where the log slot lives.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; nothing survives a restart.
    Memory,
    /// A SQLite database file.
    #[default]
    Sqlite,
}

/// Durable storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout applied to each SQLite connection.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum pooled SQLite connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "eventdock_log=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_db_path() -> String {
    "eventdock.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl StorageConfig {
    /// Opens the configured slot store.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the SQLite database cannot be opened or
    /// migrated.
    pub fn open(&self) -> Result<Arc<dyn SlotStorage>, DbError> {
        match self.backend {
            StorageBackend::Memory => Ok(Arc::new(MemorySlot::new())),
            StorageBackend::Sqlite => {
                let settings = DbRuntimeSettings {
                    busy_timeout_ms: self.busy_timeout_ms,
                    pool_max_size: self.pool_max_size,
                };
                Ok(Arc::new(open_slot_store(&self.path, settings)?))
            }
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The merged configuration is unusable.
    #[error("invalid dock configuration: {0}")]
    Invalid(#[from] LimitError),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `EVENTDOCK_MAX_ENTRIES` overrides `dock.max_entries`
/// - `EVENTDOCK_MAX_BYTES` overrides `dock.max_bytes`
/// - `EVENTDOCK_STORAGE_KEY` overrides `dock.storage_key`
/// - `EVENTDOCK_SHOW_BADGE` overrides `dock.show_badge` ("true" or "1")
/// - `EVENTDOCK_DB_PATH` overrides `storage.path` and selects SQLite
/// - `EVENTDOCK_LOG_LEVEL` overrides `logging.level`
/// - `EVENTDOCK_LOG_JSON` overrides `logging.json` ("true" or "1")
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the resulting log limits are zero.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// [`load_config`] with an explicit variable lookup.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_with<F>(path: Option<&str>, var: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, var);
    config.dock.limits()?;

    Ok(config)
}

fn apply_overrides<F>(config: &mut Config, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    let flag = |value: String| value == "true" || value == "1";

    if let Some(parsed) = var("EVENTDOCK_MAX_ENTRIES").and_then(|v| v.parse().ok()) {
        config.dock.max_entries = parsed;
    }
    if let Some(parsed) = var("EVENTDOCK_MAX_BYTES").and_then(|v| v.parse().ok()) {
        config.dock.max_bytes = parsed;
    }
    if let Some(key) = var("EVENTDOCK_STORAGE_KEY") {
        config.dock.storage_key = key;
    }
    if let Some(show) = var("EVENTDOCK_SHOW_BADGE") {
        config.dock.show_badge = flag(show);
    }
    if let Some(path) = var("EVENTDOCK_DB_PATH") {
        config.storage.path = path;
        config.storage.backend = StorageBackend::Sqlite;
    }
    if let Some(level) = var("EVENTDOCK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("EVENTDOCK_LOG_JSON") {
        config.logging.json = flag(json);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use eventdock_types::{DockPosition, DEFAULT_STORAGE_KEY};

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_with(Some("/nonexistent/eventdock.toml"), no_env).expect("load");
        assert_eq!(config.dock, DockConfig::default());
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, "eventdock.db");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn partial_file_keeps_field_defaults() {
        let file = write_config(
            r##"
            [dock]
            position = "bottom-left"
            max_entries = 50

            [dock.theme]
            fab_color = "#000"

            [storage]
            backend = "memory"
            "##,
        );
        let config = load_config_with(file.path().to_str(), no_env).expect("load");

        assert_eq!(config.dock.position, DockPosition::BottomLeft);
        assert_eq!(config.dock.max_entries, 50);
        assert_eq!(config.dock.max_bytes, 2_000_000);
        assert_eq!(config.dock.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.dock.theme.fab_color, "#000");
        assert_eq!(config.dock.theme.modal_bg, "#0f172a");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[dock]\nmax_entries = 50\nshow_badge = true\n");
        let vars = env(&[
            ("EVENTDOCK_MAX_ENTRIES", "7"),
            ("EVENTDOCK_MAX_BYTES", "4096"),
            ("EVENTDOCK_STORAGE_KEY", "custom:key"),
            ("EVENTDOCK_SHOW_BADGE", "0"),
            ("EVENTDOCK_DB_PATH", "/tmp/dock.db"),
            ("EVENTDOCK_LOG_LEVEL", "debug"),
            ("EVENTDOCK_LOG_JSON", "true"),
        ]);
        let config = load_config_with(file.path().to_str(), vars).expect("load");

        assert_eq!(config.dock.max_entries, 7);
        assert_eq!(config.dock.max_bytes, 4096);
        assert_eq!(config.dock.storage_key, "custom:key");
        assert!(!config.dock.show_badge);
        assert_eq!(config.storage.path, "/tmp/dock.db");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn unparsable_override_is_ignored() {
        let config =
            load_config_with(None, env(&[("EVENTDOCK_MAX_ENTRIES", "lots")])).expect("load");
        assert_eq!(config.dock.max_entries, 2000);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = load_config_with(None, env(&[("EVENTDOCK_MAX_BYTES", "0")]))
            .expect_err("zero byte limit");
        assert!(matches!(err, ConfigError::Invalid(LimitError::ZeroBytes)));

        let file = write_config("[dock]\nmax_entries = 0\n");
        let err = load_config_with(file.path().to_str(), no_env).expect_err("zero entries");
        assert!(matches!(err, ConfigError::Invalid(LimitError::ZeroEntries)));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let file = write_config("[dock\nmax_entries = ");
        let err = load_config_with(file.path().to_str(), no_env).expect_err("parse error");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn memory_backend_opens_without_touching_disk() {
        let storage = StorageConfig {
            backend: StorageBackend::Memory,
            path: "/nonexistent/dir/never.db".into(),
            ..StorageConfig::default()
        };
        let slot = storage.open().expect("memory slot");
        slot.write("k", "v").expect("write");
        assert_eq!(slot.read("k").expect("read").as_deref(), Some("v"));
    }
}
