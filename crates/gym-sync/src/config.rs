//! # Storage Configuration
//!
//! Selects the backend and carries its settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GYM_STORAGE_BACKEND=remote                                         │
//! │     GYM_REMOTE_URL=https://project.example.co                          │
//! │     GYM_REMOTE_KEY=<anon key>                                          │
//! │     GYM_LOCAL_DB_PATH=/data/gym.db                                     │
//! │     GYM_NAMESPACE=gym-tracker                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gym-tracker/storage.toml (Linux)                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     BackendKind::Local, namespace "gym-tracker"                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! backend = "remote"   # local | remote
//!
//! [local]
//! database_path = "gym.db"
//! namespace = "gym-tracker"
//!
//! [remote]
//! url = "https://project.example.co"
//! access_key = "..."
//! owner_column = "user_id"
//! request_timeout_secs = 30
//!
//! [sync]
//! error_ttl_ms = 5000
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use gym_core::DEFAULT_NAMESPACE;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Backend Kind
// =============================================================================

/// Which storage backend the repositories use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// On-device SQLite key-value store.
    #[default]
    Local,

    /// Networked relational service scoped by the signed-in identity.
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "localstorage" => Ok(BackendKind::Local),
            "remote" | "supabase" => Ok(BackendKind::Remote),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: local, remote",
                other
            ))),
        }
    }
}

/// Unknown names in a config file select the local backend instead of
/// failing the whole load.
impl<'de> Deserialize<'de> for BackendKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or_else(|_| {
            warn!(backend = %name, "Unknown storage backend in config file, using local");
            BackendKind::Local
        }))
    }
}

// =============================================================================
// Sections
// =============================================================================

/// On-device store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    /// SQLite file. Relative paths resolve against the platform data dir.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Prefix of every storage key (`<namespace>:<collection>`).
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("gym.db")
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for LocalSettings {
    fn default() -> Self {
        LocalSettings {
            database_path: default_database_path(),
            namespace: default_namespace(),
        }
    }
}

/// Remote service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Service endpoint, e.g. `https://project.example.co`.
    #[serde(default)]
    pub url: Option<String>,

    /// Public (anon) API key sent with every request.
    #[serde(default)]
    pub access_key: Option<String>,

    /// Column holding the owning identity on every row.
    #[serde(default = "default_owner_column")]
    pub owner_column: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_owner_column() -> String {
    "user_id".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            url: None,
            access_key: None,
            owner_column: default_owner_column(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl RemoteSettings {
    /// Returns a problem description if the credentials are unusable.
    fn credential_problem(&self) -> Option<String> {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        let key = self.access_key.as_deref().map(str::trim).unwrap_or_default();

        if url.is_empty() || key.is_empty() {
            return Some("remote backend selected but endpoint URL or access key is missing".into());
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Some(format!("remote endpoint must start with http:// or https://, got: {url}"));
        }
        None
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Sync layer tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// How long a reported error stays visible.
    #[serde(default = "default_error_ttl")]
    pub error_ttl_ms: u64,
}

fn default_error_ttl() -> u64 {
    5000
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            error_ttl_ms: default_error_ttl(),
        }
    }
}

impl SyncSettings {
    pub fn error_ttl(&self) -> Duration {
        Duration::from_millis(self.error_ttl_ms)
    }
}

// =============================================================================
// Config Warning
// =============================================================================

/// Non-fatal configuration problem the caller may surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub requested: BackendKind,
    pub effective: BackendKind,
    pub reason: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} storage backend unavailable ({}); falling back to {}",
            self.requested, self.reason, self.effective
        )
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

/// Complete storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub local: LocalSettings,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub sync: SyncSettings,
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storage.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storage config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides_from(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storage config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storage config saved");
        Ok(())
    }

    /// Validates settings that have no fallback.
    ///
    /// Missing remote credentials are not an error here; [`resolve`](Self::resolve)
    /// handles them by falling back to the local backend.
    pub fn validate(&self) -> SyncResult<()> {
        if self.local.namespace.trim().is_empty() {
            return Err(SyncError::InvalidConfig("namespace must not be empty".into()));
        }
        if self.local.namespace.contains(':') {
            return Err(SyncError::InvalidConfig(
                "namespace must not contain ':'".into(),
            ));
        }
        if self.remote.owner_column.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "owner_column must not be empty".into(),
            ));
        }
        if self.remote.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.sync.error_ttl_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "error_ttl_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Applies overrides looked up through `lookup` (the process environment
    /// in production).
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = lookup("GYM_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.backend = parsed;
                }
                Err(_) => {
                    warn!(backend = %backend, "Unknown storage backend in environment, using local");
                    self.backend = BackendKind::Local;
                }
            }
        }

        if let Some(url) = lookup("GYM_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.url = Some(url);
        }

        if let Some(key) = lookup("GYM_REMOTE_KEY") {
            self.remote.access_key = Some(key);
        }

        if let Some(path) = lookup("GYM_LOCAL_DB_PATH") {
            self.local.database_path = PathBuf::from(path);
        }

        if let Some(namespace) = lookup("GYM_NAMESPACE") {
            self.local.namespace = namespace;
        }
    }

    /// Returns the backend to actually use.
    ///
    /// A remote selection without usable credentials falls back to local and
    /// comes back with a [`ConfigWarning`].
    pub fn resolve(&self) -> (BackendKind, Option<ConfigWarning>) {
        if self.backend == BackendKind::Local {
            return (BackendKind::Local, None);
        }

        match self.remote.credential_problem() {
            None => (BackendKind::Remote, None),
            Some(reason) => {
                let warning = ConfigWarning {
                    requested: BackendKind::Remote,
                    effective: BackendKind::Local,
                    reason,
                };
                warn!(%warning, "Storage backend fallback");
                (BackendKind::Local, Some(warning))
            }
        }
    }

    /// Absolute database path: relative paths are placed in the platform data
    /// directory when one is available.
    pub fn database_path(&self) -> PathBuf {
        let path = &self.local.database_path;
        if path.is_absolute() {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "gym", "gym-tracker")
            .map(|dirs| dirs.data_dir().join(path))
            .unwrap_or_else(|| path.clone())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gym", "gym-tracker")
            .map(|dirs| dirs.config_dir().join("storage.toml"))
    }

    pub fn namespace(&self) -> &str {
        &self.local.namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("localStorage".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("remote".parse::<BackendKind>().unwrap(), BackendKind::Remote);
        assert_eq!("Supabase".parse::<BackendKind>().unwrap(), BackendKind::Remote);
        assert!("postgres".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.namespace(), "gym-tracker");
        assert_eq!(config.sync.error_ttl(), Duration::from_millis(5000));
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve(), (BackendKind::Local, None));
    }

    #[test]
    fn test_remote_without_credentials_falls_back() {
        let mut config = StorageConfig::default();
        config.apply_overrides_from(env(&[("GYM_STORAGE_BACKEND", "remote")]));

        let (kind, warning) = config.resolve();
        assert_eq!(kind, BackendKind::Local);
        let warning = warning.unwrap();
        assert_eq!(warning.requested, BackendKind::Remote);
        assert!(warning.to_string().contains("falling back to local"));
    }

    #[test]
    fn test_remote_with_bad_url_falls_back() {
        let mut config = StorageConfig::default();
        config.apply_overrides_from(env(&[
            ("GYM_STORAGE_BACKEND", "remote"),
            ("GYM_REMOTE_URL", "ftp://example.com"),
            ("GYM_REMOTE_KEY", "anon"),
        ]));
        assert_eq!(config.resolve().0, BackendKind::Local);
    }

    #[test]
    fn test_remote_with_credentials() {
        let mut config = StorageConfig::default();
        config.apply_overrides_from(env(&[
            ("GYM_STORAGE_BACKEND", "supabase"),
            ("GYM_REMOTE_URL", "https://project.example.co"),
            ("GYM_REMOTE_KEY", "anon"),
            ("GYM_NAMESPACE", "test"),
        ]));
        assert_eq!(config.resolve(), (BackendKind::Remote, None));
        assert_eq!(config.namespace(), "test");
    }

    #[test]
    fn test_unknown_backend_in_env_means_local() {
        let mut config = StorageConfig {
            backend: BackendKind::Remote,
            ..Default::default()
        };
        config.apply_overrides_from(env(&[("GYM_STORAGE_BACKEND", "cassandra")]));
        assert_eq!(config.backend, BackendKind::Local);
    }

    #[test]
    fn test_unknown_backend_in_file_means_local() {
        let config: StorageConfig = toml::from_str(r#"backend = "firebase""#).unwrap();
        assert_eq!(config.backend, BackendKind::Local);

        let config: StorageConfig = toml::from_str(r#"backend = "localStorage""#).unwrap();
        assert_eq!(config.backend, BackendKind::Local);
    }

    #[test]
    fn test_validation() {
        let mut config = StorageConfig::default();
        config.local.namespace = "a:b".into();
        assert!(config.validate().is_err());

        config.local.namespace = "ok".into();
        config.remote.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.remote.request_timeout_secs = 30;
        config.sync.error_ttl_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let text = r#"
            backend = "remote"

            [remote]
            url = "https://project.example.co"
            access_key = "anon"

            [sync]
            error_ttl_ms = 2000
        "#;
        let config: StorageConfig = toml::from_str(text).unwrap();
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.remote.owner_column, "user_id");
        assert_eq!(config.sync.error_ttl_ms, 2000);
        assert_eq!(config.local.namespace, "gym-tracker");

        let back: StorageConfig = toml::from_str(&toml::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_and_save_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.toml");

        let mut config = StorageConfig::default();
        config.local.namespace = "saved".into();
        config.save(Some(path.clone())).unwrap();

        let loaded: StorageConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.local.namespace, "saved");
    }
}
