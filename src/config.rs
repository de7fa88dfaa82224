//! Configuration file parser for ~/.config/cinedash/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they are
//! usually typos.
use crate::api::{SortField, SortOrder};
use crate::feed::{Exhaustion, DEFAULT_SCROLL_THRESHOLD};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable overriding `server_url`.
pub const SERVER_ENV: &str = "CINEDASH_SERVER";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServer { url: String, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog server.
    pub server_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Rows from the bottom of the movie list at which the next page loads.
    pub scroll_threshold: usize,

    /// Behaviour once the server returns an empty page.
    pub exhaustion: Exhaustion,

    /// Sort applied at startup and restored by the reset action.
    pub default_sort: SortField,
    pub default_order: SortOrder,

    /// Email used by `login` when `--email` is not given.
    pub email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            exhaustion: Exhaustion::Stop,
            default_sort: SortField::ImdbScore,
            default_order: SortOrder::Desc,
            email: None,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "server_url",
        "request_timeout_secs",
        "scroll_threshold",
        "exhaustion",
        "default_sort",
        "default_order",
        "email",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), server = %config.server_url, "Loaded configuration");
        Ok(config)
    }

    /// Apply the `CINEDASH_SERVER` environment override, then the CLI override.
    pub fn apply_overrides(&mut self, env_server: Option<String>, cli_server: Option<String>) {
        if let Some(server) = env_server.filter(|s| !s.trim().is_empty()) {
            tracing::debug!(server = %server, "Server URL from environment");
            self.server_url = server;
        }
        if let Some(server) = cli_server {
            self.server_url = server;
        }
    }

    /// Parse and check `server_url`. Only http and https are accepted.
    pub fn server(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServer {
            url: self.server_url.clone(),
            reason,
        };
        let url = Url::parse(self.server_url.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(invalid(format!("unsupported scheme '{scheme}'"))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.scroll_threshold, 100);
        assert_eq!(config.exhaustion, Exhaustion::Stop);
        assert_eq!(config.default_sort, SortField::ImdbScore);
        assert_eq!(config.default_order, SortOrder::Desc);
        assert!(config.email.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/cinedash_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.scroll_threshold, 100);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = std::env::temp_dir().join("cinedash_config_test_whitespace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("cinedash_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
server_url = "https://movies.example.com/app"
request_timeout_secs = 5
scroll_threshold = 20
exhaustion = "keep_polling"
default_sort = "popularity"
default_order = "asc"
email = "ann@example.com"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server_url, "https://movies.example.com/app");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.scroll_threshold, 20);
        assert_eq!(config.exhaustion, Exhaustion::KeepPolling);
        assert_eq!(config.default_sort, SortField::Popularity);
        assert_eq!(config.default_order, SortOrder::Asc);
        assert_eq!(config.email.as_deref(), Some("ann@example.com"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("cinedash_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let dir = std::env::temp_dir().join("cinedash_config_test_badsort");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "default_sort = \"runtime\"\n").unwrap();

        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("cinedash_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "theme = \"dark\"\nscroll_threshold = 7\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.scroll_threshold, 7);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("cinedash_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overrides_cli_beats_env() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://env.test".into()), None);
        assert_eq!(config.server_url, "http://env.test");

        config.apply_overrides(Some("http://env.test".into()), Some("http://cli.test".into()));
        assert_eq!(config.server_url, "http://cli.test");
    }

    #[test]
    fn test_blank_env_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(Some("  ".into()), None);
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_server_rejects_other_schemes() {
        let config = Config {
            server_url: "ftp://movies.example.com".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.server(),
            Err(ConfigError::InvalidServer { .. })
        ));

        let config = Config::default();
        assert_eq!(config.server().unwrap().port(), Some(5000));
    }
}
