use crate::error::ConfigError;
use crate::paths::PathManager;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration.
///
/// Resolution order: built-in defaults, then `config.toml`, then environment
/// variables (a `.env` file in the working directory is loaded first). Empty
/// environment values count as unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub wishlist: WishlistConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Validated Plex connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlexConnection {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Library section titles skipped entirely
    #[serde(default)]
    pub ignore_libraries: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Service-account key file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
    /// Spreadsheet receiving the report; no sync when unset
    #[serde(default)]
    pub report_sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WishlistConfig {
    #[serde(default = "default_wishlist_sheet")]
    pub sheet_name: String,
    /// Local JSON store used when the credentials file does not exist
    #[serde(default)]
    pub local_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("google_credentials.json")
}

fn default_wishlist_sheet() -> String {
    "DVD Wish List".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            ignore_libraries: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            report_sheet: None,
        }
    }
}

impl Default for WishlistConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_wishlist_sheet(),
            local_file: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_file: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load `.env`, the config file (if present) and the process environment.
    pub fn load(paths: &PathManager) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let config_file = paths.config_file();
        let mut config = if config_file.exists() {
            debug!("Loading config from {}", config_file.display());
            Self::load_from_file(&config_file)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        if config.wishlist.local_file.is_none() {
            config.wishlist.local_file = Some(paths.wishlist_file());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay environment variables. `lookup` is injected so tests never
    /// touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("PLEX_BASEURL") {
            self.plex.base_url = Some(v);
        }
        if let Some(v) = get("PLEX_TOKEN") {
            self.plex.token = Some(v);
        }
        if let Some(v) = get("IGNORE_LIBRARIES") {
            self.report.ignore_libraries = parse_list(&v);
        }
        if let Some(v) = get("CATALOG_OUTPUT_DIR") {
            self.report.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("GOOGLE_SHEET_NAME") {
            self.google.report_sheet = Some(v);
        }
        // The report sync and the wishlist historically used different names
        if let Some(v) = get("GOOGLE_CREDENTIALS_FILE").or_else(|| get("GOOGLE_CREDENTIALS_JSON")) {
            self.google.credentials_file = PathBuf::from(v);
        }
        if let Some(v) = get("MOVIE_WISHLIST_SHEET") {
            self.wishlist.sheet_name = v;
        }
        if let Some(v) = get("WISHLIST_FILE") {
            self.wishlist.local_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("CATALOG_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = get("CATALOG_LOG_FILE") {
            self.server.log_file = Some(PathBuf::from(v));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.plex.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "PLEX_BASEURL",
                    message: format!("'{}' is not an http(s) URL", url),
                });
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "retry.max_attempts",
                message: "must be at least 1".to_string(),
            });
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::Invalid {
                key: "retry.initial_delay_ms",
                message: "must not exceed retry.max_delay_ms".to_string(),
            });
        }
        Ok(())
    }

    /// Plex parameters required by `export`; missing ones are fatal.
    pub fn require_plex(&self) -> Result<PlexConnection, ConfigError> {
        let base_url = self
            .plex
            .base_url
            .clone()
            .ok_or(ConfigError::Missing("PLEX_BASEURL"))?;
        let token = self.plex.token.clone().ok_or(ConfigError::Missing("PLEX_TOKEN"))?;
        Ok(PlexConnection {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}
