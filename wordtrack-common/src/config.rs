//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `WORDTRACK_ROOT_FOLDER` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never aborts startup: a warning is
//! logged and compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "WORDTRACK_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "wordtrack.db";

/// Free Dictionary API host
pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev";

/// Default control API port
pub const DEFAULT_PORT: u16 = 5790;

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/wordtrack
            dirs::data_local_dir()
                .map(|d| d.join("wordtrack"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/wordtrack"))
        } else if cfg!(target_os = "macos") {
            // ~/Library/Application Support/wordtrack
            dirs::data_dir()
                .map(|d| d.join("wordtrack"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/wordtrack"))
        } else if cfg!(target_os = "windows") {
            // %LOCALAPPDATA%\wordtrack
            dirs::data_local_dir()
                .map(|d| d.join("wordtrack"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\wordtrack"))
        } else {
            PathBuf::from("./wordtrack_data")
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Dictionary lookup service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Scheme and host of the dictionary service (no trailing path)
    pub base_url: String,
    /// Total request timeout in seconds
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum lookups in flight at once
    pub max_concurrent_lookups: usize,
    /// Request quota per second
    pub requests_per_second: u32,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DICTIONARY_URL.to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
            max_concurrent_lookups: 4,
            requests_per_second: 5,
        }
    }
}

/// Ingestion pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Tokens of one clipboard event processed concurrently
    pub token_concurrency: usize,
    /// Overwrite source app and copied text when a known word is seen again
    pub refresh_provenance: bool,
    /// Start clipboard monitoring as soon as the service is up
    pub monitor_on_startup: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            token_concurrency: 4,
            refresh_provenance: true,
            monitor_on_startup: true,
        }
    }
}

/// Control API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Contents of `wordtrack.toml`
///
/// Every section is optional; absent keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub dictionary: DictionaryConfig,
    pub pipeline: PipelineSettings,
    pub server: ServerConfig,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse a config file, falling back to defaults when it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} - using defaults", e);
                Self::default()
            }
        }
    }
}

/// Default config file location: `<config dir>/wordtrack/wordtrack.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wordtrack").join("wordtrack.toml"))
}

/// Write config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// User-Agent sent with outbound HTTP requests
pub fn get_user_agent() -> String {
    format!("WordTrack/{}", env!("CARGO_PKG_VERSION"))
}

/// Resolves the root folder holding the database
pub struct RootFolderResolver {
    cli_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self {
            cli_override: None,
            config_path: default_config_path(),
        }
    }

    /// Command-line value, highest priority
    pub fn with_cli_override(mut self, root_folder: Option<PathBuf>) -> Self {
        self.cli_override = root_folder;
        self
    }

    /// Use a specific config file instead of the platform default
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            debug!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                debug!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                match TomlConfig::load(config_path) {
                    Ok(TomlConfig {
                        root_folder: Some(path),
                        ..
                    }) => {
                        debug!("Root folder from {}: {}", config_path.display(), path.display());
                        return path;
                    }
                    Ok(_) => {}
                    Err(e) => warn!("{} - ignoring config file for root folder", e),
                }
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

impl Default for RootFolderResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the root folder and locates the database inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
