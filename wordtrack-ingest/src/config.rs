//! Service configuration for wordtrack-ingest
//!
//! Merges command-line values over `wordtrack.toml` over compiled defaults.
//! Root folder resolution (CLI → ENV → TOML → OS default) is delegated to
//! [`RootFolderResolver`].

use std::path::PathBuf;

use tracing::info;
use wordtrack_common::config::{
    default_config_path, DictionaryConfig, PipelineSettings, RootFolderInitializer,
    RootFolderResolver, TomlConfig,
};
use wordtrack_common::Result;

/// Values supplied on the command line (or their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub dictionary_url: Option<String>,
    /// Force monitoring off at startup regardless of TOML
    pub no_monitor: bool,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub port: u16,
    pub log_level: String,
    pub dictionary: DictionaryConfig,
    pub pipeline: PipelineSettings,
}

impl ServiceConfig {
    /// Load the config file and apply overrides
    ///
    /// A missing or unreadable config file falls back to defaults.
    pub fn resolve(overrides: &CliOverrides) -> Self {
        let config_path = overrides.config_file.clone().or_else(default_config_path);

        let toml_config = config_path
            .as_deref()
            .map(TomlConfig::load_or_default)
            .unwrap_or_default();

        let mut resolver = RootFolderResolver::new().with_cli_override(overrides.root_folder.clone());
        if let Some(path) = config_path {
            resolver = resolver.with_config_file(path);
        }

        Self::from_parts(toml_config, overrides, resolver.resolve())
    }

    /// Combine an already-loaded TOML config with overrides
    pub fn from_parts(toml_config: TomlConfig, overrides: &CliOverrides, root_folder: PathBuf) -> Self {
        let TomlConfig {
            logging,
            mut dictionary,
            mut pipeline,
            server,
            ..
        } = toml_config;

        if let Some(url) = &overrides.dictionary_url {
            dictionary.base_url = url.clone();
        }
        if overrides.no_monitor {
            pipeline.monitor_on_startup = false;
        }

        let database_path = RootFolderInitializer::new(root_folder.clone()).database_path();

        Self {
            root_folder,
            database_path,
            port: overrides.port.unwrap_or(server.port),
            log_level: logging.level,
            dictionary,
            pipeline,
        }
    }

    /// Create the root folder if needed
    pub fn prepare_root_folder(&self) -> Result<()> {
        let initializer = RootFolderInitializer::new(self.root_folder.clone());
        let first_run = !initializer.database_exists();
        initializer.ensure_directory_exists()?;
        if first_run {
            info!("No database yet, one will be created at {}", self.database_path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordtrack_common::config::{ServerConfig, DEFAULT_PORT, DATABASE_FILE_NAME};

    #[test]
    fn test_defaults_without_overrides() {
        let config = ServiceConfig::from_parts(
            TomlConfig::default(),
            &CliOverrides::default(),
            PathBuf::from("/tmp/wordtrack"),
        );

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_path, PathBuf::from("/tmp/wordtrack").join(DATABASE_FILE_NAME));
        assert_eq!(config.dictionary, DictionaryConfig::default());
        assert!(config.pipeline.monitor_on_startup);
    }

    #[test]
    fn test_cli_overrides_toml() {
        let toml_config = TomlConfig {
            server: ServerConfig { port: 6000 },
            ..Default::default()
        };
        let overrides = CliOverrides {
            port: Some(7000),
            dictionary_url: Some("http://127.0.0.1:9999".to_string()),
            no_monitor: true,
            ..Default::default()
        };

        let config = ServiceConfig::from_parts(toml_config, &overrides, PathBuf::from("/data"));
        assert_eq!(config.port, 7000);
        assert_eq!(config.dictionary.base_url, "http://127.0.0.1:9999");
        assert!(!config.pipeline.monitor_on_startup);
    }

    #[test]
    fn test_toml_port_used_without_cli() {
        let toml_config = TomlConfig {
            server: ServerConfig { port: 6000 },
            ..Default::default()
        };
        let config = ServiceConfig::from_parts(toml_config, &CliOverrides::default(), PathBuf::from("/data"));
        assert_eq!(config.port, 6000);
    }

    #[test]
    fn test_prepare_root_folder_creates_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("wordtrack");
        let config = ServiceConfig::from_parts(TomlConfig::default(), &CliOverrides::default(), root.clone());

        config.prepare_root_folder().unwrap();
        assert!(root.is_dir());
    }
}
