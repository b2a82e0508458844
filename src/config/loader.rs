//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/jobwatch/config.toml)
//! 3. Project config (.jobwatch/config.toml)
//! 4. Environment variables (JOBWATCH_* prefix, `__` for nesting)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, WatchError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // Merge environment variables. Double underscore separates nesting
        // so keys containing underscores stay reachable, e.g.
        // JOBWATCH_BACKEND__API_TOKEN -> backend.api_token
        figment = figment.merge(Env::prefixed("JOBWATCH_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| WatchError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| WatchError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/jobwatch/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("jobwatch"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".jobwatch/config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".jobwatch")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file path
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        // Global config
        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        // Project config
        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            // Pretty print in TOML format
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| WatchError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    /// Edit config file with default editor
    pub fn edit_config(global: bool) -> Result<()> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                WatchError::Config("Cannot determine global config path".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        if !path.exists() {
            println!("Config file does not exist: {}", path.display());
            println!(
                "Run: jobwatch config init {}",
                if global { "--global" } else { "" }
            );
            return Ok(());
        }

        let editor = env::var("EDITOR").unwrap_or_else(|_| {
            if cfg!(target_os = "macos") {
                "open".to_string()
            } else if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        });

        let status = Command::new(&editor)
            .arg(&path)
            .status()
            .map_err(|e| WatchError::Config(format!("Failed to launch editor {}: {}", editor, e)))?;

        if !status.success() {
            return Err(WatchError::Config("Editor exited with error".to_string()));
        }

        println!("Config saved: {}", path.display());
        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            WatchError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            let default_config = Self::default_global_config();
            fs::write(&config_path, default_config)?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    /// Initialize project configuration
    pub fn init_project(endpoint: Option<&str>) -> Result<PathBuf> {
        let project_dir = Self::project_dir();

        fs::create_dir_all(&project_dir)?;

        // Create default config if not exists
        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = Self::default_project_config(endpoint);
            fs::write(&config_path, default_config)?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default global config content (TOML)
    fn default_global_config() -> String {
        r#"# Jobwatch Global Configuration
# User-wide defaults. Project settings in .jobwatch/config.toml override these.

version = "1.0"

# Orchestration backend
[backend]
endpoint = "http://localhost:8000"
timeout_secs = 30

# Status polling
[poll]
interval_ms = 2000
max_attempts = 300
max_elapsed_secs = 1800
"#
        .to_string()
    }

    /// Generate default project config content (TOML)
    fn default_project_config(endpoint: Option<&str>) -> String {
        let endpoint = endpoint.unwrap_or("http://localhost:8000");
        format!(
            r#"# Jobwatch Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[backend]
endpoint = "{}"

[poll]
interval_ms = 2000
"#,
            endpoint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        // Jail serializes env access across tests and moves to a temp cwd,
        // so no project config or stray variable leaks in.
        figment::Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            let config = ConfigLoader::load().map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.version, "1.0");
            Ok(())
        });
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
version = "1.0"

[backend]
endpoint = "http://localhost:9999"

[poll]
interval_ms = 5000
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.backend.endpoint, "http://localhost:9999");
        assert_eq!(config.poll.interval_ms, 5000);
        // Unspecified sections keep defaults
        assert_eq!(
            config.breaker.failure_threshold,
            crate::constants::circuit_breaker::FAILURE_THRESHOLD
        );
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[poll]
interval_ms = 0
"#,
        )
        .unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            jail.set_env("JOBWATCH_BACKEND__ENDPOINT", "http://127.0.0.1:7777");
            let config = ConfigLoader::load().map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.backend.endpoint, "http://127.0.0.1:7777");
            Ok(())
        });
    }

    #[test]
    fn test_env_reaches_keys_with_underscores() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            jail.set_env("JOBWATCH_BACKEND__API_TOKEN", "tok-123");
            jail.set_env("JOBWATCH_POLL__INTERVAL_MS", "5000");
            jail.set_env("JOBWATCH_POLL__MAX_ATTEMPTS", "7");
            let config = ConfigLoader::load().map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.backend.api_token.as_deref(), Some("tok-123"));
            assert_eq!(config.poll.interval_ms, 5000);
            assert_eq!(config.poll.max_attempts, Some(7));
            Ok(())
        });
    }
}
