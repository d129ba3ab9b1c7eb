//! Configuration loading and root folder resolution
//!
//! Every WaveSight service stores its state under a single root folder
//! containing `wavesight.db`. The folder is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `WAVESIGHT_ROOT` environment variable
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming the root folder
pub const ROOT_ENV_VAR: &str = "WAVESIGHT_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "wavesight.db";

/// Resolves the root folder for a service using the 4-tier priority order
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<String>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Supply a command-line override (priority 1)
    pub fn with_cli_arg(mut self, arg: Option<String>) -> Self {
        self.cli_arg = arg;
        self
    }

    /// Resolve the root folder path
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            info!("{}: root folder from command line: {}", self.module_name, path);
            return PathBuf::from(path);
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
            info!("{}: root folder from {}: {}", self.module_name, ROOT_ENV_VAR, path);
            return PathBuf::from(path);
        }

        // Priority 3: TOML config file
        if let Ok(config_path) = locate_config_file() {
            if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
                if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                    if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                        info!(
                            "{}: root folder from {}: {}",
                            self.module_name,
                            config_path.display(),
                            root_folder
                        );
                        return PathBuf::from(root_folder);
                    }
                }
            }
        }

        // Priority 4: OS-dependent compiled default
        let default = default_root_folder();
        info!(
            "{}: root folder default: {}",
            self.module_name,
            default.display()
        );
        default
    }
}

/// Prepares a resolved root folder for use
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder if it does not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }
}

/// Locate the platform configuration file
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/wavesight/config.toml first, then /etc/wavesight/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("wavesight").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/wavesight/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("wavesight").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("wavesight"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/wavesight"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("wavesight"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/wavesight"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("wavesight"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\wavesight"))
    } else {
        PathBuf::from("./wavesight_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_arg_wins_over_env() {
        std::env::set_var(ROOT_ENV_VAR, "/tmp/from-env");
        let resolved = RootFolderResolver::new("test")
            .with_cli_arg(Some("/tmp/from-cli".to_string()))
            .resolve();
        std::env::remove_var(ROOT_ENV_VAR);
        assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));
    }

    #[test]
    #[serial]
    fn env_var_used_when_no_cli_arg() {
        std::env::set_var(ROOT_ENV_VAR, "/tmp/from-env");
        let resolved = RootFolderResolver::new("test").resolve();
        std::env::remove_var(ROOT_ENV_VAR);
        assert_eq!(resolved, PathBuf::from("/tmp/from-env"));
    }

    #[test]
    fn database_path_appends_file_name() {
        let init = RootFolderInitializer::new(PathBuf::from("/tmp/ws"));
        assert_eq!(init.database_path(), PathBuf::from("/tmp/ws/wavesight.db"));
    }
}
