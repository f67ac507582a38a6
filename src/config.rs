use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::database::Locator;

/// Default interactive shell program
pub const DEFAULT_SHELL_PROGRAM: &str = "sqlite3";

pub struct BobDbConfig {
    /// Directory holding `<name>/db.sql3` files when `$BOB_DB_DIR` is not set
    pub install_root: PathBuf,

    /// Program started by `dbshell`
    pub shell_program: String,

    /// Extra arguments passed to the shell program before the database path
    pub shell_args: Vec<String>,
}

impl Default for BobDbConfig {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            shell_program: DEFAULT_SHELL_PROGRAM.to_string(),
            shell_args: vec![],
        }
    }
}

/// Directory containing the running executable
fn default_install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl BobDbConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<BobDbConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                if !Path::new(p.as_str()).exists() {
                    return Err(anyhow!("Config file '{}' does not exist", p));
                }
                builder = builder.add_source(config::File::with_name(p.as_str()));
            }
            None => {
                // By default use $HOME/.bobdb/bobdb.toml when it is present
                let p = Self::config_file_path();
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                }
            }
        }

        // Add in settings from the environment (with a prefix of BOBDB)
        // E.g., `BOBDB_SHELL_PROGRAM=/usr/local/bin/sqlite3 bobdb faces dbshell`
        builder = builder.add_source(config::Environment::with_prefix("BOBDB"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config))
    }

    fn from_map(config: &HashMap<String, String>) -> BobDbConfig {
        let defaults = BobDbConfig::default();

        let install_root = config
            .get("install_root")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.install_root);

        let shell_program = config
            .get("shell_program")
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or(defaults.shell_program);

        // Space-separated, e.g. `shell_args = "-header -column"`
        let shell_args = config
            .get("shell_args")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or(defaults.shell_args);

        BobDbConfig {
            install_root,
            shell_program,
            shell_args,
        }
    }

    /// Locator resolving database names against the install root
    pub fn locator(&self) -> Locator {
        Locator::new(&self.install_root)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Config File:        {}", Self::config_file_path()),
            format!("Install Root:       {}", self.install_root.display()),
            format!("Shell Program:      {}", self.shell_program),
        ];
        if !self.shell_args.is_empty() {
            lines.push(format!("Shell Arguments:    {}", self.shell_args.join(" ")));
        }
        match std::env::var(crate::database::DB_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => {
                lines.push(format!("Override Directory: {}", dir));
            }
            _ => {}
        }
        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.bobdb/bobdb.toml", home_dir)
    }
}
