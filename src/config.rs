use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Diagnostic log level for the evmon log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Main evmon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    /// Remote used when no target is given on the command line
    pub default_remote: String,
    pub remotes: HashMap<String, RemoteConfig>,
}

/// A named event source
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// `-` for stdin, `unix:<path>` for a socket, otherwise a file path
    pub address: String,
    #[serde(default = "default_project")]
    pub project: String,
    /// Prefix log messages with the originating node
    #[serde(default)]
    pub multi_node: bool,
}

fn default_project() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            default_remote: "local".to_string(),
            remotes: Self::builtin_remotes(),
        }
    }
}

impl Config {
    fn builtin_remotes() -> HashMap<String, RemoteConfig> {
        HashMap::from([
            (
                "local".to_string(),
                RemoteConfig {
                    address: "unix:/run/evmon/events.sock".to_string(),
                    project: default_project(),
                    multi_node: false,
                },
            ),
            (
                "stdin".to_string(),
                RemoteConfig {
                    address: "-".to_string(),
                    project: default_project(),
                    multi_node: false,
                },
            ),
        ])
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check EVMON_CONFIG env var
        if let Ok(env_path) = std::env::var("EVMON_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from EVMON_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try EVMON_DIR/evmon.yaml
        if let Ok(evmon_dir) = std::env::var("EVMON_DIR") {
            let path = PathBuf::from(evmon_dir).join("evmon.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from EVMON_DIR: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/evmon/evmon.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("evmon").join("evmon.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./evmon.yaml (for development)
        let local_config = PathBuf::from("evmon.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let mut config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        // User remotes extend the built-in ones
        for (name, remote) in Self::builtin_remotes() {
            config.remotes.entry(name).or_insert(remote);
        }

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Resolve a `<remote>` or `<remote>:` argument, falling back to the default remote
    pub fn resolve_remote(&self, target: Option<&str>) -> Result<(String, RemoteConfig)> {
        let name = match target.map(|t| t.strip_suffix(':').unwrap_or(t)) {
            Some(name) if !name.is_empty() => name,
            _ => self.default_remote.as_str(),
        };

        let remote = self
            .remotes
            .get(name)
            .ok_or_else(|| eyre::eyre!("The remote \"{}\" doesn't exist", name))?;

        Ok((name.to_string(), remote.clone()))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
