//! Panel configuration
//!
//! Loaded from (later sources override earlier):
//! 1. Built-in defaults
//! 2. TOML file (`dronectl.toml` or `--config`)
//! 3. Environment variables prefixed with `DRONECTL_`, nested with `__`
//!    (e.g. `DRONECTL_LAUNCH__POLICY=concurrent`)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dronectl_shared::{limits, CommandKind, LaunchPolicy};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file, relative to the working directory
pub const CONFIG_FILE_NAME: &str = "dronectl.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DRONECTL_";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown command in [scripts.overrides]: {0}")]
    UnknownOverride(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub server: ServerConfig,
    pub scripts: ScriptsConfig,
    pub launch: LaunchConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the control page is served on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
        }
    }
}

/// Where the autopilot scripts live and how they are invoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Interpreter for every script unless overridden
    pub program: String,
    /// Directory the script file names are resolved against
    pub script_dir: PathBuf,
    /// Working directory for launched scripts; inherits the server's when unset
    pub working_dir: Option<PathBuf>,
    /// Forward script stdout/stderr into the log instead of discarding it
    pub capture_output: bool,
    /// Commands that are ignored as if unknown
    pub disabled: Vec<CommandKind>,
    /// Per-command overrides keyed by command identifier
    pub overrides: BTreeMap<String, ScriptOverride>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            program: limits::DEFAULT_PROGRAM.into(),
            script_dir: PathBuf::from(limits::DEFAULT_SCRIPT_DIR),
            working_dir: None,
            capture_output: false,
            disabled: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Replacement invocation for a single command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOverride {
    pub program: Option<String>,
    /// Script file name, resolved against `script_dir`
    pub script: Option<String>,
    /// Extra arguments passed after the script path
    pub args: Vec<String>,
}

/// Launch supervision settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub policy: LaunchPolicy,
    /// Kill a script after this many seconds; 0 disables the timeout
    pub timeout_secs: u64,
    /// Launches kept for `/api/launches`
    pub history_limit: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            policy: LaunchPolicy::default(),
            timeout_secs: limits::DEFAULT_TIMEOUT_SECS,
            history_limit: limits::DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl LaunchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl PanelConfig {
    /// Load configuration, reading `config_path` or the default file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let config: PanelConfig = Figment::new()
            .merge(Serialized::defaults(PanelConfig::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must not be empty".into()));
        }

        if self.scripts.program.trim().is_empty() {
            return Err(ConfigError::Invalid("scripts.program must not be empty".into()));
        }

        if self.launch.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "launch.history_limit must be greater than 0".into(),
            ));
        }

        for (key, script) in &self.scripts.overrides {
            if CommandKind::parse(key).is_err() {
                return Err(ConfigError::UnknownOverride(key.clone()));
            }
            if matches!(&script.program, Some(p) if p.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "scripts.overrides.{key}.program must not be empty"
                )));
            }
        }

        Ok(())
    }
}
