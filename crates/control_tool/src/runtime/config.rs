//! Optional TOML configuration for the `system_control` binary.

use crate::runtime::error::{ToolError, ToolResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SYSTEM_CONTROL_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "system_control.toml";
/// History file created under `$HOME` unless configured otherwise.
pub const DEFAULT_HISTORY_FILE: &str = ".system_control_history";
/// Maximum number of remembered history lines.
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Generic TOML-backed config loader.
///
/// Only filesystem access and deserialization happen here; callers validate the
/// typed value afterwards.
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Create a loader for `relative_path` below `root`. Absolute paths replace `root`.
    pub fn new(root: &Path, relative_path: &str) -> Self {
        Self {
            path: root.join(relative_path),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the configuration file.
    pub fn load(&self) -> ToolResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|err| {
            ToolError::config(format!("failed to read {}: {err}", self.path.display()))
        })?;
        toml::from_str(&body).map_err(|err| {
            ToolError::config(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    /// Return the config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the config file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Settings read from `system_control.toml`. Every key is optional.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Initial auto-discovery toggle.
    pub auto_discovery: bool,
    /// History file, relative to the config file; defaults to `$HOME/.system_control_history`.
    pub history_file: Option<PathBuf>,
    /// Maximum remembered history lines.
    pub history_size: usize,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// System description files announced on the in-process network.
    pub announce: Vec<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            auto_discovery: false,
            history_file: None,
            history_size: DEFAULT_HISTORY_SIZE,
            log_filter: None,
            announce: Vec::new(),
        }
    }
}

impl ToolConfig {
    /// Resolved history location, if any. Without `HOME` history stays in memory.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_HISTORY_FILE))
        })
    }

    /// Anchors relative file paths at `base`, the directory holding the config file.
    fn resolve_against(mut self, base: &Path) -> Self {
        let anchor = |path: PathBuf| if path.is_relative() { base.join(path) } else { path };
        self.announce = self.announce.into_iter().map(anchor).collect();
        self.history_file = self.history_file.map(anchor);
        self
    }
}

/// Loads the config named by [`CONFIG_ENV_VAR`], else `./system_control.toml`, else defaults.
pub fn discover() -> ToolResult<ToolConfig> {
    let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let cwd = std::env::current_dir()?;
    discover_from(explicit, &cwd)
}

/// Discovery with the explicit path and working directory supplied by the caller.
pub fn discover_from(explicit: Option<PathBuf>, cwd: &Path) -> ToolResult<ToolConfig> {
    let loader = match explicit {
        Some(path) if path.as_os_str().is_empty() => {
            return Err(ToolError::environment(format!("{CONFIG_ENV_VAR} is set but empty"))
                .with_hint("unset it or point it at a TOML file"));
        }
        Some(path) => {
            let loader = ConfigLoader::<ToolConfig>::new(cwd, &path.to_string_lossy());
            if !loader.exists() {
                return Err(ToolError::config(format!(
                    "config file named by {CONFIG_ENV_VAR} does not exist"
                ))
                .with_path(loader.path()));
            }
            loader
        }
        None => {
            let loader = ConfigLoader::<ToolConfig>::new(cwd, DEFAULT_CONFIG_FILE);
            if !loader.exists() {
                return Ok(ToolConfig::default());
            }
            loader
        }
    };
    let config = loader.load().map_err(|err| err.with_operation("load config"))?;
    let base = loader.path().parent().unwrap_or(cwd).to_path_buf();
    Ok(config.resolve_against(&base))
}
