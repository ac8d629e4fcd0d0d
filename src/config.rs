use std::path::{Path, PathBuf};

use os_api::GpuPreference;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "bootstrap.json";

pub const HEADLESS_ENV: &str = "ENGINE_BOOTSTRAP_HEADLESS";
pub const NO_GPU_PROFILE_ENV: &str = "ENGINE_BOOTSTRAP_NO_GPU_PROFILE";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup settings, read from `bootstrap.json` next to the executable.
///
/// The file is optional and never written back.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// GPU the executable should be registered for. `None` skips the step.
    pub gpu_preference: Option<GpuPreference>,
    /// Relaunch right away after the GPU preference changed.
    pub restart_on_profile_change: bool,
    /// Log fatal errors instead of showing dialogs.
    pub headless: bool,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            gpu_preference: Some(GpuPreference::HighPerformance),
            // A relaunch gets a new PID there, which parent launchers lose track of.
            restart_on_profile_change: !cfg!(target_os = "windows"),
            headless: cfg!(feature = "headless"),
            log_filter: "info".to_string(),
        }
    }
}

fn env_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl BootstrapConfig {
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .map(|mut p| {
                p.set_file_name(CONFIG_FILE_NAME);
                p
            })
            .unwrap_or_else(|_| CONFIG_FILE_NAME.into())
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides, looking variables up through `var`.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var(HEADLESS_ENV) {
            self.headless = env_flag(&value);
        }
        if var(NO_GPU_PROFILE_ENV).is_some_and(|v| env_flag(&v)) {
            self.gpu_preference = None;
        }
        // Profiling and headless builds always skip the GPU step.
        if cfg!(feature = "headless") {
            self.gpu_preference = None;
        }
    }

    /// Loads the file beside the executable and applies the process environment.
    ///
    /// A broken file still produces a usable config; the error is handed back
    /// so it can be logged once logging is up.
    pub fn load() -> (Self, Option<ConfigError>) {
        let (mut config, error) = match Self::from_path(&Self::default_path()) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        (config, error)
    }
}
