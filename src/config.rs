use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "psd-converter.toml";

pub const ENV_UPLOAD_DIR: &str = "PSD_CONVERTER_UPLOAD_DIR";
pub const ENV_DOWNLOAD_DIR: &str = "PSD_CONVERTER_DOWNLOAD_DIR";
pub const ENV_SETTLE_MS: &str = "PSD_CONVERTER_SETTLE_MS";

/// Runtime configuration, passed explicitly to every mode.
///
/// Layered as: defaults, then `psd-converter.toml`, then environment
/// variables, then command-line flags.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConverterConfig {
    /// Where PSD copies and converted PNGs are written.
    pub upload_dir: PathBuf,
    /// Where ZIP bundles are written.
    pub download_dir: PathBuf,
    /// Fixed pause before a detected file is touched.
    pub settle_delay_ms: u64,
    /// Interval between size checks once the fixed pause has elapsed.
    pub settle_poll_ms: u64,
    /// Upper bound on size checks before proceeding anyway.
    pub settle_max_polls: u32,
    /// Additional path patterns to skip when locating files.
    pub exclude: Option<Vec<String>>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("upload"),
            download_dir: PathBuf::from("download"),
            settle_delay_ms: 1000,
            settle_poll_ms: 200,
            settle_max_polls: 10,
            exclude: None,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from `path`, or from `psd-converter.toml` in the
    /// working directory when no path is given.
    ///
    /// Returns the defaults if the file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        "failed to parse {}: {err}. Using defaults.",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                warn!(
                    "failed to read {}: {err}. Using defaults.",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored,
    /// as is a settle delay that is not a number.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_UPLOAD_DIR) {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(ENV_DOWNLOAD_DIR) {
            self.download_dir = PathBuf::from(dir);
        }
        if let Some(ms) = get(ENV_SETTLE_MS) {
            match ms.trim().parse::<u64>() {
                Ok(ms) => self.settle_delay_ms = ms,
                Err(_) => warn!("ignoring {ENV_SETTLE_MS}={ms}: not a number of milliseconds"),
            }
        }
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }
}
