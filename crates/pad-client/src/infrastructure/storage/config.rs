//! TOML-based configuration persistence for the client application.
//!
//! Reads and writes [`PadConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\PhonepadLink\config.toml`
//! - Linux:    `~/.config/phonepad-link/config.toml`
//! - macOS:    `~/Library/Application Support/PhonepadLink/config.toml`
//!
//! Every field carries a serde default so the app works on first run
//! (before a config file exists) and when upgrading from an older file
//! that is missing newer fields.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pad_core::{GestureConfig, PadError, ScrollConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A loaded value fails a domain constraint.
    #[error(transparent)]
    Invalid(#[from] PadError),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PadConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub link: LinkTuning,
}

/// General client behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Name advertised to the host during pairing.
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Link send-rate tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkTuning {
    /// Cap on transmitted move frames per second.
    #[serde(default = "default_move_sends_per_second")]
    pub move_sends_per_second: u32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_device_name() -> String {
    "Phonepad".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_move_sends_per_second() -> u32 {
    120
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            gesture: GestureConfig::default(),
            scroll: ScrollConfig::default(),
            link: LinkTuning::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LinkTuning {
    fn default() -> Self {
        Self {
            move_sends_per_second: default_move_sends_per_second(),
        }
    }
}

impl PadConfig {
    /// Checks the domain constraints of the tunable sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a gesture or scroll value
    /// is out of range, or the move send rate is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;
        self.scroll.validate()?;
        if self.link.move_sends_per_second == 0 {
            return Err(ConfigError::Invalid(PadError::InvalidConfiguration(
                "link.move_sends_per_second must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory
/// cannot be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`PadConfig`] from disk, returning `PadConfig::default()` if the
/// file does not yet exist. Loaded values are validated.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] if a value is out of range.
pub fn load_config() -> Result<PadConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: PadConfig = toml::from_str(&content)?;
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PadConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &PadConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("PhonepadLink"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("phonepad-link"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("PhonepadLink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
