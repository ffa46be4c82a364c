//! Shared configuration for the interfone tools.
//!
//! A single TOML file plus `INTERFONE_*` environment overrides,
//! resolved through figment. Paths default to platform conventions via
//! `directories`; the exchange-facing defaults match a stock Asterisk
//! layout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for environment variable overrides (`INTERFONE_DATA_FILE`,
/// `INTERFONE_ASTERISK_BIN`, ...).
const ENV_PREFIX: &str = "INTERFONE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Everything the tools need to find their files and talk to the
/// exchange.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Persisted directory (apartments + residents), JSON.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Generated credential/address artifact consumed by the exchange.
    #[serde(default = "default_endpoints_file")]
    pub endpoints_file: PathBuf,

    /// Generated routing artifact consumed by the exchange.
    #[serde(default = "default_dialplan_file")]
    pub dialplan_file: PathBuf,

    /// Exchange control client binary.
    #[serde(default = "default_asterisk_bin")]
    pub asterisk_bin: PathBuf,

    /// Bound on every control command (queries, reload, restart).
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Dashboard refresh cadence for `watch`.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Dialplan context the generated endpoints land in.
    #[serde(default = "default_dial_context")]
    pub dial_context: String,

    /// Identities owned by the exchange gateway (front desk etc.) --
    /// never assignable to an apartment or resident.
    #[serde(default)]
    pub reserved_identities: Vec<String>,

    /// Total ring time for newly created apartments.
    #[serde(default = "default_ring_seconds")]
    pub default_ring_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            endpoints_file: default_endpoints_file(),
            dialplan_file: default_dialplan_file(),
            asterisk_bin: default_asterisk_bin(),
            command_timeout_secs: default_command_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            dial_context: default_dial_context(),
            reserved_identities: Vec::new(),
            default_ring_seconds: default_ring_seconds(),
        }
    }
}

impl Config {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

fn default_data_file() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from("interfone-directory.json"),
        |dirs| dirs.data_dir().join("directory.json"),
    )
}

fn default_endpoints_file() -> PathBuf {
    PathBuf::from("/etc/asterisk/pjsip_interfone.conf")
}

fn default_dialplan_file() -> PathBuf {
    PathBuf::from("/etc/asterisk/extensions_interfone.conf")
}

fn default_asterisk_bin() -> PathBuf {
    PathBuf::from("asterisk")
}

fn default_command_timeout_secs() -> u64 {
    10
}

fn default_refresh_interval_secs() -> u64 {
    1
}

fn default_dial_context() -> String {
    "interfone-ctx".into()
}

fn default_ring_seconds() -> u32 {
    20
}

// ── Config file path ────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "interfone", "interfone")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("interfone");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load configuration from an explicit path (or the default location),
/// layered under `INTERFONE_*` environment overrides. A missing file
/// yields the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}

/// Write the config as TOML, creating parent directories as needed.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = toml::to_string_pretty(config)?;
    std::fs::write(path, rendered)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.dial_context, "interfone-ctx");
        assert_eq!(config.command_timeout_secs, 10);
        assert!(config.reserved_identities.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
dial_context = "lobby"
reserved_identities = ["100", "911"]
refresh_interval_secs = 5
"#,
        )
        .unwrap();

        let config = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(config.dial_context, "lobby");
        assert_eq!(config.reserved_identities, ["100", "911"]);
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        // Untouched keys keep their defaults.
        assert_eq!(config.command_timeout_secs, 10);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.dial_context = "custom-ctx".into();
        save_config(&config, &path).unwrap();

        let loaded = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(loaded.dial_context, "custom-ctx");
    }

    #[test]
    fn zero_intervals_are_clamped() {
        let config = Config {
            command_timeout_secs: 0,
            refresh_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.command_timeout(), Duration::from_secs(1));
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
