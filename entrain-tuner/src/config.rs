//! Service configuration resolution
//!
//! Process-level configuration (bind address, data directory, poll
//! cadence, recognizer endpoint) resolves ENV over TOML over defaults.
//! Domain parameters (review flow, entity-list location, ...) are not
//! configured here; they live in the settings table and load into
//! `db::params::TunerParams` at startup.

use entrain_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5761";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Optional TOML configuration file contents
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub data_dir: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub recognizer_url: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct TunerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Directory holding the database and the filesystem object store
    pub data_dir: PathBuf,
    /// Completion-poll cadence while the gate is open
    pub poll_interval_secs: u64,
    /// Base URL of the external recognizer service
    pub recognizer_url: String,
}

impl TunerConfig {
    /// Resolve configuration: ENV → TOML file → defaults
    ///
    /// The recognizer endpoint has no sensible default and must come
    /// from one of the two sources.
    pub fn resolve() -> Result<Self> {
        let toml_config = Self::load_toml_config();

        let bind_addr = std::env::var("ENTRAIN_BIND_ADDR")
            .ok()
            .or(toml_config.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let data_dir = std::env::var("ENTRAIN_DATA_DIR")
            .ok()
            .or(toml_config.data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./entrain-data"));

        let poll_interval_secs = match std::env::var("ENTRAIN_POLL_INTERVAL_SECS").ok() {
            Some(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("ENTRAIN_POLL_INTERVAL_SECS is not a number: {raw}"))
            })?,
            None => toml_config
                .poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        };

        let recognizer_url = std::env::var("ENTRAIN_RECOGNIZER_URL")
            .ok()
            .or(toml_config.recognizer_url)
            .ok_or_else(|| {
                Error::Config(
                    "Recognizer endpoint not configured. Set ENTRAIN_RECOGNIZER_URL or \
                     recognizer_url in the TOML config"
                        .to_string(),
                )
            })?;

        Ok(Self {
            bind_addr,
            data_dir,
            poll_interval_secs,
            recognizer_url,
        })
    }

    /// Path of the SQLite database inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("entrain.db")
    }

    /// Root of the filesystem object store inside the data directory
    pub fn store_root(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    fn load_toml_config() -> TomlConfig {
        let path = match std::env::var("ENTRAIN_CONFIG") {
            Ok(explicit) => PathBuf::from(explicit),
            Err(_) => match default_config_path() {
                Some(path) => path,
                None => return TomlConfig::default(),
            },
        };

        if !path.exists() {
            return TomlConfig::default();
        }

        match read_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| Path::new(&home).join(".config/entrain/tuner.toml"))
}

fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {e}")))
}
