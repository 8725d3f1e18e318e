//! Typed service configuration, loaded once at startup.
//!
//! The configuration file is TOML and mirrors the ringserver deployment it
//! reads from: the `[mseed]` section carries the archive's file-naming
//! template (the same pattern handed to ringserver's `MSeedWrite` setting),
//! and `[ringserver]` records where the writer lives. All fields are
//! validated in one pass; a bad configuration is fatal before the listener
//! ever binds.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::archive::paths;

/// Default fixed record length for legacy miniSEED archives.
pub const DEFAULT_RECORD_SIZE: usize = 512;

/// Process-lifetime configuration. Immutable after [`ServiceConfig::load`].
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub dataselect: DataselectConfig,
    pub mseed: MseedConfig,
    #[serde(default)]
    pub ringserver: RingserverConfig,
    #[serde(default)]
    pub server: HttpConfig,
}

/// `[dataselect]` - query limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataselectConfig {
    /// Maximum query window in hours.
    pub maxqueryhours: i64,
}

impl Default for DataselectConfig {
    fn default() -> Self {
        Self { maxqueryhours: 24 }
    }
}

/// `[mseed]` - archive layout.
#[derive(Debug, Clone, Deserialize)]
pub struct MseedConfig {
    /// File-naming template with `%n`/`%s`/`%l`/`%c` channel tokens and
    /// strftime date directives, e.g.
    /// `/data/archive/%Y/%n/%s/%s.%n.%l.%c.%Y.%j.%H`.
    /// Accepts the legacy ringserver key spelling.
    #[serde(alias = "MSeedWrite")]
    pub mseed_write: String,

    /// Fixed record length in bytes. Archives written by ringserver use
    /// 512-byte records unless configured otherwise.
    #[serde(default = "default_record_size")]
    pub record_size: usize,
}

fn default_record_size() -> usize {
    DEFAULT_RECORD_SIZE
}

/// `[ringserver]` - the archive-producing writer. Informational only; the
/// service never connects to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RingserverConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RingserverConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 80,
        }
    }
}

/// `[server]` - HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9090,
            static_dir: PathBuf::from("./public"),
        }
    }
}

/// Fatal startup-time configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("mseed_write template is not usable: {reason}")]
    BadTemplate { reason: String },

    #[error("record_size {0} is not a power of two between 128 and 65536")]
    BadRecordSize(usize),

    #[error("maxqueryhours must be at least 1, got {0}")]
    BadMaxQueryHours(i64),
}

impl ServiceConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check field-level invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        paths::validate_template(&self.mseed.mseed_write)
            .map_err(|reason| ConfigError::BadTemplate { reason })?;

        let size = self.mseed.record_size;
        if !size.is_power_of_two() || !(128..=65536).contains(&size) {
            return Err(ConfigError::BadRecordSize(size));
        }

        if self.dataselect.maxqueryhours < 1 {
            return Err(ConfigError::BadMaxQueryHours(self.dataselect.maxqueryhours));
        }

        Ok(())
    }
}
