//! Engine configuration.
//!
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/mindtrail/engine.toml)
//! - Environment variables (MINDTRAIL_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use mindtrail_location::config::EngineConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = EngineConfig::load().expect("Failed to load config");
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mindtrail_core::defaults;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for mindtrail_core::Error {
    fn from(e: ConfigError) -> Self {
        mindtrail_core::Error::Config(e.to_string())
    }
}

/// Tunables of the location engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed radius for cluster membership, meters
    pub cluster_radius_m: f64,
    /// Radius of nearby lookups when the caller gives none, meters
    pub nearby_radius_m: f64,
    /// Upper bound on a position source call
    #[serde(with = "secs")]
    pub position_timeout: Duration,
    /// Cached current location older than this is re-acquired
    #[serde(with = "secs")]
    pub position_max_age: Duration,
    /// Where the JSON file store keeps its documents
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_radius_m: defaults::CLUSTER_RADIUS_M,
            nearby_radius_m: defaults::NEARBY_RADIUS_M,
            position_timeout: Duration::from_secs(defaults::POSITION_TIMEOUT_SECS),
            position_max_age: Duration::from_secs(defaults::POSITION_MAX_AGE_SECS),
            data_dir: Self::default_data_dir(),
        }
    }
}

/// `[engine]` table; every key optional.
#[derive(Debug, Default, Deserialize)]
struct TomlEngineConfig {
    cluster_radius_m: Option<f64>,
    nearby_radius_m: Option<f64>,
    position_timeout_secs: Option<u64>,
    position_max_age_secs: Option<u64>,
    data_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Returns: ~/.config/mindtrail/engine.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("mindtrail");
        path.push("engine.toml");
        path
    }

    /// Returns: ~/.local/share/mindtrail (platform data dir)
    pub fn default_data_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from(".local/share"));
        path.push("mindtrail");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading engine config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Self::from_env()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML document with an optional `[engine]` table.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            engine: TomlEngineConfig,
        }

        let root: TomlRoot = toml::from_str(content)?;
        let file = root.engine;
        let mut config = Self::default();

        if let Some(v) = file.cluster_radius_m {
            config.cluster_radius_m = v;
        }
        if let Some(v) = file.nearby_radius_m {
            config.nearby_radius_m = v;
        }
        if let Some(v) = file.position_timeout_secs {
            config.position_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.position_max_age_secs {
            config.position_max_age = Duration::from_secs(v);
        }
        if let Some(v) = file.data_dir {
            config.data_dir = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var::<f64, _>(&lookup, "MINDTRAIL_CLUSTER_RADIUS_M")? {
            config.cluster_radius_m = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "MINDTRAIL_NEARBY_RADIUS_M")? {
            config.nearby_radius_m = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "MINDTRAIL_POSITION_TIMEOUT_SECS")? {
            config.position_timeout = Duration::from_secs(v);
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "MINDTRAIL_POSITION_MAX_AGE_SECS")? {
            config.position_max_age = Duration::from_secs(v);
        }
        if let Some(v) = lookup("MINDTRAIL_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("cluster_radius_m", self.cluster_radius_m),
            ("nearby_radius_m", self.nearby_radius_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be a positive number of meters, got {}",
                    name, value
                )));
            }
        }

        if self.position_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "position_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> ConfigResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
