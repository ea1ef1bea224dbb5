//! Service Configuration - server, data file locations, request defaults
//!
//! Each struct implements `Default` with the built-in values from
//! `defaults.rs`, so a missing config file means zero-change behavior.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::types::{FertilizerRequest, LandUnit};

/// Environment variable holding a config file path.
pub const CONFIG_ENV_VAR: &str = "AGRIFUSION_CONFIG";

/// Environment variable overriding `server.addr`.
pub const ADDR_ENV_VAR: &str = "AGRIFUSION_SERVER_ADDR";

/// Environment variable overriding `server.cors_origins` (comma-separated).
pub const CORS_ENV_VAR: &str = "AGRIFUSION_CORS_ORIGINS";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "agrifusion.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one service deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Reference table, training data and model artifact locations
    #[serde(default)]
    pub data: DataConfig,

    /// Values substituted for omitted fertilizer query parameters
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl ServiceConfig {
    /// Load configuration using the standard search order:
    /// 1. `explicit` path (from `--config`); failures are returned
    /// 2. `$AGRIFUSION_CONFIG`
    /// 3. `./agrifusion.toml`
    /// 4. Built-in defaults
    ///
    /// Environment overrides are applied to whichever source wins.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                info!(path = %path.display(), "Loaded service config");
                config
            }
            None => Self::search(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn search() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded service config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded service config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Toml(e) => ConfigError::Parse(path.to_path_buf(), e),
            other => other,
        })
    }

    /// Parse a TOML document, warning on unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self = toml::from_str(contents).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var(ADDR_ENV_VAR) {
            info!(addr = %addr, "Server address overridden by {}", ADDR_ENV_VAR);
            self.server.addr = addr;
        }
        if let Ok(origins) = std::env::var(CORS_ENV_VAR) {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Validate every field, collecting all violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }

        let d = &self.defaults;
        if d.soil.trim().is_empty() {
            errors.push("defaults.soil must not be empty".to_string());
        }
        if !d.land_size.is_finite() || d.land_size <= 0.0 {
            errors.push(format!(
                "defaults.land_size must be a positive finite number (got {})",
                d.land_size
            ));
        }
        if !LandUnit::is_recognized(&d.land_unit) {
            errors.push(format!(
                "defaults.land_unit must be one of hectares, acres, sq_m (got '{}')",
                d.land_unit
            ));
        }
        for (name, value) in [
            ("nitrogen", d.nitrogen),
            ("phosphorus", d.phosphorus),
            ("potassium", d.potassium),
        ] {
            if !value.is_finite() {
                errors.push(format!("defaults.{name} must be finite (got {value})"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config parse error: {0}")]
    Toml(#[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            cors_origins: Vec::new(),
        }
    }
}

/// Data file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Reference dosage table CSV
    pub dose_table: PathBuf,
    /// Fertilizer classifier training CSV
    pub fertilizer_training: PathBuf,
    /// Crop classifier training CSV
    pub crop_training: PathBuf,
    /// Directory holding trained model artifacts (JSON)
    pub model_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dose_table: PathBuf::from(defaults::DOSE_TABLE_PATH),
            fertilizer_training: PathBuf::from(defaults::FERTILIZER_TRAINING_PATH),
            crop_training: PathBuf::from(defaults::CROP_TRAINING_PATH),
            model_dir: PathBuf::from(defaults::MODEL_DIR),
        }
    }
}

/// Defaults for omitted fertilizer query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub soil: String,
    pub land_size: f64,
    pub land_unit: String,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            soil: defaults::SOIL_TYPE.to_string(),
            land_size: defaults::LAND_SIZE,
            land_unit: defaults::LAND_UNIT.to_string(),
            nitrogen: defaults::NITROGEN,
            phosphorus: defaults::PHOSPHORUS,
            potassium: defaults::POTASSIUM,
        }
    }
}

impl DefaultsConfig {
    /// A request for `crop` with every other field taken from these defaults.
    pub fn request_for(&self, crop: impl Into<String>) -> FertilizerRequest {
        FertilizerRequest {
            crop_type: crop.into(),
            soil_type: self.soil.clone(),
            land_size: self.land_size,
            land_unit: self.land_unit.clone(),
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
        }
    }
}
