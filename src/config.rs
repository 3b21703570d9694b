//! Engine configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for a human-readable settings file.

use crate::input::Pose;
use crate::rasterizer::{FAR_PLANE, NEAR_LIMIT, NEAR_PLANE};
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

/// Startup settings. Every field has a default, so a partial file or
/// no file at all is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub near: f64,
    pub far: f64,
    pub start_pose: Pose,
    pub depth_test: bool,
    pub depth_overlay: bool,
    pub particle_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            near: NEAR_PLANE,
            far: FAR_PLANE,
            start_pose: Pose::default(),
            depth_test: true,
            depth_overlay: true,
            particle_seed: None,
        }
    }
}

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

/// Load the config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load the config if the file exists, otherwise fall back to defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        Ok(EngineConfig::default())
    }
}

/// Save the config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &EngineConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load the config from a RON string (for embedded defaults or testing)
pub fn load_config_from_str(s: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = ron::from_str(s)?;
    validate(&config)?;
    Ok(config)
}

/// Range checks for loaded values the projection math consumes raw.
fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let pose = config.start_pose;
    let fields = [
        config.near,
        config.far,
        pose.x,
        pose.y,
        pose.z,
        pose.pitch,
        pose.yaw,
    ];
    if fields.iter().any(|v| !v.is_finite()) {
        return Err(ConfigError::ValidationError(
            "every numeric field must be finite".to_string(),
        ));
    }
    // a projected point's w is 1 - 2*near*z, which vanishes at
    // z = 1/(2*near); near has to keep that plane inside the near
    // cull, or points that survive the cull divide by zero
    if config.near <= 0.5 / NEAR_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "near plane {} must exceed {}",
            config.near,
            0.5 / NEAR_LIMIT
        )));
    }
    if config.far <= config.near {
        return Err(ConfigError::ValidationError(format!(
            "far plane {} must exceed the near plane {}",
            config.far, config.near
        )));
    }
    if !(config.far + config.near).is_finite() || !(2.0 * config.near * config.far).is_finite() {
        return Err(ConfigError::ValidationError(
            "near and far are too large to fold into the projection".to_string(),
        ));
    }
    Ok(())
}
