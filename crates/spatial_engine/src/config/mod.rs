//! Configuration system
//!
//! Configuration files are TOML or RON, chosen by extension. Everything the
//! partition layer needs at construction time lives in [`SpatialConfig`].

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::physics::collision::Aabb;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a region's spatial partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Minimum corner of the region
    pub region_min: Vec3,
    /// Maximum corner of the region
    pub region_max: Vec3,
    /// Smallest node radius the quadtrees subdivide down to
    pub min_node_radius: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            region_min: Vec3::new(-8192.0, -8192.0, -2048.0),
            region_max: Vec3::new(8192.0, 8192.0, 2048.0),
            min_node_radius: 64.0,
        }
    }
}

impl Config for SpatialConfig {}

impl SpatialConfig {
    /// Region bounds as an AABB
    pub fn region_bounds(&self) -> Aabb {
        Aabb::new(self.region_min, self.region_max)
    }

    /// Check that the values describe a usable partition
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.region_bounds().is_valid() {
            return Err(ConfigError::Invalid(format!(
                "region_min {:?} exceeds region_max {:?}",
                self.region_min, self.region_max
            )));
        }
        if self.min_node_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_node_radius must be positive, got {}",
                self.min_node_radius
            )));
        }
        Ok(())
    }
}
