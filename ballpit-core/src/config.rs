//! Field configuration loaded from TOML.
//!
//! ```toml
//! count = 100
//! min_size = 0.5
//! max_size = 1.0
//! size0 = 1.0
//! gravity = 0.7
//! friction = 0.9975
//! wall_bounce = 0.95
//! max_velocity = 0.15
//! max_x = 5.0
//! max_y = 5.0
//! max_z = 2.0
//! seed = 42          # optional, omit for a fresh layout every run
//! ```
//!
//! Every key is optional and falls back to the defaults above.

use crate::bounds::Bounds;
use crate::field::{FieldError, PhysicalConstants};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Invalid(#[from] FieldError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub size0: f32,
    pub gravity: f32,
    pub friction: f32,
    pub wall_bounce: f32,
    pub max_velocity: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 100,
            min_size: 0.5,
            max_size: 1.0,
            size0: 1.0,
            gravity: 0.7,
            friction: 0.9975,
            wall_bounce: 0.95,
            max_velocity: 0.15,
            max_x: 5.0,
            max_y: 5.0,
            max_z: 2.0,
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.max_x, self.max_y, self.max_z)
    }

    pub fn constants(&self) -> PhysicalConstants {
        PhysicalConstants {
            gravity: self.gravity,
            friction: self.friction,
            wall_bounce: self.wall_bounce,
            max_velocity: self.max_velocity,
        }
    }

    /// Check everything `ParticleField::new` relies on
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.count == 0 {
            return Err(FieldError::invalid("body count must be positive"));
        }
        for (name, value) in [
            ("min_size", self.min_size),
            ("max_size", self.max_size),
            ("size0", self.size0),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FieldError::invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.min_size > self.max_size {
            return Err(FieldError::invalid(format!(
                "min_size ({}) exceeds max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if !self.bounds().is_valid() {
            return Err(FieldError::invalid(format!(
                "domain extents must be positive, got ({}, {}, {})",
                self.max_x, self.max_y, self.max_z
            )));
        }
        let largest = self.size0.max(self.max_size);
        if largest > self.bounds().min_extent() {
            return Err(FieldError::invalid(format!(
                "bodies of radius {} do not fit in extents ({}, {}, {})",
                largest, self.max_x, self.max_y, self.max_z
            )));
        }
        self.constants().validate()
    }
}
