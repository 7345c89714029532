//! Scene files: a `[field]` table for the simulation plus viewer styling.

use ballpit_core::{ConfigError, FieldConfig, FieldError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Drive body 0 from the pointer. When off, body 0 is hidden.
    pub follow_cursor: bool,
    /// Gradient stops as 0xRRGGBB, spread across body indices
    pub colors: Vec<u32>,
    /// Visible world height used to derive bounds from the window aspect
    pub view_height: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            follow_cursor: true,
            colors: vec![0x6366f1, 0x8b5cf6, 0xec4899],
            view_height: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub field: FieldConfig,
    pub viewer: ViewerConfig,
}

impl SceneFile {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let scene: Self = toml::from_str(source)?;
        scene.field.validate()?;
        let height = scene.viewer.view_height;
        if !(height.is_finite() && height > 0.0) {
            return Err(FieldError::InvalidConfiguration(format!(
                "view_height must be positive, got {}",
                height
            ))
            .into());
        }
        Ok(scene)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
