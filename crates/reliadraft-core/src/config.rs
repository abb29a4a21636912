//! Editor configuration.

use crate::element::{BlockElement, Element, Units};
use crate::geometry::SHIFT_LOCKING_ANGLE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for drawing and dragging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Angle increment (radians) for locked linear drawing.
    pub shift_locking_angle: f64,
    /// Size of a block placed with a single click.
    pub default_block_width: f64,
    pub default_block_height: f64,
    pub default_units: Units,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            shift_locking_angle: SHIFT_LOCKING_ANGLE,
            default_block_width: 100.0,
            default_block_height: 50.0,
            default_units: Units::Hour,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// A block of the default size at `(x, y)`, for click-to-place.
    pub fn new_block(&self, x: f64, y: f64, name: impl Into<String>) -> Element {
        let mut attributes = BlockElement::named(name);
        attributes.units = self.default_units;
        Element::block(x, y, self.default_block_width, self.default_block_height, attributes)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("shiftLockingAngle", self.shift_locking_angle),
            ("defaultBlockWidth", self.default_block_width),
            ("defaultBlockHeight", self.default_block_height),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                log::warn!("rejecting config: {} = {}", field, value);
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
