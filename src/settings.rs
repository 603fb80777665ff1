//! Application configuration passed explicitly to the components that need it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stroke::StrokeStyle;
use crate::viewport::Breakpoints;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("breakpoint {lower} must be below {upper}")]
    UnorderedBreakpoints {
        lower: &'static str,
        upper: &'static str,
    },
    #[error("{field} must be a positive finite number")]
    InvalidStroke { field: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub graphics: GraphicsSettings,
    pub breakpoints: Breakpoints,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.breakpoints.validate()?;
        self.graphics.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub light_helpers: bool,
    pub axes_helper: AxesHelper,
    pub font: FontSettings,
    /// Report per-item replay failures through the error log.
    pub error_logging: bool,
    pub stroke: StrokeStyle,
}

impl GraphicsSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;
        if !positive(self.stroke.min_sample_distance) {
            return Err(SettingsError::InvalidStroke {
                field: "min_sample_distance",
            });
        }
        if !positive(self.stroke.ribbon_half_width) {
            return Err(SettingsError::InvalidStroke {
                field: "ribbon_half_width",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesHelper {
    pub enabled: bool,
    pub axis_length: f32,
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self {
            enabled: false,
            axis_length: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    pub enabled: bool,
    pub size: f32,
    pub height: f32,
    pub curve_segments: u32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 0.75,
            height: 0.0,
            curve_segments: 1,
        }
    }
}
