//! Map style configuration file support.
//!
//! This module provides utilities for reading the optional map style
//! overrides from TOML configuration files. A deployment can swap the nine
//! ramp stops (e.g. a different sequential palette for a dark basemap); the
//! validated result flows through the same sampling and legend paths as the
//! built-in table.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::algorithms::color_scale::{ColorRamp, InvalidHexColor, Rgb, RAMP_STOPS, YLGNBU};

/// Map style configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapStyleConfig {
    #[serde(default)]
    pub style: StyleSettings,
}

/// Ramp override settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSettings {
    /// Nine `#rrggbb` stops, light to dark.
    #[serde(default = "default_ramp_stops")]
    pub ramp_stops: Vec<String>,
}

fn default_ramp_stops() -> Vec<String> {
    YLGNBU.stops().iter().map(|stop| stop.to_hex()).collect()
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            ramp_stops: default_ramp_stops(),
        }
    }
}

/// Error type for style configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Config file could not be read.
    #[error("Failed to read style file: {0}")]
    Read(#[from] std::io::Error),

    /// Config file is not valid TOML.
    #[error("Failed to parse style file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A ramp must carry exactly nine stops so the legend band stops exist.
    #[error("Ramp must have exactly 9 stops, got {0}")]
    WrongStopCount(usize),

    /// A stop is not a `#rrggbb` string.
    #[error(transparent)]
    InvalidColor(#[from] InvalidHexColor),

    /// No config file in the standard locations.
    #[error("No map_style.toml found in standard locations")]
    NotFound,
}

impl MapStyleConfig {
    /// Load style configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(MapStyleConfig)` if successful
    /// * `Err(StyleError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StyleError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: MapStyleConfig = toml::from_str(&content)?;
        debug!("loaded map style from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load style configuration from the default location.
    ///
    /// Searches for `map_style.toml` in:
    /// 1. Current directory
    /// 2. Parent directory
    pub fn from_default_location() -> Result<Self, StyleError> {
        let search_paths = [
            PathBuf::from("map_style.toml"),
            PathBuf::from("../map_style.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(StyleError::NotFound)
    }

    /// Validate the configured stops into a color ramp.
    pub fn to_color_ramp(&self) -> Result<ColorRamp, StyleError> {
        if self.style.ramp_stops.len() != RAMP_STOPS {
            return Err(StyleError::WrongStopCount(self.style.ramp_stops.len()));
        }
        let mut stops = [Rgb::new(0, 0, 0); RAMP_STOPS];
        for (slot, hex) in stops.iter_mut().zip(&self.style.ramp_stops) {
            *slot = Rgb::from_hex(hex)?;
        }
        Ok(ColorRamp::new(stops))
    }
}
