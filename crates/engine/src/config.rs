//! Pipeline configuration that is not part of the user-facing settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Engine-level knobs threaded explicitly through every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Side length of the square output footprint, mm
    pub world_size: f64,
    /// Decimal digits kept when matching segment endpoints during stitching
    pub stitch_precision: u32,
    /// Close heightfield reliefs with skirt walls and a bottom face
    pub relief_skirt: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            world_size: 100.0,
            stitch_precision: 2,
            relief_skirt: true,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// `config.json` in the platform config directory, if one can be determined.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "relief").map(|d| d.config_dir().join("config.json"))
    }

    /// Multiplier applied to coordinates before rounding to a stitch key.
    pub fn stitch_scale(&self) -> f64 {
        10f64.powi(self.stitch_precision.min(9) as i32)
    }
}
