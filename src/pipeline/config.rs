//! Pipeline configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::error::ConfigError;

/// Queue capacities for the two pipeline stages.
///
/// A full queue blocks the producer (submitting thread or transform worker)
/// until the consumer frees a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Draw calls waiting for the transform worker
    pub draw_call_capacity: usize,
    /// Triangles waiting for the rasterize worker
    pub triangle_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            draw_call_capacity: 255,
            triangle_capacity: 256,
        }
    }
}

impl PipelineConfig {
    pub fn with_capacities(draw_call_capacity: usize, triangle_capacity: usize) -> Self {
        Self { draw_call_capacity, triangle_capacity }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.draw_call_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { queue: "draw call queue" });
        }
        if self.triangle_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { queue: "triangle queue" });
        }
        Ok(())
    }

    /// Parse and validate a config from a RON string
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}

/// Load a pipeline config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    PipelineConfig::from_ron_str(&contents)
}
