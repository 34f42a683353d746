//! Run configuration for the simulation binary and tests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest grid edge the linear dispatch layout supports: thread groups are
/// laid out on a single axis as ceil(cells / 32), which must stay within
/// wgpu's 65535 workgroups-per-dimension limit.
pub const MAX_GRID_SIZE: u32 = 127;

pub const MIN_GRID_SIZE: u32 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid size {0} out of range ({MIN_GRID_SIZE}..={MAX_GRID_SIZE})")]
    GridSize(u32),
}

/// Cylindrical obstacle carved into the boundary mask before simulation starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub radius: i32,
    /// Offset from the grid's horizontal center, in cells.
    pub offset_x: i32,
    pub offset_y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Edge length of the cubic simulation grid.
    pub grid_size: u32,
    /// Velocity injected at the x-boundary inflow/outflow faces.
    pub inflow_velocity: f32,
    /// Number of density streams seeded on the mid-height plane at the inlet.
    pub density_streams: u32,
    /// Density value each stream cell is seeded with.
    pub stream_density: f32,
    pub obstacle: Option<ObstacleConfig>,
    /// Optional heightmap file imposing terrain geometry as the flow boundary.
    pub terrain: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 64,
            inflow_velocity: 2.0,
            density_streams: 10,
            stream_density: 2.0,
            obstacle: None,
            terrain: None,
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE || self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridSize(self.grid_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size, 64);
        assert_eq!(config.density_streams, 10);
    }

    #[test]
    fn rejects_out_of_range_grid() {
        let config = SimConfig {
            grid_size: 128,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::GridSize(128))));
    }

    #[test]
    fn json_round_trip() {
        let config = SimConfig {
            grid_size: 32,
            obstacle: Some(ObstacleConfig {
                radius: 10,
                offset_x: -20,
                offset_y: 0,
            }),
            ..SimConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.grid_size, 32);
        assert_eq!(back.obstacle.unwrap().offset_x, -20);
    }
}
