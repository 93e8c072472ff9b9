//! Configuration for grid-quantized navigation maps

use glam::Vec3;
use navmesh_common::{Error, Result};

/// Parameters controlling how a [`GridMap`](crate::GridMap) keys points
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GridMapConfig {
    /// Horizontal quantization step
    pub cell_size: f32,
    /// Vertical quantization step
    pub cell_height: f32,
    /// Up axis used as the winding reference
    pub up: Vec3,
}

impl Default for GridMapConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.3,
            cell_height: 0.2,
            up: Vec3::Y,
        }
    }
}

impl GridMapConfig {
    pub fn new(cell_size: f32, cell_height: f32) -> Self {
        Self {
            cell_size,
            cell_height,
            ..Default::default()
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_cell_height(mut self, cell_height: f32) -> Self {
        self.cell_height = cell_height;
        self
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::InvalidConfig(
                "Cell size must be positive".to_string(),
            ));
        }
        if !(self.cell_height.is_finite() && self.cell_height > 0.0) {
            return Err(Error::InvalidConfig(
                "Cell height must be positive".to_string(),
            ));
        }
        if !self.up.is_finite() || self.up.length_squared() < f32::EPSILON {
            return Err(Error::InvalidConfig(
                "Up vector must be finite and non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
