//! The owning map's side of the contract: point keys and the up axis

use crate::config::GridMapConfig;
use glam::Vec3;
use navmesh_common::Result;

/// Number of bits kept per axis when packing a [`PointKey`]
const KEY_AXIS_BITS: u32 = 21;
const KEY_AXIS_MASK: u64 = (1 << KEY_AXIS_BITS) - 1;

/// Canonical identifier of a world-space point
///
/// Points from different polygons (or regions) that quantize to the same
/// key are treated as coincident when the map discovers adjacency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PointKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl PointKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Packs the key into 64 bits, 21 bits per axis (two's complement).
    ///
    /// Cells further than about a million steps from the origin alias.
    pub fn packed(&self) -> u64 {
        (self.x as u64 & KEY_AXIS_MASK)
            | ((self.y as u64 & KEY_AXIS_MASK) << KEY_AXIS_BITS)
            | ((self.z as u64 & KEY_AXIS_MASK) << (2 * KEY_AXIS_BITS))
    }
}

/// Services a region needs from the navigation map it is bound to
///
/// Both methods must be pure: a region may be rebuilt on another thread
/// while the live copy keeps answering queries.
pub trait NavMap: Send + Sync {
    /// Maps a world-space position to its canonical key
    fn point_key(&self, position: Vec3) -> PointKey;

    /// Unit vector used as the winding reference
    fn up(&self) -> Vec3;
}

/// A navigation map that keys points by flooring them onto a cell grid
#[derive(Debug, Clone)]
pub struct GridMap {
    config: GridMapConfig,
    up: Vec3,
}

impl GridMap {
    /// Creates a grid map, rejecting invalid configurations
    pub fn new(config: GridMapConfig) -> Result<Self> {
        config.validate()?;
        let up = config.up.normalize();
        Ok(Self { config, up })
    }

    pub fn config(&self) -> &GridMapConfig {
        &self.config
    }
}

impl NavMap for GridMap {
    fn point_key(&self, position: Vec3) -> PointKey {
        PointKey {
            x: (position.x / self.config.cell_size).floor() as i32,
            y: (position.y / self.config.cell_height).floor() as i32,
            z: (position.z / self.config.cell_size).floor() as i32,
        }
    }

    fn up(&self) -> Vec3 {
        self.up
    }
}
