//! Common types shared by the navigation region crates
//!
//! Holds the navigation mesh asset, the geometry source seam consumed by the
//! polygon builder, winding/centroid helpers and the shared error type.

mod geometry;
mod mesh;

pub use geometry::*;
pub use mesh::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input mesh: {0}")]
    InvalidMesh(String),

    #[error("region is not bound to a navigation map")]
    Unbound,

    #[error("connection index {index} out of bounds (count: {count})")]
    ConnectionOutOfBounds { index: usize, count: usize },

    #[error("polygon index {index} out of bounds (count: {count})")]
    PolygonOutOfBounds { index: usize, count: usize },

    #[error("edge index {index} out of bounds for polygon {polygon} (count: {count})")]
    EdgeOutOfBounds {
        polygon: usize,
        index: usize,
        count: usize,
    },

    #[error("polygon {index} of instance {owner} is not covered by the merge remap table")]
    UnmappedPolygon { owner: u64, index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("region rebuild failed: {0}")]
    Rebuild(String),

    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for navigation region operations
pub type Result<T> = std::result::Result<T, Error>;
