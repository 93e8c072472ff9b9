//! Navigation region polygon building and synchronization
//!
//! A [`Region`] ties a navigation mesh and a transform to a navigation map.
//! Syncing a dirty region rebuilds its polygons: world-space points keyed by
//! the map, one connection slot list per edge, a centroid and a winding flag.
//!
//! Rebuilds can run away from the live region. [`Region::duplicate_for_sync`]
//! snapshots the configuration, the snapshot is synced on another thread, and
//! [`Region::copy_polygons_and_connections`] merges the result back while
//! rewriting every polygon reference into the live region.
//!
//! # Example
//!
//! ```rust
//! use glam::{Affine3A, Vec3};
//! use nav_region::{GridMap, GridMapConfig, NavMap, Region};
//! use navmesh_common::NavigationMesh;
//! use std::sync::Arc;
//!
//! # fn example() -> navmesh_common::Result<()> {
//! let map: Arc<dyn NavMap> = Arc::new(GridMap::new(GridMapConfig::default())?);
//! let mesh = NavigationMesh::from_obj_str(
//!     "v 0 0 0\nv 0 0 1\nv 1 0 1\nv 1 0 0\nf 1 2 3 4",
//! )?;
//!
//! let mut region = Region::new();
//! region.set_map(Some(map));
//! region.set_mesh(Some(Arc::new(mesh)));
//! region.set_transform(Affine3A::from_translation(Vec3::new(4.0, 0.0, 0.0)));
//!
//! // Off-path rebuild: snapshot, build, merge
//! let mut snapshot = region.duplicate_for_sync();
//! assert!(snapshot.sync());
//! region.copy_polygons_and_connections(&snapshot);
//!
//! assert_eq!(region.polygons().len(), 1);
//! assert_eq!(region.polygons()[0].center(), Vec3::new(4.5, 0.0, 0.5));
//! assert!(!region.sync());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod map;
pub mod polygon;
pub mod rebuild;
pub mod region;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;


pub use builder::build_polygons;
pub use config::GridMapConfig;
pub use context::{BuildStats, LogEntry, LogLevel, SyncContext, TimerCategory};
pub use map::{GridMap, NavMap, PointKey};
pub use polygon::{Connection, Edge, InstanceId, Point, Polygon, PolygonRef, RegionId};
pub use rebuild::{rebuild_detached, sync_regions};
pub use region::{Region, RegionSummary, SyncState};
pub use sync::RemapTable;
