//! Polygons, edges and connections built from a region's mesh

use crate::map::PointKey;
use glam::Vec3;
use navmesh_common::{is_clockwise, polygon_centroid};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Logical identity of a region, shared by a region and its duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RegionId(pub u64);

impl RegionId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of one physical region value
///
/// Every `Region` gets a fresh instance id, including duplicates made for
/// an off-path rebuild. Polygon ownership and connection targets are keyed
/// by instance so that a merge can tell source polygons from its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a polygon inside a specific region instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PolygonRef {
    /// Region instance holding the polygon
    pub owner: InstanceId,
    /// Position in the owner's polygon list
    pub index: usize,
}

impl PolygonRef {
    pub fn new(owner: InstanceId, index: usize) -> Self {
        Self { owner, index }
    }
}

/// A polygon vertex in world space together with its spatial key
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Point {
    pub position: Vec3,
    pub key: PointKey,
}

/// Link from an edge (or from a region) to an edge of another polygon
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Connection {
    /// The polygon on the other side
    pub polygon: PolygonRef,
    /// Edge index on that polygon
    pub edge: usize,
    /// Start of the shared boundary, used as a path waypoint
    pub pathway_start: Vec3,
    /// End of the shared boundary, used as a path waypoint
    pub pathway_end: Vec3,
}

impl Connection {
    pub fn new(polygon: PolygonRef, edge: usize) -> Self {
        Self {
            polygon,
            edge,
            pathway_start: Vec3::ZERO,
            pathway_end: Vec3::ZERO,
        }
    }

    pub fn with_pathway(mut self, start: Vec3, end: Vec3) -> Self {
        self.pathway_start = start;
        self.pathway_end = end;
        self
    }
}

/// Boundary segment of a polygon; edge `i` runs from point `i` to point `i + 1`
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Edge {
    /// Links to adjacent edges, filled in by the map
    pub connections: Vec<Connection>,
}

/// A navigable face of a region
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Polygon {
    pub(crate) owner: InstanceId,
    points: Vec<Point>,
    pub(crate) edges: Vec<Edge>,
    center: Vec3,
    clockwise: bool,
}

impl Polygon {
    /// Creates a polygon from resolved world-space points.
    ///
    /// Centroid and winding are derived here and never set afterwards.
    pub(crate) fn from_points(owner: InstanceId, points: Vec<Point>, up: Vec3) -> Self {
        let positions: Vec<Vec3> = points.iter().map(|p| p.position).collect();
        let edges = vec![Edge::default(); points.len()];

        Self {
            owner,
            center: polygon_centroid(&positions),
            clockwise: is_clockwise(up, &positions),
            points,
            edges,
        }
    }

    /// Instance of the region holding this polygon
    pub fn owner(&self) -> InstanceId {
        self.owner
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Edges, index-aligned with [`points`](Self::points)
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Mean of the polygon's points
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Winding about the map's up axis at build time
    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    /// Start and end point of edge `edge`, wrapping at the last point
    pub fn edge_endpoints(&self, edge: usize) -> Option<(&Point, &Point)> {
        let n = self.points.len();
        if edge >= n {
            return None;
        }
        Some((&self.points[edge], &self.points[(edge + 1) % n]))
    }

    /// Iterates every connection target referenced from this polygon's edges
    pub fn connection_targets(&self) -> impl Iterator<Item = PolygonRef> + '_ {
        self.edges
            .iter()
            .flat_map(|edge| edge.connections.iter().map(|c| c.polygon))
    }

    /// Compares geometry only: points, keys, centroid and winding.
    pub fn same_geometry(&self, other: &Polygon) -> bool {
        self.points == other.points
            && self.center == other.center
            && self.clockwise == other.clockwise
    }
}
