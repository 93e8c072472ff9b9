//! Test fixtures shared by the region tests
//!
//! Meshes are laid out on the XZ plane with Y up and a unit grid, so point
//! keys are the integer vertex coordinates.

use crate::config::GridMapConfig;
use crate::map::{GridMap, NavMap};
use crate::polygon::Connection;
use crate::region::Region;
use glam::Vec3;
use navmesh_common::NavigationMesh;
use std::sync::Arc;

/// Map keyed on a 1x1 grid with Y up
pub fn grid_map() -> Arc<dyn NavMap> {
    Arc::new(GridMap::new(GridMapConfig::new(1.0, 1.0)).expect("valid grid config"))
}

/// Two unit quads side by side, sharing the edge at x = 1
///
/// ```text
///  z=1  1 ---- 2 ---- 4
///       |  A   |  B   |
///  z=0  0 ---- 3 ---- 5
///      x=0    x=1    x=2
/// ```
pub fn quad_strip_mesh() -> NavigationMesh {
    NavigationMesh::from_parts(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 0.0),
        ],
        vec![vec![0, 1, 2, 3], vec![3, 2, 4, 5]],
    )
}

/// A `width` x `depth` grid of unit quads, wound clockwise about Y
pub fn quad_grid_mesh(width: usize, depth: usize) -> NavigationMesh {
    let mut mesh = NavigationMesh::new();
    for z in 0..=depth {
        for x in 0..=width {
            mesh.add_vertex(Vec3::new(x as f32, 0.0, z as f32));
        }
    }

    let stride = (width + 1) as i32;
    for z in 0..depth as i32 {
        for x in 0..width as i32 {
            let v = z * stride + x;
            mesh.add_polygon(vec![v, v + stride, v + stride + 1, v + 1]);
        }
    }
    mesh
}

/// Unsynced region bound to [`grid_map`] and `mesh`
pub fn bound_region(mesh: NavigationMesh) -> Region {
    let mut region = Region::new();
    region.set_map(Some(grid_map()));
    region.set_mesh(Some(Arc::new(mesh)));
    region
}

/// Links every pair of edges in the region whose endpoint keys match in
/// reverse, the way a map stitches adjacent polygons. Returns the number of
/// slots filled.
pub fn connect_shared_edges(region: &mut Region) -> usize {
    let mut links = Vec::new();

    for (a, poly_a) in region.polygons().iter().enumerate() {
        for edge_a in 0..poly_a.edges().len() {
            let (a0, a1) = poly_a.edge_endpoints(edge_a).expect("edge in range");
            for (b, poly_b) in region.polygons().iter().enumerate() {
                if a == b {
                    continue;
                }
                for edge_b in 0..poly_b.edges().len() {
                    let (b0, b1) = poly_b.edge_endpoints(edge_b).expect("edge in range");
                    if a0.key == b1.key && a1.key == b0.key {
                        let target = region.polygon_ref(b).expect("polygon in range");
                        links.push((
                            a,
                            edge_a,
                            Connection::new(target, edge_b).with_pathway(a0.position, a1.position),
                        ));
                    }
                }
            }
        }
    }

    let count = links.len();
    for (polygon, edge, connection) in links {
        region
            .add_edge_connection(polygon, edge, connection)
            .expect("slot in range");
    }
    count
}
