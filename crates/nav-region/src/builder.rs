//! Polygon building from navigation mesh geometry
//!
//! Turns each face of a [`GeometrySource`] into a [`Polygon`]: vertices are
//! transformed into world space, keyed through the map, and the centroid and
//! winding are derived. A face that references a vertex outside the buffer
//! is skipped with a diagnostic; the rest of the mesh still builds.

use crate::context::{BuildStats, SyncContext, TimerCategory};
use crate::map::NavMap;
use crate::polygon::{InstanceId, Point, Polygon};
use glam::Affine3A;
use navmesh_common::{Error, GeometrySource, Result};

/// Category used for builder diagnostics in a [`SyncContext`]
pub const GEOMETRY_LOG_CATEGORY: &str = "geometry";

/// Builds the polygon list for one region instance.
///
/// The result depends only on the arguments, so building twice from the same
/// inputs yields identical polygons.
pub fn build_polygons(
    owner: InstanceId,
    transform: &Affine3A,
    mesh: &dyn GeometrySource,
    map: &dyn NavMap,
    context: &mut SyncContext,
) -> Vec<Polygon> {
    context.start_timer(TimerCategory::Build);

    let face_count = mesh.polygon_count();
    let mut stats = BuildStats {
        faces: face_count,
        ..Default::default()
    };
    let mut polygons = Vec::with_capacity(face_count);

    if mesh.vertex_count() > 0 {
        for face in 0..face_count {
            match build_face(owner, transform, mesh, map, face) {
                Ok(polygon) => polygons.push(polygon),
                Err(err) => {
                    stats.skipped_faces += 1;
                    context.log_warning_with_category(
                        format!("Skipping malformed navigation mesh face: {err}"),
                        GEOMETRY_LOG_CATEGORY,
                    );
                }
            }
        }
    }

    stats.polygons = polygons.len();
    log::debug!(
        "Built {} polygons from {} faces ({} skipped)",
        stats.polygons,
        stats.faces,
        stats.skipped_faces
    );

    context.record_build(stats);
    context.stop_timer(TimerCategory::Build);
    polygons
}

/// Resolves a single face into a polygon, or reports why it can't be.
fn build_face(
    owner: InstanceId,
    transform: &Affine3A,
    mesh: &dyn GeometrySource,
    map: &dyn NavMap,
    face: usize,
) -> Result<Polygon> {
    let vertex_count = mesh.vertex_count();
    let indices = mesh.polygon_indices(face);

    let points = indices
        .iter()
        .map(|&index| {
            let vertex = usize::try_from(index)
                .ok()
                .filter(|&i| i < vertex_count)
                .and_then(|i| mesh.vertex_at(i))
                .ok_or_else(|| {
                    Error::InvalidMesh(format!(
                        "face {face} references vertex {index} (vertex count: {vertex_count})"
                    ))
                })?;

            let position = transform.transform_point3(vertex);
            Ok(Point {
                position,
                key: map.point_key(position),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon::from_points(owner, points, map.up()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridMapConfig;
    use crate::map::{GridMap, PointKey};
    use glam::{Quat, Vec3};
    use navmesh_common::NavigationMesh;

    fn grid_map() -> GridMap {
        GridMap::new(GridMapConfig::new(1.0, 1.0)).unwrap()
    }

    fn triangle_mesh(indices: Vec<i32>) -> NavigationMesh {
        NavigationMesh::from_parts(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 3.0),
                Vec3::new(3.0, 0.0, 0.0),
            ],
            vec![indices],
        )
    }

    #[test]
    fn test_triangle_positive_orientation_is_clockwise() {
        let mut context = SyncContext::new();
        let polygons = build_polygons(
            InstanceId::next(),
            &Affine3A::IDENTITY,
            &triangle_mesh(vec![0, 1, 2]),
            &grid_map(),
            &mut context,
        );

        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].is_clockwise());
    }

    #[test]
    fn test_reversed_indices_flip_winding() {
        let mut context = SyncContext::new();
        let polygons = build_polygons(
            InstanceId::next(),
            &Affine3A::IDENTITY,
            &triangle_mesh(vec![2, 1, 0]),
            &grid_map(),
            &mut context,
        );

        assert!(!polygons[0].is_clockwise());
    }

    #[test]
    fn test_transform_applies_to_points_and_center() {
        let transform = Affine3A::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 2.0, -4.0),
        );
        let mesh = triangle_mesh(vec![0, 1, 2]);
        let mut context = SyncContext::new();

        let polygons =
            build_polygons(InstanceId::next(), &transform, &mesh, &grid_map(), &mut context);
        let polygon = &polygons[0];

        let expected: Vec<Vec3> = mesh
            .vertices
            .iter()
            .map(|v| transform.transform_point3(*v))
            .collect();
        for (point, expected) in polygon.points().iter().zip(&expected) {
            assert!(point.position.abs_diff_eq(*expected, 1e-5));
        }

        let mean = expected.iter().copied().sum::<Vec3>() / 3.0;
        assert!(polygon.center().abs_diff_eq(mean, 1e-5));
        // Rotation about the up axis keeps the winding
        assert!(polygon.is_clockwise());
    }

    #[test]
    fn test_points_are_keyed_by_map() {
        let mesh = NavigationMesh::from_parts(
            vec![
                Vec3::new(0.5, 0.0, 0.5),
                Vec3::new(0.5, 0.0, 2.5),
                Vec3::new(2.5, 0.0, 0.5),
            ],
            vec![vec![0, 1, 2]],
        );
        let mut context = SyncContext::new();

        let polygons = build_polygons(
            InstanceId::next(),
            &Affine3A::IDENTITY,
            &mesh,
            &grid_map(),
            &mut context,
        );

        let keys: Vec<PointKey> = polygons[0].points().iter().map(|p| p.key).collect();
        assert_eq!(
            keys,
            vec![
                PointKey::new(0, 0, 0),
                PointKey::new(0, 0, 2),
                PointKey::new(2, 0, 0)
            ]
        );
    }

    #[test]
    fn test_out_of_range_face_is_skipped() {
        let mut mesh = triangle_mesh(vec![0, 1, 2]);
        mesh.add_polygon(vec![0, 1, 7]);
        mesh.add_polygon(vec![-1, 1, 2]);
        mesh.add_polygon(vec![2, 1, 0]);
        let owner = InstanceId::next();
        let mut context = SyncContext::new();

        let polygons =
            build_polygons(owner, &Affine3A::IDENTITY, &mesh, &grid_map(), &mut context);

        assert_eq!(polygons.len(), 2);
        assert!(polygons[0].is_clockwise());
        assert!(!polygons[1].is_clockwise());
        assert!(polygons.iter().all(|p| p.owner() == owner));

        let stats = context.stats();
        assert_eq!(stats.faces, 4);
        assert_eq!(stats.polygons, 2);
        assert_eq!(stats.skipped_faces, 2);
        assert_eq!(
            context.get_logs_by_category(GEOMETRY_LOG_CATEGORY).len(),
            2
        );
    }

    #[test]
    fn test_empty_vertex_buffer_builds_nothing() {
        let mesh = NavigationMesh::from_parts(Vec::new(), vec![vec![0, 1, 2]]);
        let mut context = SyncContext::new();

        let polygons = build_polygons(
            InstanceId::next(),
            &Affine3A::IDENTITY,
            &mesh,
            &grid_map(),
            &mut context,
        );

        assert!(polygons.is_empty());
        assert_eq!(context.stats().skipped_faces, 0);
    }

    #[test]
    fn test_empty_face_has_zero_center() {
        let mesh = NavigationMesh::from_parts(vec![Vec3::ONE], vec![Vec::new()]);
        let mut context = SyncContext::new();

        let polygons = build_polygons(
            InstanceId::next(),
            &Affine3A::IDENTITY,
            &mesh,
            &grid_map(),
            &mut context,
        );

        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].points().is_empty());
        assert_eq!(polygons[0].center(), Vec3::ZERO);
        assert!(!polygons[0].is_clockwise());
    }
}
