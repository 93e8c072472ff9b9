//! Polygon geometry helpers
//!
//! Unlike the XZ-plane helpers used for voxel work, these operate about an
//! arbitrary up axis so that navigation planes need not be axis aligned.

use glam::Vec3;

/// Calculate twice the signed area of triangle `abc` projected onto the plane
/// whose normal is `up`.
///
/// The sign indicates the winding order when looking down `-up`:
/// - Positive: clockwise
/// - Negative: counter-clockwise
/// - Zero: degenerate (collinear points, or a triangle edge-on to `up`)
#[inline]
pub fn tri_area_about_axis(up: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f32 {
    up.dot((b - a).cross(c - a))
}

/// Accumulates the signed winding sum of a polygon about `up`.
///
/// For every point `j >= 2` this adds the signed area of the triangle formed
/// by points `j - 2`, `j - 1` and `j`. Fewer than three points sum to zero.
pub fn polygon_winding_sum(up: Vec3, points: &[Vec3]) -> f32 {
    points
        .windows(3)
        .map(|w| tri_area_about_axis(up, w[0], w[1], w[2]))
        .sum()
}

/// Returns true if the polygon winds clockwise about `up`.
///
/// The sum must be strictly positive; degenerate polygons are counter-clockwise.
#[inline]
pub fn is_clockwise(up: Vec3, points: &[Vec3]) -> bool {
    polygon_winding_sum(up, points) > 0.0
}

/// Arithmetic mean of the points, or zero for an empty slice.
pub fn polygon_centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}
