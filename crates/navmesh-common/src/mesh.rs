//! Navigation mesh asset and the geometry source seam

use crate::{Error, Result};
use glam::Vec3;

#[cfg(feature = "std")]
use std::fs::File;
#[cfg(feature = "std")]
use std::io::{BufRead, BufReader};
#[cfg(feature = "std")]
use std::path::Path;

/// Read-only access to the geometry a region builds its polygons from.
///
/// Implementations are shared between a live region and any duplicate
/// rebuilding on another thread, so they must be immutable once handed out.
pub trait GeometrySource: Send + Sync {
    /// Number of vertices in the vertex buffer
    fn vertex_count(&self) -> usize;

    /// Vertex at `index`, in mesh-local space
    fn vertex_at(&self, index: usize) -> Option<Vec3>;

    /// Number of polygon faces
    fn polygon_count(&self) -> usize;

    /// Vertex indices of face `index`
    ///
    /// Indices are signed so that corrupt data (negative indices) can be
    /// represented and rejected by the builder.
    fn polygon_indices(&self, index: usize) -> &[i32];
}

/// A navigation mesh: a vertex buffer plus one index list per polygon face
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavigationMesh {
    /// The vertices of the mesh
    pub vertices: Vec<Vec3>,
    /// Vertex indices, one list per polygon
    pub polygons: Vec<Vec<i32>>,
}

impl NavigationMesh {
    /// Creates a new empty navigation mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh from existing vertex and polygon buffers
    pub fn from_parts(vertices: Vec<Vec3>, polygons: Vec<Vec<i32>>) -> Self {
        Self { vertices, polygons }
    }

    /// Appends a vertex and returns its index
    pub fn add_vertex(&mut self, vertex: Vec3) -> i32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as i32
    }

    /// Appends a polygon face
    pub fn add_polygon(&mut self, indices: Vec<i32>) {
        self.polygons.push(indices);
    }

    /// Loads a mesh from an OBJ file
    ///
    /// This method is only available when the `std` feature is enabled.
    #[cfg(feature = "std")]
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut mesh = Self::new();

        for line in reader.lines() {
            let line = line?;
            Self::parse_obj_line(&line, &mut mesh)?;
        }

        Ok(mesh)
    }

    /// Parses OBJ content from a string
    ///
    /// Faces are kept as polygons; nothing is triangulated.
    ///
    /// # Example
    ///
    /// ```
    /// use navmesh_common::{GeometrySource, NavigationMesh};
    ///
    /// let obj_content = r#"
    /// v 0.0 0.0 0.0
    /// v 1.0 0.0 0.0
    /// v 1.0 0.0 1.0
    /// v 0.0 0.0 1.0
    /// f 1 2 3 4
    /// "#;
    ///
    /// let mesh = NavigationMesh::from_obj_str(obj_content).unwrap();
    /// assert_eq!(mesh.vertex_count(), 4);
    /// assert_eq!(mesh.polygon_indices(0), &[0, 1, 2, 3]);
    /// ```
    pub fn from_obj_str(content: &str) -> Result<Self> {
        let mut mesh = Self::new();

        for line in content.lines() {
            Self::parse_obj_line(line, &mut mesh)?;
        }

        Ok(mesh)
    }

    /// Parses a single line from an OBJ file
    fn parse_obj_line(line: &str, mesh: &mut Self) -> Result<()> {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0f32; 3];
                for (axis, coord) in ["x", "y", "z"].iter().zip(coords.iter_mut()) {
                    *coord = tokens
                        .next()
                        .ok_or_else(|| {
                            Error::InvalidMesh(format!("Invalid vertex: missing {axis} coordinate"))
                        })?
                        .parse::<f32>()
                        .map_err(|_| {
                            Error::InvalidMesh(format!(
                                "Invalid vertex: {axis} coordinate is not a number"
                            ))
                        })?;
                }

                mesh.vertices.push(Vec3::from_array(coords));
            }
            Some("f") => {
                let mut face_indices = Vec::new();

                for token in tokens {
                    let index_str = token.split('/').next().ok_or_else(|| {
                        Error::InvalidMesh("Invalid face: missing vertex index".to_string())
                    })?;

                    let index = index_str.parse::<i32>().map_err(|_| {
                        Error::InvalidMesh("Invalid face: vertex index is not a number".to_string())
                    })? - 1; // OBJ indices are 1-based

                    face_indices.push(index);
                }

                if face_indices.len() < 3 {
                    return Err(Error::InvalidMesh(
                        "Invalid face: less than 3 vertices".to_string(),
                    ));
                }

                mesh.polygons.push(face_indices);
            }
            _ => {
                // Normals, texture coordinates, comments
            }
        }

        Ok(())
    }

    /// Calculates the axis-aligned bounding box of the mesh
    pub fn calculate_bounds(&self) -> (Vec3, Vec3) {
        if self.vertices.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        self.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(bmin, bmax), v| (bmin.min(*v), bmax.max(*v)),
        )
    }
}

impl GeometrySource for NavigationMesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex_at(&self, index: usize) -> Option<Vec3> {
        self.vertices.get(index).copied()
    }

    fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    fn polygon_indices(&self, index: usize) -> &[i32] {
        self.polygons.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}
