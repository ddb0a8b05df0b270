/// Geometry primitives for triangulated surface meshes
use nalgebra::{Point3, Vector3};

use crate::transform::RigidTransform;

/// An indexed triangle mesh: vertex positions plus faces of vertex indices.
///
/// Face indices are assumed to be in bounds; the loader is responsible for
/// rejecting malformed input. Degenerate (zero-area) faces are tolerated
/// and carry no weight in downstream computations.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Append a free-standing triangle: three new vertices plus one face.
    ///
    /// STL facets arrive as unconnected corner triples, so the loader uses
    /// this without any vertex welding.
    pub fn add_triangle(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
        let base = self.vertices.len() as u32;
        self.vertices.push(a);
        self.vertices.push(b);
        self.vertices.push(c);
        self.faces.push([base, base + 1, base + 2]);
    }

    /// Fetch the three corner positions of a face.
    pub fn corners(&self, face: usize) -> [Point3<f32>; 3] {
        let [i, j, k] = self.faces[face];
        [
            self.vertices[i as usize],
            self.vertices[j as usize],
            self.vertices[k as usize],
        ]
    }

    /// Unit normal of a face, or the zero vector for degenerate faces.
    pub fn face_normal(&self, face: usize) -> Vector3<f32> {
        let [a, b, c] = self.corners(face);
        let edge1 = b - a;
        let edge2 = c - a;
        edge1
            .cross(&edge2)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Axis-aligned bounding box, or `None` for a mesh with no vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        Some((min, max))
    }

    /// Length of the bounding-box diagonal, used as the scale reference for
    /// degeneracy tolerances. Zero for an empty mesh.
    pub fn bounding_box_diagonal(&self) -> f64 {
        match self.bounding_box() {
            Some((min, max)) => {
                let dx = f64::from(max.x - min.x);
                let dy = f64::from(max.y - min.y);
                let dz = f64::from(max.z - min.z);
                (dx * dx + dy * dy + dz * dz).sqrt()
            }
            None => 0.0,
        }
    }

    /// Apply a rigid transform out of place, producing a new mesh with the
    /// same topology. The original mesh is left untouched.
    pub fn transformed(&self, transform: &RigidTransform) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| {
                let p = Point3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z));
                let q = transform.apply_point(&p);
                Point3::new(q.x as f32, q.y as f32, q.z as f32)
            })
            .collect();
        Mesh {
            vertices,
            faces: self.faces.clone(),
        }
    }

    /// Translate every vertex by a fixed offset, out of place.
    pub fn translated(&self, offset: Vector3<f32>) -> Mesh {
        Mesh {
            vertices: self.vertices.iter().map(|v| v + offset).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Create an axis-aligned box mesh centered at the origin.
    pub fn cuboid(sx: f32, sy: f32, sz: f32) -> Self {
        let hx = sx / 2.0;
        let hy = sy / 2.0;
        let hz = sz / 2.0;

        let vertices = vec![
            Point3::new(-hx, -hy, -hz),
            Point3::new(hx, -hy, -hz),
            Point3::new(hx, hy, -hz),
            Point3::new(-hx, hy, -hz),
            Point3::new(-hx, -hy, hz),
            Point3::new(hx, -hy, hz),
            Point3::new(hx, hy, hz),
            Point3::new(-hx, hy, hz),
        ];

        // Two triangles per side, wound counter-clockwise seen from
        // outside. Opposite sides split along mirrored diagonals so the
        // triangle centroids stay symmetric about the coordinate planes.
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 7],
            [5, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 5],
            [2, 6, 5],
            [0, 4, 7],
            [0, 7, 3],
        ];

        Self { vertices, faces }
    }

    /// Create a cube mesh, useful for tests and demos.
    pub fn cube(size: f32) -> Self {
        Self::cuboid(size, size, size)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
    }

    #[test]
    fn test_cuboid_bounding_box() {
        let mesh = Mesh::cuboid(10.0, 2.0, 1.0);
        let (min, max) = mesh.bounding_box().unwrap();
        assert_relative_eq!(min.x, -5.0);
        assert_relative_eq!(max.x, 5.0);
        assert_relative_eq!(min.y, -1.0);
        assert_relative_eq!(max.y, 1.0);
        assert_relative_eq!(min.z, -0.5);
        assert_relative_eq!(max.z, 0.5);

        let expected = (100.0f64 + 4.0 + 1.0).sqrt();
        assert_relative_eq!(mesh.bounding_box_diagonal(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube(2.0);
        for face in 0..cube.face_count() {
            let normal = cube.face_normal(face);
            let [a, b, c] = cube.corners(face);
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            // Centered at the origin, so an outward normal points away from it
            assert!(normal.dot(&centroid) > 0.0);
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let mut mesh = Mesh::new();
        let p = Point3::new(1.0, 2.0, 3.0);
        mesh.add_triangle(p, p, p);
        assert_eq!(mesh.face_normal(0), Vector3::zeros());
    }

    #[test]
    fn test_identity_transform_preserves_vertices() {
        let cube = Mesh::cube(2.0);
        let moved = cube.transformed(&RigidTransform::identity());
        for (a, b) in cube.vertices.iter().zip(&moved.vertices) {
            assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_none());
        assert_eq!(mesh.bounding_box_diagonal(), 0.0);
    }
}
