/// Area-weighted surface moment estimation
use nalgebra::{Matrix3, Vector3};

use crate::error::AlignError;
use crate::geometry::Mesh;

/// Area-weighted first and second moments of a triangulated surface.
///
/// The moment matrix is the sum of `area * r * r^T` over triangle
/// centroids `r` taken relative to the global centroid, so it is
/// symmetric positive-semidefinite by construction.
#[derive(Debug, Clone)]
pub struct SurfaceMoments {
    pub centroid: Vector3<f64>,
    pub moment: Matrix3<f64>,
    pub total_area: f64,
}

/// Compute the total area, area-weighted centroid, and second-moment
/// matrix of a mesh surface under a thin-shell assumption.
///
/// Triangles with area below a tolerance proportional to the squared
/// bounding-box diagonal are skipped so near-degenerate slivers cannot
/// poison the moment matrix. `area_epsilon` overrides that tolerance;
/// it must be finite and positive.
///
/// Fails with [`AlignError::DegenerateMesh`] when no triangle survives
/// the filter or the surviving area is numerically zero.
pub fn surface_moments(
    mesh: &Mesh,
    area_epsilon: Option<f64>,
) -> Result<SurfaceMoments, AlignError> {
    let epsilon = resolve_epsilon(mesh, area_epsilon)?;

    // First pass: per-triangle areas and centroids, filtered
    let mut weighted = Vec::with_capacity(mesh.face_count());
    let mut total_area = 0.0;
    let mut centroid_sum = Vector3::zeros();
    for face in 0..mesh.face_count() {
        let [a, b, c] = mesh.corners(face);
        let a = Vector3::new(f64::from(a.x), f64::from(a.y), f64::from(a.z));
        let b = Vector3::new(f64::from(b.x), f64::from(b.y), f64::from(b.z));
        let c = Vector3::new(f64::from(c.x), f64::from(c.y), f64::from(c.z));

        let area = 0.5 * (b - a).cross(&(c - a)).norm();
        if !area.is_finite() || area < epsilon {
            continue;
        }

        let centroid = (a + b + c) / 3.0;
        total_area += area;
        centroid_sum += area * centroid;
        weighted.push((area, centroid));
    }

    if weighted.is_empty() {
        return Err(AlignError::degenerate_mesh(
            "mesh has no triangles with non-zero area",
        ));
    }
    if total_area < epsilon {
        return Err(AlignError::degenerate_mesh(
            "total triangle area is numerically zero",
        ));
    }

    let centroid = centroid_sum / total_area;

    // Second pass: second moments about the global centroid. Only the
    // upper triangle is accumulated; the matrix is symmetric.
    let mut moment = Matrix3::zeros();
    for (area, tri_centroid) in &weighted {
        let r = tri_centroid - centroid;
        moment[(0, 0)] += area * r.x * r.x;
        moment[(0, 1)] += area * r.x * r.y;
        moment[(0, 2)] += area * r.x * r.z;
        moment[(1, 1)] += area * r.y * r.y;
        moment[(1, 2)] += area * r.y * r.z;
        moment[(2, 2)] += area * r.z * r.z;
    }
    moment[(1, 0)] = moment[(0, 1)];
    moment[(2, 0)] = moment[(0, 2)];
    moment[(2, 1)] = moment[(1, 2)];

    Ok(SurfaceMoments {
        centroid,
        moment,
        total_area,
    })
}

fn resolve_epsilon(mesh: &Mesh, area_epsilon: Option<f64>) -> Result<f64, AlignError> {
    match area_epsilon {
        Some(eps) => {
            if !eps.is_finite() || eps <= 0.0 {
                return Err(AlignError::invalid_configuration(
                    "area epsilon must be finite and positive",
                ));
            }
            Ok(eps)
        }
        None => {
            let diagonal = mesh.bounding_box_diagonal();
            if diagonal > 0.0 {
                Ok(diagonal * diagonal * f64::EPSILON)
            } else {
                Ok(f64::EPSILON)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_cuboid_centroid_at_center() {
        let mesh = Mesh::cuboid(10.0, 2.0, 1.0);
        let moments = surface_moments(&mesh, None).unwrap();
        assert_relative_eq!(moments.centroid, Vector3::zeros(), epsilon = 1e-9);

        // Surface area of a 10 x 2 x 1 box
        let expected = 2.0 * (10.0 * 2.0 + 10.0 * 1.0 + 2.0 * 1.0);
        assert_relative_eq!(moments.total_area, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_translated_cube_centroid() {
        let mesh = Mesh::cube(1.0).translated(nalgebra::Vector3::new(5.0, 5.0, 5.0));
        let moments = surface_moments(&mesh, None).unwrap();
        assert_relative_eq!(
            moments.centroid,
            Vector3::new(5.0, 5.0, 5.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_moment_matrix_is_symmetric_psd() {
        let mesh = Mesh::cuboid(10.0, 2.0, 1.0);
        let moments = surface_moments(&mesh, None).unwrap();
        let m = moments.moment;
        assert_relative_eq!(m, m.transpose(), epsilon = 1e-12);

        let eigenvalues = m.symmetric_eigen().eigenvalues;
        for i in 0..3 {
            assert!(eigenvalues[i] > -1e-9);
        }
    }

    #[test]
    fn test_elongated_box_spread_ordering() {
        let mesh = Mesh::cuboid(10.0, 2.0, 1.0);
        let moments = surface_moments(&mesh, None).unwrap();
        // Axis-aligned box: the moment matrix is diagonal and the spread
        // follows the edge lengths, X > Y > Z.
        let m = moments.moment;
        assert!(m[(0, 0)] > m[(1, 1)]);
        assert!(m[(1, 1)] > m[(2, 2)]);
        assert!(m[(0, 1)].abs() < 1e-9);
        assert!(m[(0, 2)].abs() < 1e-9);
        assert!(m[(1, 2)].abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_triangle_is_degenerate() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let err = surface_moments(&mesh, None).unwrap_err();
        assert!(matches!(err, AlignError::DegenerateMesh { .. }));
    }

    #[test]
    fn test_coincident_vertices_are_degenerate() {
        let mut mesh = Mesh::new();
        let p = Point3::new(3.0, 3.0, 3.0);
        mesh.add_triangle(p, p, p);
        let err = surface_moments(&mesh, None).unwrap_err();
        assert!(matches!(err, AlignError::DegenerateMesh { .. }));
    }

    #[test]
    fn test_empty_mesh_is_degenerate() {
        let err = surface_moments(&Mesh::new(), None).unwrap_err();
        assert!(matches!(err, AlignError::DegenerateMesh { .. }));
    }

    #[test]
    fn test_invalid_epsilon_rejected() {
        let mesh = Mesh::cube(1.0);
        for eps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = surface_moments(&mesh, Some(eps)).unwrap_err();
            assert!(matches!(err, AlignError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_epsilon_override_filters_small_triangles() {
        let mut mesh = Mesh::cuboid(2.0, 2.0, 2.0);
        // A sliver far off-center that a coarse epsilon should ignore
        mesh.add_triangle(
            Point3::new(100.0, 0.0, 0.0),
            Point3::new(100.0, 1e-4, 0.0),
            Point3::new(100.0, 0.0, 1e-4),
        );
        let strict = surface_moments(&mesh, Some(1e-12)).unwrap();
        let coarse = surface_moments(&mesh, Some(1e-6)).unwrap();
        assert!(strict.centroid.x > coarse.centroid.x);
        assert_relative_eq!(coarse.centroid, Vector3::zeros(), epsilon = 1e-9);
    }
}
