/// Principal-axis alignment of surface meshes
use nalgebra::{Matrix3, Vector3};

use crate::error::AlignError;
use crate::geometry::Mesh;
use crate::moments::{surface_moments, SurfaceMoments};
use crate::transform::{Axis, RigidTransform};

/// Residual above which eigenvectors are re-orthonormalized.
const ORTHOGONALITY_TOLERANCE: f64 = 1e-9;

/// Iteration cap for the symmetric eigensolver.
const EIGEN_MAX_ITERATIONS: usize = 500;

/// Where the second principal axis (intermediate spread) should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pa2Target {
    /// PA1 -> X, PA2 -> Y, PA3 -> Z.
    #[default]
    Y,
    /// PA1 -> X, PA2 -> Z, PA3 -> Y (swap Y/Z).
    Z,
}

/// Per-call alignment configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignOptions {
    pub pa2_target: Pa2Target,
    /// Override for the degenerate-area tolerance; `None` picks a default
    /// proportional to the squared bounding-box diagonal.
    pub area_epsilon: Option<f64>,
}

/// Orthonormal principal axes of a surface, as columns of a right-handed
/// basis matrix, with eigenvalues sorted descending.
#[derive(Debug, Clone)]
pub struct PrincipalFrame {
    /// Columns are PA1 (largest spread), PA2, PA3.
    pub axes: Matrix3<f64>,
    pub eigenvalues: [f64; 3],
}

/// Everything a viewer or writer needs after aligning a mesh.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// The transformed mesh: centroid at the origin, principal axes on
    /// the global frame.
    pub aligned: Mesh,
    pub transform: RigidTransform,
    pub centroid: Vector3<f64>,
    pub eigenvalues: [f64; 3],
    pub total_area: f64,
}

impl Alignment {
    /// Rotate the aligned mesh 180 degrees (or any angle) about a global
    /// axis, keeping the centroid on the origin. `base` must be the mesh
    /// the alignment was computed from; a fresh aligned mesh is produced.
    pub fn rotated_about(
        &self,
        base: &Mesh,
        axis: Axis,
        degrees: f64,
    ) -> Result<Alignment, AlignError> {
        if !degrees.is_finite() {
            return Err(AlignError::invalid_configuration(
                "rotation angle must be finite",
            ));
        }
        let spin = axis.rotation_matrix(degrees.to_radians());
        let transform = RigidTransform::new(
            spin.transpose() * self.transform.rotation,
            self.transform.translation,
        );
        Ok(Alignment {
            aligned: base.transformed(&transform),
            transform,
            centroid: self.centroid,
            eigenvalues: self.eigenvalues,
            total_area: self.total_area,
        })
    }
}

/// Eigendecompose the moment matrix into a deterministic, right-handed
/// principal frame.
///
/// Eigenpairs are stable-sorted by descending eigenvalue, so numerically
/// tied eigenvalues keep the eigensolver's native ordering; that ordering
/// is the one non-determinism boundary for isotropic surfaces. Each axis
/// has its largest-magnitude component made positive, then the third axis
/// is flipped if the basis came out left-handed.
pub fn principal_frame(moments: &SurfaceMoments) -> Result<PrincipalFrame, AlignError> {
    let eigen = moments
        .moment
        .try_symmetric_eigen(f64::EPSILON, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| AlignError::eigendecomposition("symmetric eigensolver did not converge"))?;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut axes = Matrix3::zeros();
    let mut eigenvalues = [0.0; 3];
    for (col_out, &col_in) in order.iter().enumerate() {
        axes.set_column(col_out, &eigen.eigenvectors.column(col_in));
        eigenvalues[col_out] = eigen.eigenvalues[col_in];
    }

    if orthogonality_residual(&axes) > ORTHOGONALITY_TOLERANCE {
        axes = gram_schmidt(&axes)?;
    }

    fix_signs(&mut axes);
    ensure_right_handed(&mut axes);

    Ok(PrincipalFrame { axes, eigenvalues })
}

/// Build the rigid transform that moves the centroid to the origin and
/// rotates the principal axes onto the global frame.
pub fn alignment_transform(
    moments: &SurfaceMoments,
    options: &AlignOptions,
) -> Result<RigidTransform, AlignError> {
    let frame = principal_frame(moments)?;
    Ok(assemble_transform(&frame, moments.centroid, options.pa2_target))
}

/// Full pipeline: estimate moments, derive the transform, and apply it
/// out of place. The input mesh is never mutated.
pub fn align(mesh: &Mesh, options: &AlignOptions) -> Result<Alignment, AlignError> {
    let moments = surface_moments(mesh, options.area_epsilon)?;
    let frame = principal_frame(&moments)?;
    let transform = assemble_transform(&frame, moments.centroid, options.pa2_target);
    Ok(Alignment {
        aligned: mesh.transformed(&transform),
        transform,
        centroid: moments.centroid,
        eigenvalues: frame.eigenvalues,
        total_area: moments.total_area,
    })
}

fn assemble_transform(
    frame: &PrincipalFrame,
    centroid: Vector3<f64>,
    pa2_target: Pa2Target,
) -> RigidTransform {
    let mut axes = frame.axes;
    if pa2_target == Pa2Target::Z {
        // PA2 lands on Z and PA3 on Y: exchange the 2nd and 3rd columns
        axes.swap_columns(1, 2);
        ensure_right_handed(&mut axes);
    }
    // Rows of the rotation are the principal axes (frame-to-world inverse)
    RigidTransform::new(axes.transpose(), -centroid)
}

fn orthogonality_residual(axes: &Matrix3<f64>) -> f64 {
    (axes.transpose() * axes - Matrix3::identity()).norm()
}

fn gram_schmidt(axes: &Matrix3<f64>) -> Result<Matrix3<f64>, AlignError> {
    let degenerate =
        || AlignError::eigendecomposition("eigenvectors are not linearly independent");

    let u0: Vector3<f64> = axes.column(0).into_owned();
    let u0 = u0.try_normalize(f64::EPSILON).ok_or_else(degenerate)?;

    let v1: Vector3<f64> = axes.column(1).into_owned();
    let u1 = (v1 - u0 * v1.dot(&u0))
        .try_normalize(f64::EPSILON)
        .ok_or_else(degenerate)?;

    let v2: Vector3<f64> = axes.column(2).into_owned();
    let u2 = (v2 - u0 * v2.dot(&u0) - u1 * v2.dot(&u1))
        .try_normalize(f64::EPSILON)
        .ok_or_else(degenerate)?;

    Ok(Matrix3::from_columns(&[u0, u1, u2]))
}

/// Make the largest-magnitude component of each axis positive. Eigenvector
/// sign is arbitrary per solver; this pins it deterministically.
fn fix_signs(axes: &mut Matrix3<f64>) {
    for col in 0..3 {
        let mut pivot = 0;
        for row in 1..3 {
            if axes[(row, col)].abs() > axes[(pivot, col)].abs() {
                pivot = row;
            }
        }
        if axes[(pivot, col)] < 0.0 {
            for row in 0..3 {
                axes[(row, col)] = -axes[(row, col)];
            }
        }
    }
}

/// Flip the third axis if the basis is left-handed, guaranteeing a proper
/// rotation (determinant +1).
fn ensure_right_handed(axes: &mut Matrix3<f64>) {
    if axes.determinant() < 0.0 {
        for row in 0..3 {
            axes[(row, 2)] = -axes[(row, 2)];
        }
    }
}
