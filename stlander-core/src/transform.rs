/// Rigid transforms and rotation helpers
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// A proper rigid transform: translate, then rotate.
///
/// Applying the transform to a point computes `R * (p + t)`. For an
/// alignment transform `t` is the negated surface centroid, so the
/// centroid lands on the origin before the principal axes are rotated
/// onto the global frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Transform a point: `R * (p + t)`.
    pub fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (point.coords + self.translation))
    }

    /// Transform a direction: rotation only, no translation.
    pub fn apply_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// The inverse transform, mapping aligned coordinates back to the
    /// original frame.
    pub fn inverse(&self) -> Self {
        Self {
            rotation: self.rotation.transpose(),
            translation: -(self.rotation * self.translation),
        }
    }

    /// Expand to a homogeneous 4x4 matrix (`R | R*t`).
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&(self.rotation * self.translation));
        m
    }

    pub fn is_identity(&self, tolerance: f64) -> bool {
        (self.rotation - Matrix3::identity()).norm() < tolerance
            && self.translation.norm() < tolerance
    }
}

/// One of the three global coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Rotation matrix for a counter-clockwise rotation about this axis.
    pub fn rotation_matrix(self, radians: f64) -> Matrix3<f64> {
        let (s, c) = radians.sin_cos();
        match self {
            Axis::X => Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c),
            Axis::Y => Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c),
            Axis::Z => Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0),
        }
    }

    /// Unit direction of this axis.
    pub fn direction(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Interactive view rotation around three axes (in radians).
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Matrix builders for viewer-side model transforms.
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }
}
