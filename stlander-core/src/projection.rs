/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::transform::Axis;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
        }
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 1000.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Place the camera so a bounding sphere of the given radius around
    /// the target is fully in view, keeping the current view direction.
    pub fn frame_radius(&mut self, radius: f32) {
        let radius = radius.max(1e-3);
        let distance = radius / (self.fov / 2.0).tan() * 1.5;
        let direction = (self.position - self.target)
            .try_normalize(1e-6)
            .unwrap_or_else(Vector3::z);
        self.position = self.target + direction * distance;
        self.far = (distance + radius) * 4.0;
        self.near = (distance / 100.0).max(1e-3);
    }

    /// Look down a global axis towards the target (the `+X`/`-X`/... view
    /// presets). `positive` picks which side the camera sits on.
    pub fn view_along(&mut self, axis: Axis, positive: bool) {
        let distance = (self.position - self.target).norm().max(1.0);
        let sign = if positive { 1.0 } else { -1.0 };
        let dir = axis.direction();
        let offset = Vector3::new(dir.x as f32, dir.y as f32, dir.z as f32) * sign;
        self.position = self.target + offset * distance;
        // Up must not be collinear with the view direction
        self.up = if axis == Axis::Y {
            Vector3::z()
        } else {
            Vector3::y()
        };
    }

    /// Standard isometric-style view from the (1, 1, 1) octant.
    pub fn view_isometric(&mut self) {
        let distance = (self.position - self.target).norm().max(1.0);
        let corner = Vector3::new(1.0, 1.0, 1.0).normalize();
        self.position = self.target + corner * distance;
        self.up = Vector3::y();
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm() * (self.fov / 2.0).tan() * 2.0;
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let view_point = (self.view_matrix() * model_matrix).transform_point(point);

        // Cull points behind the near plane (view space looks down -Z)
        if view_point.z > -self.near {
            return None;
        }

        let ndc = self.projection_matrix().transform_point(&view_point);

        // Clip test
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 {
            return None;
        }

        // Convert to screen space; depth is distance into the scene
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
        Some((screen_x, screen_y, -view_point.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_projects_target_to_center() {
        let mut camera = Camera::new(100, 100);
        camera.frame_radius(2.0);
        for mode in [ProjectionMode::Perspective, ProjectionMode::Orthographic] {
            camera.mode = mode;
            let (x, y, depth) = camera
                .project_to_screen(&Point3::origin(), &Matrix4::identity(), 100, 100)
                .unwrap();
            assert!((x - 50.0).abs() < 1.0);
            assert!((y - 50.0).abs() < 1.0);
            assert!(depth > 0.0);
        }
    }

    #[test]
    fn test_point_behind_camera_is_culled() {
        let camera = Camera::new(100, 100);
        // The default camera sits at +5 on Z looking at the origin
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 100, 100)
            .is_none());
    }

    #[test]
    fn test_view_along_axis_keeps_distance() {
        let mut camera = Camera::new(100, 100);
        let distance = (camera.position - camera.target).norm();
        camera.view_along(Axis::X, false);
        assert!(((camera.position - camera.target).norm() - distance).abs() < 1e-4);
        assert!(camera.position.x < 0.0);

        camera.view_along(Axis::Y, true);
        // Up vector must stay independent of the view direction
        let dir = (camera.target - camera.position).normalize();
        assert!(dir.dot(&camera.up).abs() < 0.99);
    }
}
