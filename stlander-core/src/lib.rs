/// STLander Core Library - Surface moment estimation and principal-axis alignment
///
/// This library provides the stateless core for aligning triangulated
/// surface meshes: STL parsing and writing, area-weighted moment
/// estimation, a deterministic principal-axis aligner producing rigid
/// transforms, and the camera/projection math shared by front ends.
pub mod align;
pub mod error;
pub mod geometry;
pub mod moments;
pub mod projection;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use align::{
    align, alignment_transform, principal_frame, AlignOptions, Alignment, Pa2Target,
    PrincipalFrame,
};
pub use error::{AlignError, StlError};
pub use geometry::Mesh;
pub use moments::{surface_moments, SurfaceMoments};
pub use projection::{Camera, ProjectionMode};
pub use transform::{Axis, RigidTransform, RotationState, Transform};
