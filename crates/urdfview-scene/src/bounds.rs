//! Rest-pose scene bounds used for camera framing.
//!
//! Extents are taken in each link's own frame and are not posed by
//! kinematics, so the result only changes when the model or the mesh
//! provider changes.

use nalgebra::Vector3;

use urdfview_urdf::{Geometry, Model};

use crate::mesh::{Aabb, MeshProvider};

/// Center and radius of the scene's geometry footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl SceneBounds {
    pub const fn new(center: Vector3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), aabb.radius())
    }
}

impl Default for SceneBounds {
    /// Origin with radius 1, used when nothing contributes an extent.
    fn default() -> Self {
        Self::new(Vector3::zeros(), 1.0)
    }
}

/// Local extent of one geometry, or `None` when it contributes nothing.
///
/// Cylinders are centered on the frame with their axis along Z. Meshes
/// report the provider's bounds and are skipped when unavailable.
pub fn local_extent(geometry: &Geometry, provider: &mut impl MeshProvider) -> Option<Aabb> {
    match geometry {
        Geometry::Box { size } => Some(Aabb::symmetric(Vector3::from(*size) * 0.5)),
        Geometry::Sphere { radius } => Some(Aabb::symmetric(Vector3::repeat(*radius))),
        Geometry::Cylinder { radius, length } => Some(Aabb::symmetric(Vector3::new(
            *radius,
            *radius,
            length * 0.5,
        ))),
        Geometry::Mesh { filename, scale } => provider
            .mesh(filename, scale.as_ref())
            .map(|mesh| mesh.bounds),
        Geometry::None => None,
    }
}

/// Aggregate the local extents of every link visual.
///
/// Falls back to [`SceneBounds::default`] when no visual contributes.
pub fn compute_scene_bounds(model: &Model, provider: &mut impl MeshProvider) -> SceneBounds {
    model
        .links()
        .filter_map(|link| link.visual.as_ref())
        .filter_map(|visual| local_extent(&visual.geometry, provider))
        .reduce(|a, b| a.union(&b))
        .map_or_else(SceneBounds::default, |aabb| SceneBounds::from_aabb(&aabb))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
