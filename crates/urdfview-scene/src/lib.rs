//! Scene-level services between kinematics and a graphics backend.
//!
//! - [`MeshLibrary`] / [`MeshProvider`]: resolve, load, scale and cache mesh
//!   buffers from an external [`MeshLoader`]
//! - [`compute_scene_bounds`]: rest-pose center and radius for camera framing
//! - [`dispatch`] / [`RenderBackend`]: turn a posed
//!   [`KinematicFrame`](urdfview_kinematics::KinematicFrame) into draw commands
//!
//! Nothing here touches a graphics API; backends implement
//! [`RenderBackend`] and mesh formats implement [`MeshLoader`].

pub mod bounds;
pub mod mesh;
pub mod render;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use bounds::{SceneBounds, compute_scene_bounds, local_extent};
pub use mesh::{
    Aabb, MeshData, MeshError, MeshLibrary, MeshLoader, MeshProvider, resolve_mesh_path,
};
pub use render::{
    DrawCommand, Light, LightRig, Primitive, Projection, RenderBackend, SurfaceDefaults,
    dispatch, draw_commands, primitive_for,
};
