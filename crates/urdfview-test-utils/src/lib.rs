//! Shared test fixtures and mocks for urdfview crates.
//!
//! Provides sample robot descriptions, an in-memory mesh loader and a
//! render backend that records every call.

pub mod fixtures;
pub mod mocks;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    DISCONNECTED_URDF, MALFORMED_FIELDS_URDF, NOT_URDF, SINGLE_BOX_URDF, SLIDER_WITH_MESH_URDF,
    TWO_LINK_ARM_URDF, temp_description, write_file,
};
pub use mocks::{BackendCall, MockMeshLoader, RecordingBackend, cube_mesh};
