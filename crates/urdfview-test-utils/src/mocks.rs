//! Mock mesh loader and render backend.
//!
//! Both record what the code under test asked of them so tests can assert
//! on call counts and ordering without a filesystem or a GPU.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

use nalgebra::Matrix4;
use urdfview_scene::{
    DrawCommand, LightRig, MeshData, MeshError, MeshLoader, Projection, RenderBackend,
    SurfaceDefaults,
};

// ---------------------------------------------------------------------------
// Meshes
// ---------------------------------------------------------------------------

/// Closed axis-aligned cube spanning `±half` on every axis.
pub fn cube_mesh(half: f32) -> MeshData {
    let h = half;
    let vertices = vec![
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];
    let faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ];
    // Only fails for empty or out-of-range faces, which this literal has not.
    match MeshData::from_buffers(Path::new("cube"), vertices, Vec::new(), faces) {
        Ok(mesh) => mesh,
        Err(e) => unreachable!("cube literal is well formed: {e}"),
    }
}

// ---------------------------------------------------------------------------
// MockMeshLoader
// ---------------------------------------------------------------------------

/// In-memory [`MeshLoader`] keyed by file name.
///
/// Lookups ignore directories so that `package://` references resolve
/// regardless of where the resolver ends up pointing.
#[derive(Debug, Default)]
pub struct MockMeshLoader {
    meshes: HashMap<String, MeshData>,
    loads: Cell<usize>,
}

impl MockMeshLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mesh` under the file name `name`.
    #[must_use]
    pub fn with_mesh(mut self, name: impl Into<String>, mesh: MeshData) -> Self {
        self.meshes.insert(name.into(), mesh);
        self
    }

    /// Number of `load` calls so far, failures included.
    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

impl MeshLoader for MockMeshLoader {
    fn load(&self, path: &Path) -> Result<MeshData, MeshError> {
        self.loads.set(self.loads.get() + 1);
        path.file_name()
            .and_then(|name| self.meshes.get(name.to_string_lossy().as_ref()))
            .cloned()
            .ok_or_else(|| MeshError::NotFound(path.to_path_buf()))
    }
}

// ---------------------------------------------------------------------------
// RecordingBackend
// ---------------------------------------------------------------------------

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Clear([f32; 4]),
    Projection(Projection),
    Lighting(LightRig, SurfaceDefaults),
    View(Matrix4<f32>),
    Draw(DrawCommand),
}

/// [`RenderBackend`] that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Draw commands only, in issue order.
    pub fn draws(&self) -> Vec<&DrawCommand> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Draw(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Clear(_)))
            .count()
    }

    pub fn last_projection(&self) -> Option<&Projection> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::Projection(p) => Some(p),
            _ => None,
        })
    }

    pub fn last_view(&self) -> Option<&Matrix4<f32>> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::View(v) => Some(v),
            _ => None,
        })
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(BackendCall::Clear(color));
    }

    fn set_projection(&mut self, projection: &Projection) {
        self.calls.push(BackendCall::Projection(*projection));
    }

    fn setup_lighting(&mut self, lights: &LightRig, surface: &SurfaceDefaults) {
        self.calls.push(BackendCall::Lighting(*lights, *surface));
    }

    fn set_view(&mut self, view: &Matrix4<f32>) {
        self.calls.push(BackendCall::View(*view));
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.calls.push(BackendCall::Draw(command.clone()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn cube_bounds() {
        let cube = cube_mesh(0.5);
        assert_eq!(cube.bounds.min, Vector3::repeat(-0.5));
        assert_eq!(cube.bounds.max, Vector3::repeat(0.5));
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), 8);
    }

    #[test]
    fn mock_loader_matches_file_name_and_counts() {
        let loader = MockMeshLoader::new().with_mesh("part.obj", cube_mesh(1.0));
        assert!(loader.load(Path::new("some/dir/part.obj")).is_ok());
        assert!(matches!(
            loader.load(Path::new("other.obj")),
            Err(MeshError::NotFound(_))
        ));
        assert_eq!(loader.loads(), 2);
    }

    #[test]
    fn recording_backend_keeps_order() {
        let mut backend = RecordingBackend::new();
        backend.clear([0.0; 4]);
        backend.set_view(&Matrix4::identity());
        backend.clear([1.0; 4]);
        assert_eq!(backend.calls().len(), 3);
        assert_eq!(backend.clear_count(), 2);
        assert_eq!(backend.last_view(), Some(&Matrix4::identity()));
        assert!(backend.draws().is_empty());
        backend.reset();
        assert!(backend.calls().is_empty());
    }
}
