//! Mesh provider contract and the per-session mesh cache.
//!
//! Loading and triangulating mesh files is delegated to a [`MeshLoader`].
//! [`MeshLibrary`] wraps a loader with `package://` path resolution, scale
//! application and memoisation, and exposes the result through the
//! [`MeshProvider`] trait that bounds and render dispatch consume.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nalgebra::Vector3;
use tracing::{debug, warn};

use urdfview_urdf::MeshScale;

/// URI prefix stripped from mesh references.
pub const PACKAGE_PREFIX: &str = "package://";

// ---------------------------------------------------------------------------
// MeshError
// ---------------------------------------------------------------------------

/// Reasons a mesh is unavailable.
///
/// Never surfaced past [`MeshLibrary`]: a failed load becomes "no mesh"
/// plus a warning.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("mesh file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to load mesh {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("mesh {} contains no triangles", .0.display())]
    Empty(PathBuf),
}

// ---------------------------------------------------------------------------
// Aabb
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub const fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box spanning `±half` on each axis.
    pub fn symmetric(half: Vector3<f32>) -> Self {
        Self::new(-half, half)
    }

    /// Tightest box around `points`, or `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            let v = Vector3::from(*p);
            Some(match acc {
                None => Self::new(v, v),
                Some(b) => Self::new(b.min.inf(&v), b.max.sup(&v)),
            })
        })
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Half the length of the diagonal.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).norm() * 0.5
    }

    /// Scale about the origin. Negative factors mirror, so min/max are
    /// re-sorted per axis.
    pub fn scaled(&self, factors: [f32; 3]) -> Self {
        let f = Vector3::from(factors);
        let a = self.min.component_mul(&f);
        let b = self.max.component_mul(&f);
        Self::new(a.inf(&b), a.sup(&b))
    }
}

// ---------------------------------------------------------------------------
// MeshData
// ---------------------------------------------------------------------------

/// Triangle mesh buffers as handed to a render backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<[f32; 3]>,
    /// One normal per vertex.
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
    pub bounds: Aabb,
}

impl MeshData {
    /// Build mesh data, computing bounds and, when `normals` does not have
    /// one entry per vertex, area-weighted vertex normals.
    pub fn from_buffers(
        path: &Path,
        vertices: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        faces: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        if faces.is_empty() {
            return Err(MeshError::Empty(path.to_path_buf()));
        }
        let vertex_count = vertices.len();
        if let Some(bad) = faces.iter().flatten().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::Load {
                path: path.to_path_buf(),
                message: format!("face index {bad} out of range for {vertex_count} vertices"),
            });
        }
        let bounds = Aabb::from_points(&vertices).ok_or_else(|| MeshError::Empty(path.to_path_buf()))?;
        let normals = if normals.len() == vertex_count {
            normals
        } else {
            vertex_normals(&vertices, &faces)
        };
        Ok(Self {
            vertices,
            normals,
            faces,
            bounds,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Copy scaled about the origin.
    ///
    /// Normals are transformed by the inverse scale and renormalised so they
    /// stay perpendicular under non-uniform scaling.
    pub fn scaled(&self, factors: [f32; 3]) -> Self {
        let f = Vector3::from(factors);
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vector3::from(*v).component_mul(&f).into())
            .collect();
        let normals = self
            .normals
            .iter()
            .map(|n| {
                let scaled = Vector3::new(
                    safe_div(n[0], f.x),
                    safe_div(n[1], f.y),
                    safe_div(n[2], f.z),
                );
                scaled.try_normalize(f32::EPSILON).unwrap_or(scaled).into()
            })
            .collect();
        Self {
            vertices,
            normals,
            faces: self.faces.clone(),
            bounds: self.bounds.scaled(factors),
        }
    }
}

fn safe_div(n: f32, s: f32) -> f32 {
    if s == 0.0 { 0.0 } else { n / s }
}

fn vertex_normals(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vector3::<f32>::zeros(); vertices.len()];
    for face in faces {
        let [a, b, c] = face.map(|i| Vector3::from(vertices[i as usize]));
        let n = (b - a).cross(&(c - a));
        for &i in face {
            acc[i as usize] += n;
        }
    }
    acc.into_iter()
        .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z).into())
        .collect()
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Reads and triangulates a mesh file at an already resolved path.
pub trait MeshLoader {
    fn load(&self, path: &Path) -> Result<MeshData, MeshError>;
}

/// Source of mesh buffers for geometry references found in a model.
///
/// `None` means "unavailable"; callers skip the geometry.
pub trait MeshProvider {
    fn mesh(&mut self, filename: &str, scale: Option<&MeshScale>) -> Option<Arc<MeshData>>;
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Resolve a mesh reference to a file path.
///
/// The `package://` prefix is stripped, then the candidates are tried in
/// order: the path as given, the path under `base_dir`, the file name under
/// `base_dir`, the file name in the working directory. The first existing
/// candidate wins; otherwise the first candidate is returned.
pub fn resolve_mesh_path(filename: &str, base_dir: Option<&Path>) -> PathBuf {
    let stripped = Path::new(filename.strip_prefix(PACKAGE_PREFIX).unwrap_or(filename));
    let file_name = stripped.file_name().map(Path::new);

    let mut candidates = vec![stripped.to_path_buf()];
    if let Some(dir) = base_dir {
        if stripped.is_relative() {
            candidates.push(dir.join(stripped));
        }
        if let Some(name) = file_name {
            candidates.push(dir.join(name));
        }
    }
    if let Some(name) = file_name {
        candidates.push(name.to_path_buf());
    }

    candidates
        .iter()
        .find(|c| c.is_file())
        .cloned()
        .unwrap_or_else(|| stripped.to_path_buf())
}

// ---------------------------------------------------------------------------
// MeshLibrary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    scale: [u32; 3],
}

/// Memoising [`MeshProvider`] over a [`MeshLoader`].
///
/// Results are cached by resolved path and scale, failures included, until
/// [`clear`](Self::clear) is called on model reload.
#[derive(Debug)]
pub struct MeshLibrary<L> {
    loader: L,
    base_dir: Option<PathBuf>,
    cache: HashMap<CacheKey, Option<Arc<MeshData>>>,
}

impl<L: MeshLoader> MeshLibrary<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            base_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Directory of the current description, used for relative references.
    pub fn set_base_dir(&mut self, dir: Option<PathBuf>) {
        self.base_dir = dir;
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached entries, failures included.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn load_scaled(&self, path: &Path, factors: [f32; 3]) -> Option<Arc<MeshData>> {
        match self.loader.load(path) {
            Ok(mesh) => {
                debug!(
                    path = %path.display(),
                    triangles = mesh.triangle_count(),
                    "loaded mesh"
                );
                let mesh = if factors == [1.0; 3] {
                    mesh
                } else {
                    mesh.scaled(factors)
                };
                Some(Arc::new(mesh))
            }
            Err(e) => {
                warn!(error = %e, "mesh unavailable, skipping geometry");
                None
            }
        }
    }
}

impl<L: MeshLoader> MeshProvider for MeshLibrary<L> {
    fn mesh(&mut self, filename: &str, scale: Option<&MeshScale>) -> Option<Arc<MeshData>> {
        let path = resolve_mesh_path(filename, self.base_dir.as_deref());
        let factors = scale.map_or([1.0; 3], MeshScale::factors);
        let key = CacheKey {
            path,
            scale: factors.map(f32::to_bits),
        };
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let mesh = self.load_scaled(&key.path, factors);
        self.cache.insert(key, mesh.clone());
        mesh
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::fs;

    fn unit_triangle() -> MeshData {
        MeshData::from_buffers(
            Path::new("tri.obj"),
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
            Vec::new(),
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    struct CountingLoader {
        loads: Cell<usize>,
    }

    impl MeshLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<MeshData, MeshError> {
            self.loads.set(self.loads.get() + 1);
            if path.ends_with("tri.obj") {
                Ok(unit_triangle())
            } else {
                Err(MeshError::NotFound(path.to_path_buf()))
            }
        }
    }

    fn library() -> MeshLibrary<CountingLoader> {
        MeshLibrary::new(CountingLoader {
            loads: Cell::new(0),
        })
    }

    // -- Aabb --

    #[test]
    fn aabb_from_points_and_union() {
        let b = Aabb::from_points(&[[1.0, -2.0, 0.0], [-1.0, 3.0, 0.5]]).unwrap();
        assert_eq!(b.min, Vector3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vector3::new(1.0, 3.0, 0.5));
        let u = b.union(&Aabb::symmetric(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(u.min, Vector3::new(-2.0, -2.0, 0.0));
        assert_eq!(u.max, Vector3::new(2.0, 3.0, 0.5));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn aabb_center_and_radius() {
        let b = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 1.0));
        assert_relative_eq!(b.center(), Vector3::new(1.0, 1.0, 0.5));
        assert_relative_eq!(b.radius(), 1.5);
    }

    #[test]
    fn aabb_negative_scale_stays_ordered() {
        let b = Aabb::new(Vector3::new(0.0, 1.0, 2.0), Vector3::new(1.0, 2.0, 3.0));
        let s = b.scaled([-1.0, 2.0, 1.0]);
        assert_eq!(s.min, Vector3::new(-1.0, 2.0, 2.0));
        assert_eq!(s.max, Vector3::new(0.0, 4.0, 3.0));
    }

    // -- MeshData --

    #[test]
    fn computes_normals_when_missing() {
        let mesh = unit_triangle();
        assert_eq!(mesh.normals.len(), 3);
        for n in &mesh.normals {
            assert_relative_eq!(Vector3::from(*n), Vector3::z());
        }
        assert_eq!(mesh.bounds.max, Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn rejects_empty_and_out_of_range() {
        let empty = MeshData::from_buffers(Path::new("e"), vec![[0.0; 3]], Vec::new(), Vec::new());
        assert!(matches!(empty, Err(MeshError::Empty(_))));
        let bad = MeshData::from_buffers(Path::new("b"), vec![[0.0; 3]], Vec::new(), vec![[0, 1, 2]]);
        assert!(matches!(bad, Err(MeshError::Load { .. })));
    }

    #[test]
    fn scaling_moves_vertices_and_bounds() {
        let mesh = unit_triangle().scaled([2.0, 0.5, 1.0]);
        assert_eq!(mesh.vertices[2], [0.0, 1.0, 0.0]);
        assert_eq!(mesh.bounds.max, Vector3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(Vector3::from(mesh.normals[0]), Vector3::z());
    }

    // -- Path resolution --

    #[test]
    fn strips_package_prefix_when_nothing_exists() {
        let path = resolve_mesh_path("package://robot/meshes/arm.stl", None);
        assert_eq!(path, PathBuf::from("robot/meshes/arm.stl"));
    }

    #[test]
    fn resolves_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("meshes")).unwrap();
        fs::write(dir.path().join("meshes/arm.obj"), "").unwrap();
        let path = resolve_mesh_path("meshes/arm.obj", Some(dir.path()));
        assert_eq!(path, dir.path().join("meshes/arm.obj"));
    }

    #[test]
    fn falls_back_to_basename_in_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("arm.obj"), "").unwrap();
        let path = resolve_mesh_path("package://robot/meshes/arm.obj", Some(dir.path()));
        assert_eq!(path, dir.path().join("arm.obj"));
    }

    #[test]
    fn absolute_existing_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("part.obj");
        fs::write(&file, "").unwrap();
        let reference = file.to_string_lossy().into_owned();
        assert_eq!(resolve_mesh_path(&reference, Some(Path::new("/nowhere"))), file);
    }

    // -- Cache --

    #[test]
    fn caches_hits_and_misses() {
        let mut lib = library();
        assert!(lib.mesh("tri.obj", None).is_some());
        assert!(lib.mesh("tri.obj", None).is_some());
        assert!(lib.mesh("missing.obj", None).is_none());
        assert!(lib.mesh("missing.obj", None).is_none());
        assert_eq!(lib.loader().loads.get(), 2);
        assert_eq!(lib.cached(), 2);
    }

    #[test]
    fn scale_is_part_of_the_key() {
        let mut lib = library();
        let plain = lib.mesh("tri.obj", None).unwrap();
        let big = lib.mesh("tri.obj", Some(&MeshScale::Uniform(3.0))).unwrap();
        assert_eq!(lib.loader().loads.get(), 2);
        assert_eq!(plain.bounds.max, Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(big.bounds.max, Vector3::new(3.0, 6.0, 0.0));
    }

    #[test]
    fn uniform_one_shares_entry_with_unscaled() {
        let mut lib = library();
        let a = lib.mesh("tri.obj", None).unwrap();
        let b = lib.mesh("tri.obj", Some(&MeshScale::Uniform(1.0))).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn clear_forces_reload() {
        let mut lib = library();
        lib.mesh("tri.obj", None);
        lib.clear();
        assert_eq!(lib.cached(), 0);
        lib.mesh("tri.obj", None);
        assert_eq!(lib.loader().loads.get(), 2);
    }

    // -- MeshError --

    #[test]
    fn error_messages_name_the_path() {
        let e = MeshError::NotFound(PathBuf::from("a/b.stl"));
        assert_eq!(e.to_string(), "mesh file not found: a/b.stl");
        let e = MeshError::Load {
            path: PathBuf::from("x.obj"),
            message: "bad token".into(),
        };
        assert_eq!(e.to_string(), "failed to load mesh x.obj: bad token");
    }
}
