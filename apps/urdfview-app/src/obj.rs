//! Wavefront OBJ mesh loader backed by `tobj`.
//!
//! Positions and normals only; materials referenced by the file are ignored
//! since colour comes from the robot description.

use std::path::Path;

use urdfview_scene::{MeshData, MeshError, MeshLoader};

/// Loads `.obj` files. Other formats are reported as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load(&self, path: &Path) -> Result<MeshData, MeshError> {
        if !path.is_file() {
            return Err(MeshError::NotFound(path.to_path_buf()));
        }
        let is_obj = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
        if !is_obj {
            return Err(load_error(path, "unsupported mesh format, only OBJ is read"));
        }

        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|e| load_error(path, e.to_string()))?;

        // Normals are kept only if every model carries one per position.
        let keep_normals = models
            .iter()
            .all(|m| !m.mesh.normals.is_empty() && m.mesh.normals.len() == m.mesh.positions.len());

        let mut vertices: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::new();
        for model in models {
            let mesh = model.mesh;
            let start = u32::try_from(vertices.len())
                .map_err(|_| load_error(path, "too many vertices"))?;
            vertices.extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
            if keep_normals {
                normals.extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
            }
            faces.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| [start + f[0], start + f[1], start + f[2]]),
            );
        }

        MeshData::from_buffers(path, vertices, normals, faces)
    }
}

fn load_error(path: &Path, message: impl Into<String>) -> MeshError {
    MeshError::Load {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use urdfview_test_utils::write_file;

    const TETRA: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 3 2
f 1 2 4
f 2 3 4
f 1 4 3
";

    #[test]
    fn loads_triangles_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "tetra.obj", TETRA).unwrap();
        let mesh = ObjLoader.load(&path).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.normals.len(), 4);
        assert_eq!(mesh.bounds.min, Vector3::zeros());
        assert_eq!(mesh.bounds.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn quads_are_triangulated() {
        let dir = tempfile::tempdir().unwrap();
        let quad = "v 0 0 0\nv 2 0 0\nv 2 2 0\nv 0 2 0\nf 1 2 3 4\n";
        let path = write_file(dir.path(), "quad.OBJ", quad).unwrap();
        let mesh = ObjLoader.load(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ObjLoader.load(Path::new("/no/such/mesh.obj")).unwrap_err();
        assert!(matches!(err, MeshError::NotFound(_)));
    }

    #[test]
    fn other_formats_are_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "part.stl", "solid x\nendsolid x\n").unwrap();
        assert!(matches!(ObjLoader.load(&path), Err(MeshError::Load { .. })));
    }

    #[test]
    fn file_without_faces_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "points.obj", "v 0 0 0\nv 1 1 1\n").unwrap();
        assert!(ObjLoader.load(&path).is_err());
    }
}
