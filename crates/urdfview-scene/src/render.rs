//! Render backend contract and geometry dispatch.
//!
//! The core never rasterises anything itself. Each frame it issues a small
//! set of setup calls followed by one [`DrawCommand`] per drawable visual;
//! a [`RenderBackend`] turns these into whatever its graphics API needs.

use std::sync::Arc;

use nalgebra::{Matrix4, Perspective3};
use tracing::trace;

use urdfview_kinematics::{KinematicFrame, VisualDraw};
use urdfview_urdf::Geometry;

use crate::mesh::{MeshData, MeshProvider};

// ---------------------------------------------------------------------------
// Scene setup
// ---------------------------------------------------------------------------

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Projection for a `width × height` viewport. A collapsed viewport
    /// (either side zero) gets an aspect of 1 so [`Projection::matrix`]
    /// stays valid.
    pub fn for_viewport(fov_y: f32, width: u32, height: u32, near: f32, far: f32) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        Self {
            fov_y,
            aspect,
            near,
            far,
        }
    }

    /// OpenGL-style clip-space matrix.
    pub fn matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fov_y.to_radians(), self.near, self.far).into_inner()
    }
}

/// A single light source. `position[3] == 0` marks a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// Key and fill lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub key: Light,
    pub fill: Light,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            key: Light {
                position: [5.0, 5.0, 10.0, 0.0],
                ambient: [0.2, 0.2, 0.2, 1.0],
                diffuse: [0.8, 0.8, 0.8, 1.0],
                specular: [0.5, 0.5, 0.5, 1.0],
            },
            fill: Light {
                position: [-5.0, -5.0, 5.0, 0.0],
                ambient: [0.1, 0.1, 0.1, 1.0],
                diffuse: [0.4, 0.4, 0.4, 1.0],
                specular: [0.2, 0.2, 0.2, 1.0],
            },
        }
    }
}

/// Surface parameters shared by every draw; diffuse comes from the
/// per-command color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDefaults {
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Default for SurfaceDefaults {
    fn default() -> Self {
        Self {
            specular: [0.3, 0.3, 0.3, 1.0],
            shininess: 32.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Draw commands
// ---------------------------------------------------------------------------

/// Shape to rasterise, in the visual's local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned box centered on the frame.
    Box { size: [f32; 3] },
    Sphere { radius: f32 },
    /// Centered on the frame, axis along +Z, spanning `±length/2`.
    Cylinder { radius: f32, length: f32 },
    Mesh(Arc<MeshData>),
}

impl Primitive {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Mesh(_) => "mesh",
        }
    }
}

/// One drawable visual.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub link: String,
    /// World transform of the visual (link world · visual origin).
    pub transform: Matrix4<f32>,
    pub primitive: Primitive,
    pub color: [f32; 4],
}

/// Consumer of scene setup calls and draw commands.
pub trait RenderBackend {
    fn clear(&mut self, color: [f32; 4]);
    fn set_projection(&mut self, projection: &Projection);
    fn setup_lighting(&mut self, lights: &LightRig, surface: &SurfaceDefaults);
    fn set_view(&mut self, view: &Matrix4<f32>);
    fn draw(&mut self, command: &DrawCommand);
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Map a geometry to a primitive. `None` geometry and unavailable meshes
/// produce nothing.
pub fn primitive_for(geometry: &Geometry, provider: &mut impl MeshProvider) -> Option<Primitive> {
    match geometry {
        Geometry::Box { size } => Some(Primitive::Box { size: *size }),
        Geometry::Sphere { radius } => Some(Primitive::Sphere { radius: *radius }),
        Geometry::Cylinder { radius, length } => Some(Primitive::Cylinder {
            radius: *radius,
            length: *length,
        }),
        Geometry::Mesh { filename, scale } => {
            provider.mesh(filename, scale.as_ref()).map(Primitive::Mesh)
        }
        Geometry::None => None,
    }
}

fn command_for(draw: &VisualDraw<'_>, provider: &mut impl MeshProvider) -> Option<DrawCommand> {
    let primitive = primitive_for(&draw.visual.geometry, provider)?;
    Some(DrawCommand {
        link: draw.link.to_owned(),
        transform: draw.transform,
        primitive,
        color: draw.color(),
    })
}

/// Draw commands for every visual of a posed frame, in traversal order.
pub fn draw_commands(frame: &KinematicFrame<'_>, provider: &mut impl MeshProvider) -> Vec<DrawCommand> {
    frame
        .draws()
        .iter()
        .filter_map(|draw| command_for(draw, provider))
        .collect()
}

/// Send every draw command of `frame` to `backend`; returns how many were
/// issued.
pub fn dispatch(
    frame: &KinematicFrame<'_>,
    provider: &mut impl MeshProvider,
    backend: &mut impl RenderBackend,
) -> usize {
    let mut issued = 0;
    for draw in frame.draws() {
        if let Some(command) = command_for(draw, provider) {
            trace!(link = draw.link, kind = command.primitive.kind(), "draw");
            backend.draw(&command);
            issued += 1;
        }
    }
    issued
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use urdfview_kinematics::{JointPositions, forward_kinematics};
    use urdfview_urdf::{MeshScale, parse_string};

    struct NoMeshes;

    impl MeshProvider for NoMeshes {
        fn mesh(&mut self, _: &str, _: Option<&MeshScale>) -> Option<Arc<MeshData>> {
            None
        }
    }

    #[derive(Default)]
    struct Counter {
        draws: Vec<DrawCommand>,
    }

    impl RenderBackend for Counter {
        fn clear(&mut self, _: [f32; 4]) {}
        fn set_projection(&mut self, _: &Projection) {}
        fn setup_lighting(&mut self, _: &LightRig, _: &SurfaceDefaults) {}
        fn set_view(&mut self, _: &Matrix4<f32>) {}
        fn draw(&mut self, command: &DrawCommand) {
            self.draws.push(command.clone());
        }
    }

    const MIXED: &str = r#"
        <robot name="mixed">
            <material name="blue"><color rgba="0 0 1 1"/></material>
            <link name="base">
                <visual><geometry><box size="1 2 3"/></geometry><material name="blue"/></visual>
            </link>
            <link name="wheel">
                <visual>
                    <origin xyz="0 0 0.5"/>
                    <geometry><cylinder radius="0.2" length="0.1"/></geometry>
                    <material name="nonexistent"/>
                </visual>
            </link>
            <link name="shell">
                <visual><geometry><mesh filename="package://r/shell.stl"/></geometry></visual>
            </link>
            <link name="marker">
                <visual><geometry><capsule radius="1" length="2"/></geometry></visual>
            </link>
            <joint name="axle" type="continuous">
                <parent link="base"/><child link="wheel"/><origin xyz="1 0 0"/>
            </joint>
            <joint name="s" type="fixed"><parent link="base"/><child link="shell"/></joint>
            <joint name="m" type="fixed"><parent link="base"/><child link="marker"/></joint>
        </robot>
    "#;

    // -- Projection --

    #[test]
    fn aspect_guards_zero_height() {
        let p = Projection::for_viewport(45.0, 800, 0, 0.1, 100.0);
        assert_relative_eq!(p.aspect, 1.0);
        let p = Projection::for_viewport(45.0, 800, 400, 0.1, 100.0);
        assert_relative_eq!(p.aspect, 2.0);
    }

    #[test]
    fn zero_width_projection_is_finite() {
        let p = Projection::for_viewport(45.0, 0, 600, 0.1, 100.0);
        assert_relative_eq!(p.aspect, 1.0);
        assert!(p.matrix().iter().all(|v| v.is_finite()));
        let p = Projection::for_viewport(45.0, 0, 0, 0.1, 100.0);
        assert!(p.matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn projection_matrix_matches_nalgebra() {
        let p = Projection::for_viewport(60.0, 4, 3, 0.5, 50.0);
        let expected = Perspective3::new(4.0 / 3.0, 60.0_f32.to_radians(), 0.5, 50.0);
        assert_relative_eq!(p.matrix(), *expected.as_matrix());
    }

    #[test]
    fn default_rig_has_directional_lights() {
        let rig = LightRig::default();
        assert_eq!(rig.key.position, [5.0, 5.0, 10.0, 0.0]);
        assert_eq!(rig.fill.position, [-5.0, -5.0, 5.0, 0.0]);
    }

    // -- Dispatch --

    #[test]
    fn none_geometry_and_missing_mesh_are_skipped() {
        let model = parse_string(MIXED).unwrap();
        let frame = forward_kinematics(&model, &JointPositions::for_model(&model));
        assert_eq!(frame.draws().len(), 4);
        let commands = draw_commands(&frame, &mut NoMeshes);
        let links: Vec<&str> = commands.iter().map(|c| c.link.as_str()).collect();
        assert_eq!(links, vec!["base", "wheel"]);
    }

    #[test]
    fn commands_carry_color_and_transform() {
        let model = parse_string(MIXED).unwrap();
        let frame = forward_kinematics(&model, &JointPositions::for_model(&model));
        let commands = draw_commands(&frame, &mut NoMeshes);

        assert_eq!(commands[0].color, [0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(commands[0].primitive, Primitive::Box { size } if size == [1.0, 2.0, 3.0]));

        assert_eq!(commands[1].color, [0.8, 0.8, 0.8, 1.0]);
        let t = commands[1].transform;
        assert_relative_eq!(Vector3::new(t[(0, 3)], t[(1, 3)], t[(2, 3)]), Vector3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn dispatch_counts_issued_draws() {
        let model = parse_string(MIXED).unwrap();
        let frame = forward_kinematics(&model, &JointPositions::new());
        let mut backend = Counter::default();
        assert_eq!(dispatch(&frame, &mut NoMeshes, &mut backend), 2);
        assert_eq!(backend.draws.len(), 2);
        assert_eq!(backend.draws, draw_commands(&frame, &mut NoMeshes));
    }

    #[test]
    fn primitive_kinds() {
        let cyl = primitive_for(
            &Geometry::Cylinder {
                radius: 1.0,
                length: 2.0,
            },
            &mut NoMeshes,
        )
        .unwrap();
        assert_eq!(cyl.kind(), "cylinder");
        assert!(primitive_for(&Geometry::None, &mut NoMeshes).is_none());
    }
}
