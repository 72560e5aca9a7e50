//! The viewer session: current model, joint state, camera and mesh cache.
//!
//! All state is owned here and mutated only through [`ViewerSession`]
//! methods, so the walker and camera stay pure functions of explicit
//! inputs. Rendering is on demand: the host calls
//! [`render`](ViewerSession::render) after handling events.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use urdfview_kinematics::{JointPositions, KinematicFrame, forward_kinematics};
use urdfview_scene::{
    DrawCommand, LightRig, MeshLibrary, MeshLoader, Projection, RenderBackend, SceneBounds,
    SurfaceDefaults, compute_scene_bounds, dispatch, draw_commands,
};
use urdfview_urdf::{JointType, Model, parse_file_with, parse_string_with};

use crate::camera::OrbitCamera;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::input::{InputEvent, PointerButton};

/// What a slider panel needs to present one joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointControl {
    pub name: String,
    pub joint_type: JointType,
    /// `(lower, upper)` in radians or meters.
    pub range: (f32, f32),
    pub value: f32,
}

/// Single-threaded viewer state machine.
#[derive(Debug)]
pub struct ViewerSession<L> {
    config: ViewerConfig,
    model: Option<Model>,
    source: Option<PathBuf>,
    positions: JointPositions,
    camera: OrbitCamera,
    bounds: SceneBounds,
    meshes: MeshLibrary<L>,
    viewport: (u32, u32),
    projection_dirty: bool,
}

impl<L: MeshLoader> ViewerSession<L> {
    pub fn new(config: ViewerConfig, loader: L) -> Self {
        let camera = OrbitCamera::new(config.camera.clone());
        Self {
            config,
            model: None,
            source: None,
            positions: JointPositions::new(),
            camera,
            bounds: SceneBounds::default(),
            meshes: MeshLibrary::new(loader),
            viewport: (1, 1),
            projection_dirty: true,
        }
    }

    // -- Accessors --

    pub const fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub const fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Path of the loaded description, if it came from a file.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub const fn positions(&self) -> &JointPositions {
        &self.positions
    }

    pub const fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Scene bounds from the last load or auto-fit.
    pub const fn bounds(&self) -> &SceneBounds {
        &self.bounds
    }

    pub const fn meshes(&self) -> &MeshLibrary<L> {
        &self.meshes
    }

    // -- Loading --

    /// Load a description file.
    ///
    /// All or nothing: on error the previous model, joint state, camera and
    /// caches are left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ViewerError> {
        let path = path.as_ref();
        let model = parse_file_with(path, &self.config.parse_options())?;
        let base_dir = path.parent().map(Path::to_path_buf);
        self.install(model, base_dir);
        self.source = Some(path.to_path_buf());
        info!(path = %path.display(), "loaded robot description");
        Ok(())
    }

    /// Load a description from text. Relative mesh references resolve
    /// against `base_dir` when given.
    pub fn load_str(&mut self, xml: &str, base_dir: Option<&Path>) -> Result<(), ViewerError> {
        let model = parse_string_with(xml, &self.config.parse_options())?;
        self.install(model, base_dir.map(Path::to_path_buf));
        self.source = None;
        Ok(())
    }

    fn install(&mut self, model: Model, base_dir: Option<PathBuf>) {
        self.meshes.clear();
        self.meshes.set_base_dir(base_dir);
        self.positions = JointPositions::for_model(&model);
        self.bounds = compute_scene_bounds(&model, &mut self.meshes);
        self.camera.auto_fit(&self.bounds);
        info!(
            robot = %model.name,
            links = model.link_count(),
            joints = model.joint_count(),
            dof = model.dof(),
            radius = self.bounds.radius,
            "model ready"
        );
        self.model = Some(model);
    }

    // -- Events --

    /// Apply one input event.
    ///
    /// Only [`InputEvent::Load`] can fail; the session is unchanged when it does.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), ViewerError> {
        debug!(event = event.kind(), "input");
        match event {
            InputEvent::JointChanged { name, value } => {
                self.set_joint(&name, value);
            }
            InputEvent::PointerDrag { dx, dy, button } => match button {
                PointerButton::Primary => self.camera.orbit(dx, dy),
                PointerButton::Secondary => self.camera.pan(dx, dy),
                PointerButton::Middle => {}
            },
            InputEvent::Scroll { delta } => self.camera.zoom(delta),
            InputEvent::ResetView => self.reset_view(),
            InputEvent::AutoFit => self.auto_fit(),
            InputEvent::Load(path) => self.load(path)?,
        }
        Ok(())
    }

    /// Set a joint parameter. Unknown or fixed joints are ignored with a
    /// warning; values are not clamped to the joint limits.
    pub fn set_joint(&mut self, name: &str, value: f32) -> bool {
        if !self.positions.contains(name) {
            warn!(joint = name, "ignoring value for unknown or fixed joint");
            return false;
        }
        self.positions.set(name, value);
        true
    }

    /// Home the camera, then fit the cached bounds.
    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.camera.auto_fit(&self.bounds);
    }

    /// Recompute bounds and frame them. Does nothing without a model.
    pub fn auto_fit(&mut self) {
        let Some(model) = &self.model else {
            info!("auto-fit requested with no model loaded");
            return;
        };
        self.bounds = compute_scene_bounds(model, &mut self.meshes);
        self.camera.auto_fit(&self.bounds);
    }

    /// Record a new viewport size; the next render re-issues the projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport != (width, height) {
            self.viewport = (width, height);
            self.projection_dirty = true;
        }
    }

    // -- Queries --

    /// One entry per non-fixed joint, in document order.
    pub fn joint_controls(&self) -> Vec<JointControl> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        model
            .parameterized_joints()
            .map(|joint| JointControl {
                name: joint.name.clone(),
                joint_type: joint.joint_type.clone(),
                range: joint.control_range(),
                value: self.positions.get(&joint.name),
            })
            .collect()
    }

    /// Posed frame for the current joint state.
    pub fn frame(&self) -> Option<KinematicFrame<'_>> {
        self.model
            .as_ref()
            .map(|model| forward_kinematics(model, &self.positions))
    }

    /// Draw commands for the current pose, without touching a backend.
    pub fn draw_commands(&mut self) -> Vec<DrawCommand> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let frame = forward_kinematics(model, &self.positions);
        draw_commands(&frame, &mut self.meshes)
    }

    pub fn projection(&self) -> Projection {
        let render = &self.config.render;
        let (width, height) = self.viewport;
        Projection::for_viewport(render.fov_y, width, height, render.near, render.far)
    }

    // -- Rendering --

    /// Render one frame; returns the number of draw commands issued.
    ///
    /// Order: clear, projection (only after a resize or on the first
    /// frame), view, lighting, then one draw per visible visual.
    pub fn render(&mut self, backend: &mut impl RenderBackend) -> usize {
        backend.clear(self.config.render.background);
        if self.projection_dirty {
            backend.set_projection(&self.projection());
            self.projection_dirty = false;
        }
        backend.set_view(&self.camera.view_matrix());
        backend.setup_lighting(&LightRig::default(), &SurfaceDefaults::default());

        let Some(model) = &self.model else {
            return 0;
        };
        let frame = forward_kinematics(model, &self.positions);
        dispatch(&frame, &mut self.meshes, backend)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
