//! Interactive viewing core for urdfview.
//!
//! `urdfview-viz` owns everything a windowed shell needs besides the window:
//! - [`OrbitCamera`]: orbit, pan and zoom around a center, auto-fit to bounds
//! - [`ViewerConfig`]: TOML configuration with validated defaults
//! - [`InputEvent`]: the events a shell feeds in
//! - [`ViewerSession`]: model, joint state, camera and mesh cache, rendered
//!   on demand into any [`RenderBackend`](urdfview_scene::RenderBackend)
//!
//! # Usage
//!
//! ```no_run
//! use urdfview_scene::{MeshData, MeshError, MeshLoader};
//! use urdfview_viz::{InputEvent, PointerButton, ViewerConfig, ViewerSession};
//! # use std::path::Path;
//! # struct Loader;
//! # impl MeshLoader for Loader {
//! #     fn load(&self, path: &Path) -> Result<MeshData, MeshError> {
//! #         Err(MeshError::NotFound(path.to_path_buf()))
//! #     }
//! # }
//!
//! let mut session = ViewerSession::new(ViewerConfig::default(), Loader);
//! session.load("robot.urdf")?;
//! session.handle(InputEvent::joint("elbow", 0.5))?;
//! session.handle(InputEvent::drag(12.0, -4.0, PointerButton::Primary))?;
//! # Ok::<(), urdfview_viz::ViewerError>(())
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod session;

pub use camera::OrbitCamera;
pub use config::{CameraConfig, RenderConfig, ViewerConfig};
pub use error::{ConfigError, ViewerError};
pub use input::{InputEvent, PointerButton};
pub use session::{JointControl, ViewerSession};
