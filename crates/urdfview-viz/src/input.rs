//! Input events surfaced to the viewer session.
//!
//! Whatever shell hosts the viewer (window toolkit, slider panel, menus)
//! translates its native events into [`InputEvent`]s.

use std::path::PathBuf;

/// Pointer button held during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Orbits the camera.
    Primary,
    /// Pans the orbit center.
    Secondary,
    /// Not bound to anything.
    Middle,
}

/// A user or shell action that mutates session state.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A joint control moved. Radians for rotational joints, meters for
    /// prismatic ones.
    JointChanged { name: String, value: f32 },
    /// Pointer moved by `(dx, dy)` pixels with `button` held.
    PointerDrag {
        dx: f32,
        dy: f32,
        button: PointerButton,
    },
    /// Scroll wheel, in notches. Positive zooms in.
    Scroll { delta: f32 },
    ResetView,
    AutoFit,
    Load(PathBuf),
}

impl InputEvent {
    pub fn joint(name: impl Into<String>, value: f32) -> Self {
        Self::JointChanged {
            name: name.into(),
            value,
        }
    }

    pub const fn drag(dx: f32, dy: f32, button: PointerButton) -> Self {
        Self::PointerDrag { dx, dy, button }
    }

    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::JointChanged { .. } => "joint_changed",
            Self::PointerDrag { .. } => "pointer_drag",
            Self::Scroll { .. } => "scroll",
            Self::ResetView => "reset_view",
            Self::AutoFit => "auto_fit",
            Self::Load(_) => "load",
        }
    }
}
