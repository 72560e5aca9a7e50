//! Robot description model and parser for urdfview.
//!
//! Provides types for representing a robot's kinematic tree (links, joints,
//! visual geometry, materials) and a parser that builds a [`Model`] from
//! URDF XML while recovering locally from malformed fields.

pub mod error;
pub mod parser;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::UrdfError;
pub use parser::{
    ParseOptions, parse_file, parse_file_with, parse_string, parse_string_with, parse_vector3,
};
pub use types::{
    DEFAULT_COLOR, Geometry, Joint, JointLimits, JointType, Link, Material, MeshScale, Model,
    Origin, Visual,
};
