//! Forward kinematics for urdfview robot models.
//!
//! Walks the kinematic tree of a [`Model`](urdfview_urdf::Model) from its
//! root, composing static joint origins with actuation transforms derived
//! from the current joint parameters, and produces a world transform for
//! every reachable link together with the visuals to draw.
//!
//! # Architecture
//!
//! ```text
//! Model + JointPositions ──► forward_kinematics ──► KinematicFrame
//!                                                    ├─ link poses
//!                                                    └─ visual draws
//! ```
//!
//! Composition order at every joint is fixed:
//! `child_world = parent_world · joint_origin · actuation(q)`.

pub mod math;
pub mod positions;
pub mod walker;

pub use positions::JointPositions;
pub use walker::{
    KinematicFrame, LinkPose, VisualDraw, actuation_transform, forward_kinematics,
    joint_transform,
};
