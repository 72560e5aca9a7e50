//! Depth-first forward kinematics over the link/joint tree.
//!
//! The tree is never materialised: children of a link are found by
//! filtering joints on their parent name, in document order. A visited set
//! guards against malformed joint sets that revisit a link.

use std::collections::HashSet;

use nalgebra::{Matrix4, Vector3};
use tracing::warn;

use urdfview_urdf::{Joint, JointType, Link, Model, Visual};

use crate::math::{axis_angle_transform, origin_transform, translation_of, translation_transform};
use crate::positions::JointPositions;

// ---------------------------------------------------------------------------
// Frame types
// ---------------------------------------------------------------------------

/// World transform of one link.
#[derive(Debug, Clone)]
pub struct LinkPose<'a> {
    pub link: &'a Link,
    pub world: Matrix4<f32>,
}

/// A visual to draw, with its final transform (link world · visual origin).
#[derive(Debug, Clone)]
pub struct VisualDraw<'a> {
    pub link: &'a str,
    pub visual: &'a Visual,
    pub transform: Matrix4<f32>,
}

impl VisualDraw<'_> {
    /// Resolved RGBA: the visual's material color or the default gray.
    pub fn color(&self) -> [f32; 4] {
        self.visual.color()
    }
}

/// Result of one forward-kinematics pass.
///
/// Poses and draws are in traversal order (root first, children in
/// document order). Links unreachable from the root are absent.
#[derive(Debug, Clone, Default)]
pub struct KinematicFrame<'a> {
    poses: Vec<LinkPose<'a>>,
    draws: Vec<VisualDraw<'a>>,
}

impl<'a> KinematicFrame<'a> {
    pub fn poses(&self) -> &[LinkPose<'a>] {
        &self.poses
    }

    pub fn draws(&self) -> &[VisualDraw<'a>] {
        &self.draws
    }

    /// World transform of `link`, if it was visited.
    pub fn pose(&self, link: &str) -> Option<&Matrix4<f32>> {
        self.poses
            .iter()
            .find(|p| p.link.name == link)
            .map(|p| &p.world)
    }

    /// World position of the `link` frame origin.
    pub fn position(&self, link: &str) -> Option<Vector3<f32>> {
        self.pose(link).map(translation_of)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Joint transforms
// ---------------------------------------------------------------------------

/// Motion contributed by a joint at parameter `value`.
///
/// Revolute and continuous joints rotate `value` radians about the
/// normalized axis; prismatic joints translate `axis · value`; every other
/// type contributes nothing.
pub fn actuation_transform(joint: &Joint, value: f32) -> Matrix4<f32> {
    match joint.joint_type {
        JointType::Revolute | JointType::Continuous => axis_angle_transform(joint.axis, value),
        JointType::Prismatic => {
            let [x, y, z] = joint.axis;
            translation_transform([x * value, y * value, z * value])
        }
        _ => Matrix4::identity(),
    }
}

/// Transform from the parent link frame to the child link frame:
/// static origin first, then actuation.
pub fn joint_transform(joint: &Joint, value: f32) -> Matrix4<f32> {
    origin_transform(&joint.origin) * actuation_transform(joint, value)
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Compute world transforms for every link reachable from the model root.
///
/// The root frame is the world frame. Joints missing from `positions` read
/// as 0. Returns an empty frame when the model has no root.
pub fn forward_kinematics<'a>(model: &'a Model, positions: &JointPositions) -> KinematicFrame<'a> {
    let mut walker = Walker {
        model,
        positions,
        visited: HashSet::new(),
        frame: KinematicFrame::default(),
    };
    if let Some(root) = model.root() {
        walker.visit(root, Matrix4::identity());
    }
    walker.frame
}

struct Walker<'a, 'p> {
    model: &'a Model,
    positions: &'p JointPositions,
    visited: HashSet<&'a str>,
    frame: KinematicFrame<'a>,
}

impl<'a> Walker<'a, '_> {
    fn visit(&mut self, name: &'a str, world: Matrix4<f32>) {
        let Ok(link) = self.model.link(name) else {
            warn!(link = name, "joint child is not a defined link, skipping subtree");
            return;
        };
        if !self.visited.insert(name) {
            warn!(link = name, "link reached twice, kinematic cycle skipped");
            return;
        }

        if let Some(visual) = &link.visual {
            self.frame.draws.push(VisualDraw {
                link: &link.name,
                visual,
                transform: world * origin_transform(&visual.origin),
            });
        }
        self.frame.poses.push(LinkPose { link, world });

        let model = self.model;
        for joint in model.child_joints(name) {
            let value = self.positions.get(&joint.name);
            let child_world = world * joint_transform(joint, value);
            self.visit(&joint.child, child_world);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
