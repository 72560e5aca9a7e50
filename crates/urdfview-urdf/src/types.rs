//! Core data types for the in-memory robot description.
//!
//! These types are the crate's canonical representation of a robot model,
//! independent of the XML layer. Links and joints live in flat name-keyed
//! maps; the kinematic tree is derived from joint parent/child names rather
//! than stored as pointers, so a malformed description can never produce a
//! reference cycle in memory.

use std::collections::{HashMap, HashSet, VecDeque};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::UrdfError;

/// Color used for visuals without a resolvable material.
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// URDF joint type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JointType {
    /// No relative motion between parent and child.
    Fixed,
    /// Rotation about a single axis, with position limits.
    Revolute,
    /// Unlimited rotation about a single axis.
    Continuous,
    /// Translation along an axis.
    Prismatic,
    /// Unconstrained 6-DOF joint. Accepted, never actuated.
    Floating,
    /// Planar motion. Accepted, never actuated.
    Planar,
    /// Any other type string. Accepted, never actuated.
    Other(String),
}

impl JointType {
    /// Map a URDF `type` attribute onto a joint type.
    pub fn parse(value: &str) -> Self {
        match value {
            "fixed" => Self::Fixed,
            "revolute" => Self::Revolute,
            "continuous" => Self::Continuous,
            "prismatic" => Self::Prismatic,
            "floating" => Self::Floating,
            "planar" => Self::Planar,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The URDF spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fixed => "fixed",
            Self::Revolute => "revolute",
            Self::Continuous => "continuous",
            Self::Prismatic => "prismatic",
            Self::Floating => "floating",
            Self::Planar => "planar",
            Self::Other(name) => name,
        }
    }

    /// Whether the joint parameter moves the child (revolute, continuous, prismatic).
    pub const fn is_actuated(&self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous | Self::Prismatic)
    }

    /// Whether the joint parameter is an angle rather than a displacement.
    pub const fn is_rotational(&self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous)
    }

    /// Whether the session tracks a parameter for this joint.
    ///
    /// Everything except `fixed` gets an entry, including types that are
    /// accepted but not actuated.
    pub const fn has_parameter(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Position limits of a joint (rad or m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub lower: f32,
    pub upper: f32,
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A static pose specified as translation + roll-pitch-yaw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Origin {
    /// Translation `[x, y, z]` in meters.
    pub xyz: [f32; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    pub rpy: [f32; 3],
}

impl Origin {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        xyz: [0.0; 3],
        rpy: [0.0; 3],
    };

    pub const fn new(xyz: [f32; 3], rpy: [f32; 3]) -> Self {
        Self { xyz, rpy }
    }

    /// Whether both translation and rotation are exactly zero.
    pub fn is_identity(&self) -> bool {
        self.xyz.iter().chain(self.rpy.iter()).all(|v| *v == 0.0)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Scale applied to a mesh file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshScale {
    Uniform(f32),
    PerAxis([f32; 3]),
}

impl MeshScale {
    /// Per-axis scale factors.
    pub const fn factors(&self) -> [f32; 3] {
        match *self {
            Self::Uniform(s) => [s, s, s],
            Self::PerAxis(v) => v,
        }
    }
}

/// Shape of a visual element.
///
/// Exactly one variant is active. Unknown or missing shapes become
/// [`Geometry::None`] and render nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geometry {
    Box {
        size: [f32; 3],
    },
    Sphere {
        radius: f32,
    },
    /// Cylinder centered on the link frame, axis along +Z.
    Cylinder {
        radius: f32,
        length: f32,
    },
    Mesh {
        filename: String,
        scale: Option<MeshScale>,
    },
    #[default]
    None,
}

impl Geometry {
    /// Short lowercase name of the active variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Mesh { .. } => "mesh",
            Self::None => "none",
        }
    }
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// Named RGBA material.
///
/// Named materials are owned by the [`Model`] and shared by every visual
/// that references them; inline materials are owned by a single visual.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name. May be empty for anonymous inline materials.
    pub name: String,
    /// RGBA color `[r, g, b, a]`, each in `0.0..=1.0`.
    pub color: [f32; 4],
}

impl Material {
    pub fn new(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    /// Build a material from however many channels the description gave.
    ///
    /// Fewer than three channels yields [`DEFAULT_COLOR`]; a missing alpha
    /// becomes 1.0; channels past the fourth are ignored.
    pub fn from_channels(name: impl Into<String>, channels: &[f32]) -> Self {
        let color = match *channels {
            [r, g, b] => [r, g, b, 1.0],
            [r, g, b, a, ..] => [r, g, b, a],
            _ => DEFAULT_COLOR,
        };
        Self::new(name, color)
    }

    /// Material with the default gray color.
    pub fn default_gray(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_COLOR)
    }
}

// ---------------------------------------------------------------------------
// Visual
// ---------------------------------------------------------------------------

/// The visual element of a link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visual {
    pub geometry: Geometry,
    /// Offset from the owning link frame.
    pub origin: Origin,
    pub material: Option<Arc<Material>>,
}

impl Visual {
    /// The color to draw with: the material's, or [`DEFAULT_COLOR`].
    pub fn color(&self) -> [f32; 4] {
        self.material.as_ref().map_or(DEFAULT_COLOR, |m| m.color)
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A rigid body in the kinematic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub name: String,
    /// At most one visual. Links without one still take part in kinematics.
    pub visual: Option<Visual>,
}

impl Link {
    /// Create a link with no visual.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visual: None,
        }
    }

    #[must_use]
    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }
}

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// A typed connection from a parent link to a child link.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    /// Rotation or translation axis in the joint frame, default `[0, 0, 1]`.
    pub axis: [f32; 3],
    /// Static offset from the parent link frame, applied before actuation.
    pub origin: Origin,
    pub limits: Option<JointLimits>,
}

impl Joint {
    /// Create a joint with default axis, identity origin and no limits.
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            joint_type,
            parent: parent.into(),
            child: child.into(),
            axis: [0.0, 0.0, 1.0],
            origin: Origin::IDENTITY,
            limits: None,
        }
    }

    #[must_use]
    pub const fn with_axis(mut self, axis: [f32; 3]) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some(JointLimits { lower, upper });
        self
    }

    /// Range an interactive control should offer for this joint.
    ///
    /// Uses the declared limits when present, otherwise ±π for rotational
    /// joints and ±1 m for everything else.
    pub fn control_range(&self) -> (f32, f32) {
        match self.limits {
            Some(JointLimits { lower, upper }) if lower < upper => (lower, upper),
            _ if self.joint_type.is_rotational() => (-PI, PI),
            _ => (-1.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Complete in-memory robot description.
///
/// Owns the link, joint and material registries. Insertion keeps the
/// document order of first appearance; inserting an existing name replaces
/// the entry (last write wins) without moving it.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Robot name.
    pub name: String,
    links: HashMap<String, Link>,
    joints: HashMap<String, Joint>,
    materials: HashMap<String, Arc<Material>>,
    link_order: Vec<String>,
    joint_order: Vec<String>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Insert a link. Returns `true` if it replaced an existing one.
    pub fn insert_link(&mut self, link: Link) -> bool {
        let name = link.name.clone();
        let replaced = self.links.insert(name.clone(), link).is_some();
        if !replaced {
            self.link_order.push(name);
        }
        replaced
    }

    /// Insert a joint. Returns `true` if it replaced an existing one.
    pub fn insert_joint(&mut self, joint: Joint) -> bool {
        let name = joint.name.clone();
        let replaced = self.joints.insert(name.clone(), joint).is_some();
        if !replaced {
            self.joint_order.push(name);
        }
        replaced
    }

    /// Register a named material and return the shared handle.
    pub fn insert_material(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        self.materials
            .insert(material.name.clone(), Arc::clone(&material));
        material
    }

    /// Get a link by name.
    pub fn link(&self, name: &str) -> Result<&Link, UrdfError> {
        self.links
            .get(name)
            .ok_or_else(|| UrdfError::MissingLink(name.into()))
    }

    /// Get a joint by name.
    pub fn joint(&self, name: &str) -> Result<&Joint, UrdfError> {
        self.joints
            .get(name)
            .ok_or_else(|| UrdfError::MissingJoint(name.into()))
    }

    /// Get a registered material by name.
    pub fn material(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    /// Links in document order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.link_order.iter().filter_map(|n| self.links.get(n))
    }

    /// Joints in document order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joint_order.iter().filter_map(|n| self.joints.get(n))
    }

    /// Registered materials, in no particular order.
    pub fn materials(&self) -> impl Iterator<Item = &Arc<Material>> {
        self.materials.values()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Joints whose parent is `link`, in document order.
    pub fn child_joints<'a>(&'a self, link: &'a str) -> impl Iterator<Item = &'a Joint> + 'a {
        self.joints().filter(move |j| j.parent == link)
    }

    /// Every link that is never the child of a joint, in document order.
    pub fn root_candidates(&self) -> Vec<&str> {
        let children: HashSet<&str> = self.joints.values().map(|j| j.child.as_str()).collect();
        self.link_order
            .iter()
            .map(String::as_str)
            .filter(|name| !children.contains(name))
            .collect()
    }

    /// The root link: the first link in document order that is never a child.
    pub fn root(&self) -> Option<&str> {
        self.root_candidates().into_iter().next()
    }

    /// Links not reachable from [`Model::root`] through child joints.
    ///
    /// These are skipped by traversal. With no root, every link is unreachable.
    pub fn unreachable_links(&self) -> Vec<&str> {
        let mut visited: HashSet<&str> = HashSet::new();
        if let Some(root) = self.root() {
            let mut queue = VecDeque::from([root]);
            while let Some(link) = queue.pop_front() {
                if !visited.insert(link) {
                    continue;
                }
                queue.extend(self.child_joints(link).map(|j| j.child.as_str()));
            }
        }
        self.link_order
            .iter()
            .map(String::as_str)
            .filter(|name| !visited.contains(name))
            .collect()
    }

    /// Joints that carry a session parameter (every non-fixed joint), in document order.
    pub fn parameterized_joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints().filter(|j| j.joint_type.has_parameter())
    }

    /// Actuated joints (revolute, continuous, prismatic), in document order.
    pub fn actuated_joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints().filter(|j| j.joint_type.is_actuated())
    }

    /// Number of actuated degrees of freedom.
    pub fn dof(&self) -> usize {
        self.actuated_joints().count()
    }

    /// Names of actuated joints, in document order.
    pub fn actuated_joint_names(&self) -> Vec<&str> {
        self.actuated_joints().map(|j| j.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
