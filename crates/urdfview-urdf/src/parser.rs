//! URDF XML parsing using `roxmltree`.
//!
//! Builds the crate's canonical [`Model`] directly from the XML tree. Only
//! structural problems fail the parse (unparsable markup, missing required
//! attributes, no root link). Malformed numbers, unknown shapes and
//! unresolved material references are replaced by defaults and reported
//! through `tracing` warnings so the rest of the document still loads.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::error::UrdfError;
use crate::types::{
    Geometry, Joint, JointLimits, JointType, Link, Material, MeshScale, Model, Origin, Visual,
};

const DEFAULT_AXIS: [f32; 3] = [0.0, 0.0, 1.0];
const DEFAULT_BOX_SIZE: [f32; 3] = [1.0, 1.0, 1.0];
const DEFAULT_RADIUS: f32 = 0.1;
const DEFAULT_CYLINDER_LENGTH: f32 = 1.0;

// ---------------------------------------------------------------------------
// ParseOptions
// ---------------------------------------------------------------------------

/// Knobs controlling how strict the parser is about the tree shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject descriptions with more than one root candidate instead of
    /// picking the first one in document order.
    pub strict_root: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a URDF file from disk into a [`Model`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<Model, UrdfError> {
    parse_file_with(path, &ParseOptions::default())
}

/// Parse a URDF file from disk with explicit options.
pub fn parse_file_with(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Model, UrdfError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| UrdfError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string_with(&content, options)
}

/// Parse a URDF XML string into a [`Model`].
pub fn parse_string(xml: &str) -> Result<Model, UrdfError> {
    parse_string_with(xml, &ParseOptions::default())
}

/// Parse a URDF XML string with explicit options.
pub fn parse_string_with(xml: &str, options: &ParseOptions) -> Result<Model, UrdfError> {
    let doc = Document::parse(xml).map_err(|e| UrdfError::Xml(e.to_string()))?;
    let robot = doc.root_element();
    if !robot.has_tag_name("robot") {
        return Err(UrdfError::UnexpectedRoot(robot.tag_name().name().to_owned()));
    }

    let mut model = Model::new(robot.attribute("name").unwrap_or_default());

    // Materials first so that visuals can resolve named references
    // regardless of where the <material> elements sit in the document.
    for node in elements(robot, "material") {
        let material = parse_material(node)?;
        if model.material(&material.name).is_some() {
            warn!(material = %material.name, "duplicate material, later definition wins");
        }
        model.insert_material(material);
    }

    for node in elements(robot, "link") {
        let link = parse_link(node, &model)?;
        let name = link.name.clone();
        if model.insert_link(link) {
            warn!(link = %name, "duplicate link, later definition wins");
        }
    }

    for node in elements(robot, "joint") {
        let joint = parse_joint(node)?;
        let name = joint.name.clone();
        if model.insert_joint(joint) {
            warn!(joint = %name, "duplicate joint, later definition wins");
        }
    }

    check_tree(&model, options)?;
    debug!(
        robot = %model.name,
        links = model.link_count(),
        joints = model.joint_count(),
        materials = model.material_count(),
        "parsed robot description"
    );
    Ok(model)
}

// ---------------------------------------------------------------------------
// Tree validation
// ---------------------------------------------------------------------------

fn check_tree(model: &Model, options: &ParseOptions) -> Result<(), UrdfError> {
    for joint in model.joints() {
        for (role, link) in [("parent", &joint.parent), ("child", &joint.child)] {
            if model.link(link).is_err() {
                warn!(joint = %joint.name, role, link = %link, "joint references unknown link");
            }
        }
    }

    let mut parents: HashMap<&str, &str> = HashMap::new();
    for joint in model.joints() {
        if let Some(previous) = parents.insert(joint.child.as_str(), joint.name.as_str()) {
            warn!(
                link = %joint.child,
                first = previous,
                second = %joint.name,
                "link has more than one parent joint"
            );
        }
    }

    let candidates = model.root_candidates();
    match candidates.as_slice() {
        [] => return Err(UrdfError::NoRootLink),
        [_] => {}
        [first, ..] => {
            if options.strict_root {
                return Err(UrdfError::AmbiguousRoot(
                    candidates.iter().map(|c| (*c).to_owned()).collect(),
                ));
            }
            warn!(root = first, candidates = ?candidates, "multiple root candidates, using first");
        }
    }

    let unreachable = model.unreachable_links();
    if !unreachable.is_empty() {
        warn!(links = ?unreachable, "links not reachable from the root will not be drawn");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Element parsers
// ---------------------------------------------------------------------------

fn parse_material(node: Node) -> Result<Material, UrdfError> {
    let name = required_attr(node, "material", "name")?;
    let material = match child(node, "color") {
        Some(color) => color_material(name, color),
        None => Material::default_gray(name),
    };
    Ok(material)
}

fn parse_link(node: Node, model: &Model) -> Result<Link, UrdfError> {
    let name = required_attr(node, "link", "name")?;
    let mut visuals = elements(node, "visual");
    let visual = visuals.next().map(|v| parse_visual(v, name, model));
    if visuals.next().is_some() {
        debug!(link = name, "link has several visuals, only the first is used");
    }
    Ok(Link {
        name: name.to_owned(),
        visual,
    })
}

fn parse_visual(node: Node, link: &str, model: &Model) -> Visual {
    Visual {
        geometry: parse_geometry(node, link),
        origin: parse_origin(child(node, "origin"), link),
        material: child(node, "material").and_then(|m| resolve_material(m, link, model)),
    }
}

/// Inline colour wins over a name reference; an unknown name yields no material.
fn resolve_material(node: Node, link: &str, model: &Model) -> Option<Arc<Material>> {
    let name = node.attribute("name").unwrap_or_default();
    if let Some(color) = child(node, "color") {
        return Some(Arc::new(color_material(name, color)));
    }
    if name.is_empty() {
        warn!(link, "visual material has neither a name nor a color");
        return None;
    }
    let found = model.material(name).map(Arc::clone);
    if found.is_none() {
        warn!(link, material = name, "unresolved material reference, using default color");
    }
    found
}

fn color_material(name: &str, color: Node) -> Material {
    let Some(rgba) = color.attribute("rgba") else {
        warn!(material = name, "color element without rgba, using default color");
        return Material::default_gray(name);
    };
    match parse_floats(rgba) {
        Some(channels) => {
            if channels.len() < 3 {
                warn!(material = name, rgba, "fewer than three color channels, using default color");
            }
            Material::from_channels(name, &channels)
        }
        None => {
            warn!(material = name, rgba, "malformed rgba, using default color");
            Material::default_gray(name)
        }
    }
}

fn parse_geometry(visual: Node, link: &str) -> Geometry {
    let Some(geometry) = child(visual, "geometry") else {
        warn!(link, "visual without geometry renders nothing");
        return Geometry::None;
    };
    for shape in geometry.children().filter(Node::is_element) {
        match shape.tag_name().name() {
            "box" => {
                return Geometry::Box {
                    size: vec3_attr(shape, "size", DEFAULT_BOX_SIZE, link),
                };
            }
            "sphere" => {
                return Geometry::Sphere {
                    radius: f32_attr(shape, "radius", DEFAULT_RADIUS, link),
                };
            }
            "cylinder" => {
                return Geometry::Cylinder {
                    radius: f32_attr(shape, "radius", DEFAULT_RADIUS, link),
                    length: f32_attr(shape, "length", DEFAULT_CYLINDER_LENGTH, link),
                };
            }
            "mesh" => return parse_mesh(shape, link),
            other => debug!(link, shape = other, "skipping unsupported geometry element"),
        }
    }
    warn!(link, "no supported geometry shape, visual renders nothing");
    Geometry::None
}

fn parse_mesh(node: Node, link: &str) -> Geometry {
    let filename = node.attribute("filename").unwrap_or_default().trim();
    if filename.is_empty() {
        warn!(link, "mesh without filename renders nothing");
        return Geometry::None;
    }
    let scale = node.attribute("scale").and_then(|text| {
        let scale = match parse_floats(text).as_deref() {
            Some([s]) => Some(MeshScale::Uniform(*s)),
            Some([x, y, z]) => Some(MeshScale::PerAxis([*x, *y, *z])),
            _ => None,
        };
        if scale.is_none() {
            warn!(link, scale = text, "malformed mesh scale, ignoring it");
        }
        scale
    });
    Geometry::Mesh {
        filename: filename.to_owned(),
        scale,
    }
}

fn parse_joint(node: Node) -> Result<Joint, UrdfError> {
    let name = required_attr(node, "joint", "name")?;
    let joint_type = JointType::parse(required_attr(node, "joint", "type")?);
    let parent = link_ref(node, "parent")?;
    let child_link = link_ref(node, "child")?;

    let axis = child(node, "axis").map_or(DEFAULT_AXIS, |axis| {
        vec3_attr(axis, "xyz", DEFAULT_AXIS, name)
    });

    let limits = child(node, "limit").and_then(|limit| {
        let lower = f32_attr(limit, "lower", 0.0, name);
        let upper = f32_attr(limit, "upper", 0.0, name);
        (lower < upper).then_some(JointLimits { lower, upper })
    });

    if matches!(joint_type, JointType::Other(_)) {
        debug!(joint = name, kind = joint_type.as_str(), "unrecognised joint type treated as fixed");
    }

    Ok(Joint {
        name: name.to_owned(),
        joint_type,
        parent: parent.to_owned(),
        child: child_link.to_owned(),
        axis,
        origin: parse_origin(child(node, "origin"), name),
        limits,
    })
}

fn parse_origin(node: Option<Node>, context: &str) -> Origin {
    node.map_or(Origin::IDENTITY, |origin| Origin {
        xyz: vec3_attr(origin, "xyz", [0.0; 3], context),
        rpy: vec3_attr(origin, "rpy", [0.0; 3], context),
    })
}

fn link_ref<'a>(joint: Node<'a, '_>, role: &'static str) -> Result<&'a str, UrdfError> {
    let node = child(joint, role).ok_or(UrdfError::MissingElement {
        element: "joint",
        child: role,
    })?;
    required_attr(node, role, "link")
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |c| c.has_tag_name(tag))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Option<Node<'a, 'input>> {
    elements(node, tag).next()
}

fn required_attr<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, UrdfError> {
    node.attribute(attribute)
        .ok_or(UrdfError::MissingAttribute { element, attribute })
}

/// Parse exactly three whitespace-separated floats, e.g. an `xyz` attribute.
pub fn parse_vector3(text: &str) -> Option<[f32; 3]> {
    match parse_floats(text).as_deref() {
        Some([x, y, z]) => Some([*x, *y, *z]),
        _ => None,
    }
}

/// Parse whitespace-separated floats. `None` if any token is not a finite
/// number.
fn parse_floats(text: &str) -> Option<Vec<f32>> {
    text.split_whitespace().map(parse_finite).collect()
}

/// `nan` and `inf` parse as `f32` but are malformed field values here.
fn parse_finite(token: &str) -> Option<f32> {
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn vec3_attr(node: Node, attribute: &str, default: [f32; 3], context: &str) -> [f32; 3] {
    let Some(text) = node.attribute(attribute) else {
        return default;
    };
    if let Some(v) = parse_vector3(text) {
        return v;
    }
    warn!(
        element = node.tag_name().name(),
        attribute,
        value = text,
        context,
        "malformed vector, using default"
    );
    default
}

fn f32_attr(node: Node, attribute: &str, default: f32, context: &str) -> f32 {
    let Some(text) = node.attribute(attribute) else {
        return default;
    };
    if let Some(value) = parse_finite(text.trim()) {
        return value;
    }
    warn!(
        element = node.tag_name().name(),
        attribute,
        value = text,
        context,
        "malformed number, using default"
    );
    default
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
