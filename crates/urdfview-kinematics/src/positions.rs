//! Live joint parameters for one viewer session.

use std::collections::HashMap;

use urdfview_urdf::Model;

/// Joint name → angle (rad) or displacement (m).
///
/// Kept outside the [`Model`]: the model is immutable after parsing, while
/// these values change with every input event. Joints absent from the map
/// read as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointPositions {
    values: HashMap<String, f32>,
}

impl JointPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero entry for every non-fixed joint of `model`.
    pub fn for_model(model: &Model) -> Self {
        Self {
            values: model
                .parameterized_joints()
                .map(|j| (j.name.clone(), 0.0))
                .collect(),
        }
    }

    /// Current value, 0.0 when the joint has no entry.
    pub fn get(&self, joint: &str) -> f32 {
        self.values.get(joint).copied().unwrap_or(0.0)
    }

    /// Set a value, returning the previous one if there was an entry.
    pub fn set(&mut self, joint: impl Into<String>, value: f32) -> Option<f32> {
        self.values.insert(joint.into(), value)
    }

    pub fn contains(&self, joint: &str) -> bool {
        self.values.contains_key(joint)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for JointPositions {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use urdfview_urdf::{Joint, JointType, Link};

    fn model() -> Model {
        let mut model = Model::new("m");
        for name in ["base", "a", "b", "c"] {
            model.insert_link(Link::new(name));
        }
        model.insert_joint(Joint::new("rev", JointType::Revolute, "base", "a"));
        model.insert_joint(Joint::new("fix", JointType::Fixed, "a", "b"));
        model.insert_joint(Joint::new("float", JointType::Floating, "b", "c"));
        model
    }

    #[test]
    fn for_model_tracks_non_fixed_joints_at_zero() {
        let positions = JointPositions::for_model(&model());
        assert_eq!(positions.len(), 2);
        assert!(positions.contains("rev"));
        assert!(positions.contains("float"));
        assert!(!positions.contains("fix"));
        assert!(positions.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn missing_joint_reads_zero() {
        assert_eq!(JointPositions::new().get("anything"), 0.0);
    }

    #[test]
    fn set_replaces_value() {
        let mut positions = JointPositions::for_model(&model());
        assert_eq!(positions.set("rev", 1.2), Some(0.0));
        assert_eq!(positions.get("rev"), 1.2);
        assert_eq!(positions.set("rev", -0.3), Some(1.2));
        assert_eq!(positions.len(), 2);
    }

    #[test]
    fn collect_from_pairs() {
        let positions: JointPositions = [("a", 0.5), ("b", -1.0)].into_iter().collect();
        assert_eq!(positions.get("b"), -1.0);
    }
}
