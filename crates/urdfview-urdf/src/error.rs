//! Error types for robot description loading.

use std::path::PathBuf;

/// Structural errors that abort loading a robot description.
///
/// Field-level problems (bad numbers, unresolved materials, unknown
/// geometry) never produce one of these; the parser substitutes a default
/// and logs a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum UrdfError {
    /// Failed to read the description file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The markup itself could not be parsed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The document element is not `<robot>`.
    #[error("expected <robot> document element, found <{0}>")]
    UnexpectedRoot(String),

    /// A required attribute is absent.
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A required child element is absent.
    #[error("<{element}> is missing required child <{child}>")]
    MissingElement {
        element: &'static str,
        child: &'static str,
    },

    /// A referenced link was not found in the model.
    #[error("missing link: {0}")]
    MissingLink(String),

    /// A referenced joint was not found in the model.
    #[error("missing joint: {0}")]
    MissingJoint(String),

    /// Every link is the child of some joint (or there are no links).
    #[error("no root link found")]
    NoRootLink,

    /// More than one link is never a child; only raised in strict mode.
    #[error("ambiguous root link, candidates: {}", .0.join(", "))]
    AmbiguousRoot(Vec<String>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = UrdfError::Xml("unexpected end of stream".into());
        assert_eq!(e.to_string(), "XML parse error: unexpected end of stream");

        let e = UrdfError::MissingLink("base_link".into());
        assert_eq!(e.to_string(), "missing link: base_link");

        let e = UrdfError::MissingJoint("joint1".into());
        assert_eq!(e.to_string(), "missing joint: joint1");

        let e = UrdfError::NoRootLink;
        assert_eq!(e.to_string(), "no root link found");

        let e = UrdfError::UnexpectedRoot("sdf".into());
        assert_eq!(e.to_string(), "expected <robot> document element, found <sdf>");
    }

    #[test]
    fn missing_attribute_names_element_and_attribute() {
        let e = UrdfError::MissingAttribute {
            element: "joint",
            attribute: "type",
        };
        assert_eq!(e.to_string(), "<joint> is missing required attribute 'type'");

        let e = UrdfError::MissingElement {
            element: "joint",
            child: "parent",
        };
        assert_eq!(e.to_string(), "<joint> is missing required child <parent>");
    }

    #[test]
    fn ambiguous_root_lists_candidates() {
        let e = UrdfError::AmbiguousRoot(vec!["a".into(), "b".into()]);
        assert_eq!(e.to_string(), "ambiguous root link, candidates: a, b");
    }

    #[test]
    fn io_error_includes_path() {
        let e = UrdfError::Io {
            path: PathBuf::from("/tmp/robot.urdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/robot.urdf"));
        assert!(msg.contains("not found"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn error_is_send_sync() {
        assert_send_sync::<UrdfError>();
    }
}
