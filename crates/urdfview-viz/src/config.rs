use std::path::Path;

use serde::{Deserialize, Serialize};

use urdfview_urdf::ParseOptions;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_orbit_sensitivity() -> f32 {
    0.5
}
const fn default_pan_sensitivity() -> f32 {
    0.01
}
const fn default_zoom_sensitivity() -> f32 {
    0.9
}
const fn default_min_distance() -> f32 {
    0.1
}
const fn default_max_distance() -> f32 {
    5000.0
}
const fn default_pitch_limit() -> f32 {
    89.0
}
const fn default_fit_multiplier() -> f32 {
    2.0
}
const fn default_fit_yaw() -> f32 {
    45.0
}
const fn default_fit_pitch() -> f32 {
    20.0
}
const fn default_home_distance() -> f32 {
    5.0
}
const fn default_home_yaw() -> f32 {
    45.0
}
const fn default_home_pitch() -> f32 {
    30.0
}
const fn default_background() -> [f32; 4] {
    [0.15, 0.15, 0.2, 1.0]
}
const fn default_fov_y() -> f32 {
    45.0
}
const fn default_near() -> f32 {
    0.1
}
const fn default_far() -> f32 {
    10_000.0
}

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Orbit camera tuning. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Degrees of yaw/pitch per pixel of primary drag.
    #[serde(default = "default_orbit_sensitivity")]
    pub orbit_sensitivity: f32,

    /// World units per pixel of secondary drag, per unit of orbit distance.
    #[serde(default = "default_pan_sensitivity")]
    pub pan_sensitivity: f32,

    /// Distance factor per scroll tick. Must lie in (0, 1).
    #[serde(default = "default_zoom_sensitivity")]
    pub zoom_sensitivity: f32,

    #[serde(default = "default_min_distance")]
    pub min_distance: f32,

    #[serde(default = "default_max_distance")]
    pub max_distance: f32,

    /// Pitch is clamped to `±pitch_limit`.
    #[serde(default = "default_pitch_limit")]
    pub pitch_limit: f32,

    /// Auto-fit distance as a multiple of the scene radius.
    #[serde(default = "default_fit_multiplier")]
    pub fit_multiplier: f32,

    #[serde(default = "default_fit_yaw")]
    pub fit_yaw: f32,

    #[serde(default = "default_fit_pitch")]
    pub fit_pitch: f32,

    /// State restored by a view reset before re-fitting.
    #[serde(default = "default_home_distance")]
    pub home_distance: f32,

    #[serde(default = "default_home_yaw")]
    pub home_yaw: f32,

    #[serde(default = "default_home_pitch")]
    pub home_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            orbit_sensitivity: default_orbit_sensitivity(),
            pan_sensitivity: default_pan_sensitivity(),
            zoom_sensitivity: default_zoom_sensitivity(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            pitch_limit: default_pitch_limit(),
            fit_multiplier: default_fit_multiplier(),
            fit_yaw: default_fit_yaw(),
            fit_pitch: default_fit_pitch(),
            home_distance: default_home_distance(),
            home_yaw: default_home_yaw(),
            home_pitch: default_home_pitch(),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("camera.orbit_sensitivity", self.orbit_sensitivity)?;
        positive("camera.pan_sensitivity", self.pan_sensitivity)?;
        ensure(
            self.zoom_sensitivity > 0.0 && self.zoom_sensitivity < 1.0,
            "camera.zoom_sensitivity",
            || format!("{} (must be in (0, 1))", self.zoom_sensitivity),
        )?;
        positive("camera.min_distance", self.min_distance)?;
        ensure(
            self.max_distance > self.min_distance,
            "camera.max_distance",
            || format!("{} (must be > min_distance {})", self.max_distance, self.min_distance),
        )?;
        ensure(
            self.pitch_limit > 0.0 && self.pitch_limit < 90.0,
            "camera.pitch_limit",
            || format!("{} (must be in (0, 90))", self.pitch_limit),
        )?;
        within_pitch_limit("camera.fit_pitch", self.fit_pitch, self.pitch_limit)?;
        within_pitch_limit("camera.home_pitch", self.home_pitch, self.pitch_limit)?;
        positive("camera.fit_multiplier", self.fit_multiplier)?;
        positive("camera.home_distance", self.home_distance)
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Scene setup sent to the render backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Clear color, RGBA.
    #[serde(default = "default_background")]
    pub background: [f32; 4],

    /// Vertical field of view in degrees.
    #[serde(default = "default_fov_y")]
    pub fov_y: f32,

    #[serde(default = "default_near")]
    pub near: f32,

    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            fov_y: default_fov_y(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.fov_y > 0.0 && self.fov_y < 180.0, "render.fov_y", || {
            format!("{} (must be in (0, 180))", self.fov_y)
        })?;
        positive("render.near", self.near)?;
        ensure(self.far > self.near, "render.far", || {
            format!("{} (must be > near {})", self.far, self.near)
        })
    }
}

// ---------------------------------------------------------------------------
// ViewerConfig
// ---------------------------------------------------------------------------

/// Main viewer configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Reject descriptions with several root candidates instead of picking
    /// the first in document order.
    #[serde(default)]
    pub strict_root: bool,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl ViewerConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.render.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parser options implied by this configuration.
    pub const fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict_root: self.strict_root,
        }
    }
}

/// NaN fails every check since all comparisons with it are false.
fn ensure(ok: bool, field: &str, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, message()))
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    ensure(value > 0.0, field, || format!("{value} (must be > 0)"))
}

fn within_pitch_limit(field: &str, pitch: f32, limit: f32) -> Result<(), ConfigError> {
    ensure(pitch.abs() <= limit, field, || {
        format!("{pitch} (must be within pitch_limit ±{limit})")
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Defaults --

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.strict_root);
        assert_eq!(config.camera.min_distance, 0.1);
        assert_eq!(config.camera.max_distance, 5000.0);
        assert_eq!(config.render.background, [0.15, 0.15, 0.2, 1.0]);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ViewerConfig::from_toml_str(
            r"
            strict_root = true

            [camera]
            zoom_sensitivity = 0.8
            fit_multiplier = 3.0

            [render]
            fov_y = 60.0
            ",
        )
        .unwrap();
        assert!(config.strict_root);
        assert!(config.parse_options().strict_root);
        assert_eq!(config.camera.zoom_sensitivity, 0.8);
        assert_eq!(config.camera.fit_multiplier, 3.0);
        assert_eq!(config.camera.orbit_sensitivity, 0.5);
        assert_eq!(config.render.fov_y, 60.0);
        assert_eq!(config.render.far, 10_000.0);
    }

    #[test]
    fn toml_round_trip() {
        let config = ViewerConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ViewerConfig::from_toml_str(&text).unwrap(), config);
    }

    // -- Validation --

    #[test]
    fn rejects_zoom_outside_unit_interval() {
        for zoom in ["1.0", "0.0", "1.5", "-0.5"] {
            let err = ViewerConfig::from_toml_str(&format!("[camera]\nzoom_sensitivity = {zoom}"))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "camera.zoom_sensitivity"),
                "zoom {zoom}: {err}"
            );
        }
    }

    #[test]
    fn rejects_inverted_distance_range() {
        let mut config = ViewerConfig::default();
        config.camera.max_distance = 0.05;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "camera.max_distance"
        ));
    }

    #[test]
    fn rejects_pitch_limit_at_pole() {
        let mut config = ViewerConfig::default();
        config.camera.pitch_limit = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_fit_pitch_beyond_limit() {
        let err = ViewerConfig::from_toml_str("[camera]\nfit_pitch = 120.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "camera.fit_pitch"
        ));
        let config = ViewerConfig::from_toml_str("[camera]\npitch_limit = 60.0\nfit_pitch = -60.0");
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_home_pitch_beyond_limit() {
        let err = ViewerConfig::from_toml_str("[camera]\nhome_pitch = -150.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "camera.home_pitch"
        ));
        let mut config = ViewerConfig::default();
        config.camera.pitch_limit = 25.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "camera.home_pitch"
        ));
    }

    #[test]
    fn rejects_bad_clip_planes() {
        let mut config = ViewerConfig::default();
        config.render.near = 0.0;
        assert!(config.validate().is_err());
        config.render.near = 10.0;
        config.render.far = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "render.far"
        ));
    }

    #[test]
    fn rejects_non_positive_sensitivity() {
        let mut config = ViewerConfig::default();
        config.camera.orbit_sensitivity = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_is_rejected() {
        let mut config = ViewerConfig::default();
        config.render.fov_y = f32::NAN;
        assert!(config.validate().is_err());
    }

    // -- IO --

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        std::fs::write(&path, "[camera]\npitch_limit = 80.0\n").unwrap();
        let config = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(config.camera.pitch_limit, 80.0);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = ViewerConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_toml_error() {
        let err = ViewerConfig::from_toml_str("[camera\nfov = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
