//! Orbit camera: spherical coordinates around a movable center.
//!
//! The eye is never stored. It is derived from the orbit center, distance,
//! yaw and pitch, with world +Z as the up direction.

use nalgebra::{Matrix4, Point3, Vector3};
use tracing::warn;

use urdfview_scene::SceneBounds;

use crate::config::CameraConfig;

/// Orbit/pan/zoom camera state. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub center: Vector3<f32>,
    settings: CameraConfig,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl OrbitCamera {
    /// Camera in its home state.
    pub fn new(settings: CameraConfig) -> Self {
        let mut camera = Self {
            distance: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            center: Vector3::zeros(),
            settings,
        };
        camera.reset();
        camera
    }

    /// Rotate around the center by a pointer delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            warn!(dx, dy, "ignoring non-finite orbit delta");
            return;
        }
        let k = self.settings.orbit_sensitivity;
        self.yaw += dx * k;
        self.pitch = self.clamp_pitch(self.pitch + dy * k);
    }

    /// Move the center in the horizontal plane.
    ///
    /// Directions depend on yaw only; pitch is ignored. The step scales with
    /// distance so panning feels the same at any zoom level.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            warn!(dx, dy, "ignoring non-finite pan delta");
            return;
        }
        let step = self.settings.pan_sensitivity * self.distance;
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let right = Vector3::new(cos_yaw, sin_yaw, 0.0);
        let up = Vector3::new(-sin_yaw, cos_yaw, 0.0);
        self.center -= (right * dx + up * dy) * step;
    }

    /// Multiplicative zoom; positive ticks move closer.
    pub fn zoom(&mut self, ticks: f32) {
        if !ticks.is_finite() {
            warn!(ticks, "ignoring non-finite zoom");
            return;
        }
        let factor = self.settings.zoom_sensitivity.powf(ticks);
        self.distance = self.clamp_distance(self.distance * factor);
    }

    /// Frame `bounds`, discarding any previous orbit and pan. Non-finite
    /// bounds frame the default scene instead.
    pub fn auto_fit(&mut self, bounds: &SceneBounds) {
        let bounds = if bounds.radius.is_finite() && bounds.center.iter().all(|c| c.is_finite()) {
            *bounds
        } else {
            warn!(radius = bounds.radius, "non-finite scene bounds, fitting the default scene");
            SceneBounds::default()
        };
        self.distance = self.clamp_distance(bounds.radius * self.settings.fit_multiplier);
        self.center = bounds.center;
        self.yaw = self.settings.fit_yaw;
        self.pitch = self.clamp_pitch(self.settings.fit_pitch);
    }

    /// Back to the home state.
    pub fn reset(&mut self) {
        self.distance = self.clamp_distance(self.settings.home_distance);
        self.yaw = self.settings.home_yaw;
        self.pitch = self.clamp_pitch(self.settings.home_pitch);
        self.center = Vector3::zeros();
    }

    /// Eye position in world coordinates.
    pub fn eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        let offset = Vector3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch) * self.distance;
        Point3::from(self.center + offset)
    }

    pub fn target(&self) -> Point3<f32> {
        Point3::from(self.center)
    }

    /// Right-handed world-to-view matrix looking at the center, +Z up.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &self.target(), &Vector3::z())
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.settings.min_distance, self.settings.max_distance)
    }

    fn clamp_pitch(&self, pitch: f32) -> f32 {
        let limit = self.settings.pitch_limit;
        pitch.clamp(-limit, limit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -- Home state --

    #[test]
    fn starts_at_home() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.distance, 5.0);
        assert_eq!(cam.yaw, 45.0);
        assert_eq!(cam.pitch, 30.0);
        assert_eq!(cam.center, Vector3::zeros());
    }

    #[test]
    fn reset_restores_home() {
        let mut cam = OrbitCamera::default();
        cam.orbit(100.0, 20.0);
        cam.pan(5.0, 5.0);
        cam.zoom(3.0);
        cam.reset();
        assert_eq!(cam, OrbitCamera::default());
    }

    // -- Orbit --

    #[test]
    fn orbit_scales_by_sensitivity() {
        let mut cam = OrbitCamera::default();
        cam.orbit(10.0, -4.0);
        assert_relative_eq!(cam.yaw, 50.0);
        assert_relative_eq!(cam.pitch, 28.0);
    }

    #[test]
    fn pitch_never_leaves_limits() {
        let mut cam = OrbitCamera::default();
        for _ in 0..50 {
            cam.orbit(0.0, 1000.0);
            assert!(cam.pitch <= 89.0 && cam.pitch >= -89.0);
        }
        assert_eq!(cam.pitch, 89.0);
        for _ in 0..50 {
            cam.orbit(3.0, -1000.0);
            assert!(cam.pitch <= 89.0 && cam.pitch >= -89.0);
        }
        assert_eq!(cam.pitch, -89.0);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut cam = OrbitCamera::default();
        cam.orbit(1000.0, 0.0);
        assert_relative_eq!(cam.yaw, 545.0);
    }

    // -- Pan --

    #[test]
    fn pan_at_zero_yaw_moves_along_axes() {
        let mut cam = OrbitCamera::default();
        cam.yaw = 0.0;
        cam.distance = 10.0;
        cam.pan(2.0, 0.0);
        // step = 0.01 * 10
        assert_relative_eq!(cam.center, Vector3::new(-0.2, 0.0, 0.0), epsilon = 1e-6);
        cam.pan(0.0, 3.0);
        assert_relative_eq!(cam.center, Vector3::new(-0.2, -0.3, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn pan_follows_yaw_and_ignores_pitch() {
        let mut a = OrbitCamera::default();
        let mut b = OrbitCamera::default();
        a.yaw = 90.0;
        b.yaw = 90.0;
        b.pitch = -60.0;
        a.pan(1.0, 0.0);
        b.pan(1.0, 0.0);
        assert_relative_eq!(a.center, Vector3::new(0.0, -0.05, 0.0), epsilon = 1e-6);
        assert_relative_eq!(a.center, b.center);
    }

    #[test]
    fn pan_scales_with_distance() {
        let mut near = OrbitCamera::default();
        let mut far = OrbitCamera::default();
        near.distance = 1.0;
        far.distance = 100.0;
        near.pan(1.0, 1.0);
        far.pan(1.0, 1.0);
        assert_relative_eq!(far.center, near.center * 100.0, epsilon = 1e-4);
    }

    #[test]
    fn pan_keeps_height() {
        let mut cam = OrbitCamera::default();
        cam.center.z = 1.5;
        cam.pan(30.0, -12.0);
        assert_eq!(cam.center.z, 1.5);
    }

    // -- Zoom --

    #[test]
    fn zoom_is_multiplicative() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1.0);
        assert_relative_eq!(cam.distance, 4.5);
        cam.zoom(-1.0);
        assert_relative_eq!(cam.distance, 5.0, epsilon = 1e-5);
        cam.zoom(2.0);
        assert_relative_eq!(cam.distance, 5.0 * 0.81, epsilon = 1e-5);
    }

    #[test]
    fn zoom_respects_range() {
        let mut cam = OrbitCamera::default();
        for _ in 0..500 {
            cam.zoom(5.0);
            assert!(cam.distance >= 0.1);
        }
        assert_relative_eq!(cam.distance, 0.1);
        for _ in 0..500 {
            cam.zoom(-5.0);
            assert!(cam.distance <= 5000.0);
        }
        assert_relative_eq!(cam.distance, 5000.0);
    }

    // -- Auto-fit --

    #[test]
    fn auto_fit_frames_bounds() {
        let mut cam = OrbitCamera::default();
        cam.orbit(40.0, 40.0);
        cam.pan(10.0, 10.0);
        cam.auto_fit(&SceneBounds::new(Vector3::new(1.0, 2.0, 3.0), 1.5));
        assert_relative_eq!(cam.distance, 3.0);
        assert_eq!(cam.center, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(cam.yaw, 45.0);
        assert_eq!(cam.pitch, 20.0);
    }

    #[test]
    fn auto_fit_is_idempotent() {
        let bounds = SceneBounds::new(Vector3::new(0.5, 0.0, 0.2), 0.7);
        let mut cam = OrbitCamera::default();
        cam.auto_fit(&bounds);
        let first = cam.clone();
        cam.auto_fit(&bounds);
        assert_eq!(cam, first);
    }

    #[test]
    fn auto_fit_clamps_distance() {
        let mut cam = OrbitCamera::default();
        cam.auto_fit(&SceneBounds::new(Vector3::zeros(), 0.001));
        assert_eq!(cam.distance, 0.1);
        cam.auto_fit(&SceneBounds::new(Vector3::zeros(), 1e6));
        assert_eq!(cam.distance, 5000.0);
    }

    // -- View --

    #[test]
    fn eye_from_spherical_offset() {
        let mut cam = OrbitCamera::default();
        cam.yaw = 0.0;
        cam.pitch = 0.0;
        cam.distance = 2.0;
        cam.center = Vector3::new(1.0, 1.0, 1.0);
        assert_relative_eq!(cam.eye(), Point3::new(3.0, 1.0, 1.0), epsilon = 1e-6);

        cam.pitch = 89.0;
        assert!(cam.eye().z > 2.9);
    }

    #[test]
    fn view_matrix_maps_center_onto_negative_z() {
        let mut cam = OrbitCamera::default();
        cam.center = Vector3::new(0.3, -0.2, 0.5);
        let view = cam.view_matrix();
        let target = view.transform_point(&cam.target());
        assert_relative_eq!(target, Point3::new(0.0, 0.0, -cam.distance), epsilon = 1e-4);
        let eye = view.transform_point(&cam.eye());
        assert_relative_eq!(eye, Point3::origin(), epsilon = 1e-4);
    }

    #[test]
    fn home_and_fit_pitch_respect_limit() {
        let settings = CameraConfig {
            fit_pitch: 120.0,
            home_pitch: -150.0,
            ..CameraConfig::default()
        };
        let mut cam = OrbitCamera::new(settings);
        assert_eq!(cam.pitch, -89.0);
        cam.auto_fit(&SceneBounds::default());
        assert_eq!(cam.pitch, 89.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut cam = OrbitCamera::default();
        let before = cam.clone();
        cam.orbit(f32::NAN, 1.0);
        cam.orbit(1.0, f32::INFINITY);
        cam.pan(f32::NAN, 0.0);
        cam.zoom(f32::NAN);
        cam.zoom(f32::NEG_INFINITY);
        assert_eq!(cam, before);
    }

    #[test]
    fn non_finite_bounds_fit_default_scene() {
        let mut cam = OrbitCamera::default();
        cam.auto_fit(&SceneBounds::new(Vector3::zeros(), f32::NAN));
        assert_eq!(cam.distance, 2.0);
        assert_eq!(cam.center, Vector3::zeros());
        cam.auto_fit(&SceneBounds::new(Vector3::new(f32::INFINITY, 0.0, 0.0), 1.0));
        assert!(cam.eye().coords.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn custom_settings_apply() {
        let settings = CameraConfig {
            pitch_limit: 45.0,
            min_distance: 1.0,
            ..CameraConfig::default()
        };
        let mut cam = OrbitCamera::new(settings);
        cam.orbit(0.0, 500.0);
        assert_eq!(cam.pitch, 45.0);
        cam.zoom(100.0);
        assert_eq!(cam.distance, 1.0);
    }
}
