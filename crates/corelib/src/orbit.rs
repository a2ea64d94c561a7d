//! Orbit controls: pointer drag/scroll mapped to camera rotation, pan and
//! dolly around a target point, with optional damping and auto-rotation.

use std::f32::consts::{PI, TAU};

use crate::Vec3;
use crate::camera::Camera;

const EPS: f32 = 1e-6;

/// Tunables for [`OrbitControls`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update when damping.
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 1.0 = one full turn per 60 s at 60 updates per second.
    pub auto_rotate_speed: f32,
    pub enable_rotate: bool,
    pub rotate_speed: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.04,
            auto_rotate: false,
            auto_rotate_speed: 1.0,
            enable_rotate: true,
            rotate_speed: 1.0,
            enable_pan: true,
            enable_zoom: false,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

/// Spherical coordinates around +Y: `phi` is the polar angle from +Y,
/// `theta` the azimuth measured from +Z towards +X.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius <= EPS {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

/// Orbit camera controller. Input methods only accumulate motion;
/// [`OrbitControls::update`] applies it to the camera once per frame.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    pub target: Vec3,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    interacting: bool,
}

impl OrbitControls {
    pub fn new(target: Vec3, settings: OrbitSettings) -> Self {
        Self {
            settings,
            target,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            interacting: false,
        }
    }

    /// Auto-rotation pauses while a pointer gesture is active.
    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Rotate from a pointer drag measured in pixels.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        if !self.settings.enable_rotate {
            return;
        }
        let h = viewport_height.max(1) as f32;
        self.rotate_left(TAU * dx / h * self.settings.rotate_speed);
        self.rotate_up(TAU * dy / h * self.settings.rotate_speed);
    }

    /// Pan from a pointer drag measured in pixels. Distance moved scales
    /// with the distance to the target so the point under the cursor follows it.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: u32, camera: &Camera) {
        if !self.settings.enable_pan {
            return;
        }
        let h = viewport_height.max(1) as f32;
        let target_distance = (camera.eye - self.target).length() * (camera.fov_y_rad * 0.5).tan();
        let left = 2.0 * dx * target_distance / h;
        let up = 2.0 * dy * target_distance / h;
        self.pan_offset += camera.right() * -left;
        self.pan_offset += camera.screen_up() * up;
    }

    /// Positive `steps` move towards the target. Ignored when zoom is disabled.
    pub fn dolly(&mut self, steps: f32) {
        if !self.settings.enable_zoom || steps == 0.0 {
            return;
        }
        let zoom_scale = 0.95f32.powf(self.settings.zoom_speed);
        self.scale *= zoom_scale.powf(steps);
    }

    fn auto_rotation_angle(&self) -> f32 {
        TAU / 60.0 / 60.0 * self.settings.auto_rotate_speed
    }

    /// Apply pending motion to `camera`. Returns `true` if the eye moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let s = self.settings;
        let mut sph = Spherical::from_offset(camera.eye - self.target);

        if s.auto_rotate && !self.interacting {
            self.rotate_left(self.auto_rotation_angle());
        }

        if s.enable_damping {
            sph.theta += self.delta_theta * s.damping_factor;
            sph.phi += self.delta_phi * s.damping_factor;
        } else {
            sph.theta += self.delta_theta;
            sph.phi += self.delta_phi;
        }

        let min_phi = s.min_polar_angle.max(EPS);
        let max_phi = s.max_polar_angle.min(PI - EPS);
        sph.phi = sph.phi.clamp(min_phi, max_phi.max(min_phi));
        sph.radius = (sph.radius * self.scale).clamp(s.min_distance, s.max_distance);

        if s.enable_damping {
            self.target += self.pan_offset * s.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        let new_eye = self.target + sph.to_offset();
        let moved = new_eye.distance_squared(camera.eye) > EPS;
        camera.eye = new_eye;
        camera.target = self.target;

        if s.enable_damping {
            let keep = 1.0 - s.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    fn camera() -> Camera {
        Camera::new_perspective(
            vec3(4.0, 0.8, 4.0),
            Vec3::ZERO,
            Vec3::Y,
            45f32.to_radians(),
            0.1,
            1000.0,
            16.0 / 9.0,
        )
    }

    fn azimuth(cam: &Camera) -> f32 {
        cam.eye.x.atan2(cam.eye.z)
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let mut cam = camera();
        let before = cam.eye;
        let mut controls = OrbitControls::new(Vec3::ZERO, OrbitSettings::default());
        assert!(!controls.update(&mut cam));
        assert!(cam.eye.distance(before) < 1e-4);
    }

    #[test]
    fn damped_rotation_converges_to_requested_angle() {
        let mut cam = camera();
        let start = azimuth(&cam);
        let mut controls = OrbitControls::new(Vec3::ZERO, OrbitSettings::default());
        controls.rotate_left(0.5);

        controls.update(&mut cam);
        let first_step = start - azimuth(&cam);
        assert!((first_step - 0.5 * 0.04).abs() < 1e-4);

        for _ in 0..2000 {
            controls.update(&mut cam);
        }
        assert!(((start - azimuth(&cam)) - 0.5).abs() < 1e-3);
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = camera();
        let start = azimuth(&cam);
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(Vec3::ZERO, settings);
        controls.rotate_left(0.25);
        controls.update(&mut cam);
        assert!(((start - azimuth(&cam)) - 0.25).abs() < 1e-4);
    }

    #[test]
    fn orbit_preserves_distance_to_target() {
        let mut cam = camera();
        let radius = cam.eye.length();
        let mut controls = OrbitControls::new(Vec3::ZERO, OrbitSettings::default());
        controls.rotate_by_pixels(120.0, -40.0, 720);
        for _ in 0..100 {
            controls.update(&mut cam);
        }
        assert!((cam.eye.length() - radius).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped_above_pole() {
        let mut cam = camera();
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(Vec3::ZERO, settings);
        controls.rotate_up(10.0);
        controls.update(&mut cam);
        assert!(cam.eye.y > 0.0);
        assert!(cam.eye.x.is_finite() && cam.eye.z.is_finite());
        assert!(cam.eye.x.abs() < 1e-3 && cam.eye.z.abs() < 1e-3);
    }

    #[test]
    fn zoom_is_ignored_when_disabled() {
        let mut cam = camera();
        let radius = cam.eye.length();
        let mut controls = OrbitControls::new(Vec3::ZERO, OrbitSettings::default());
        controls.dolly(3.0);
        controls.update(&mut cam);
        assert!((cam.eye.length() - radius).abs() < 1e-4);
    }

    #[test]
    fn zoom_in_moves_closer_when_enabled() {
        let mut cam = camera();
        let radius = cam.eye.length();
        let settings = OrbitSettings {
            enable_zoom: true,
            min_distance: 1.0,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(Vec3::ZERO, settings);
        controls.dolly(1.0);
        controls.update(&mut cam);
        assert!((cam.eye.length() - radius * 0.95).abs() < 1e-3);

        controls.dolly(1000.0);
        controls.update(&mut cam);
        assert!((cam.eye.length() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn auto_rotate_advances_azimuth_each_update() {
        let mut cam = camera();
        let start = azimuth(&cam);
        let settings = OrbitSettings {
            enable_damping: false,
            auto_rotate: true,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(Vec3::ZERO, settings);
        controls.update(&mut cam);
        let expected = TAU / 3600.0;
        assert!(((start - azimuth(&cam)) - expected).abs() < 1e-5);

        controls.set_interacting(true);
        let paused = azimuth(&cam);
        controls.update(&mut cam);
        assert!((azimuth(&cam) - paused).abs() < 1e-6);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut cam = camera();
        let offset = cam.eye - Vec3::ZERO;
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(Vec3::ZERO, settings);
        controls.pan_by_pixels(50.0, 0.0, 720, &cam);
        controls.update(&mut cam);
        assert!(controls.target.length() > 0.0);
        assert_eq!(cam.target, controls.target);
        assert!(((cam.eye - cam.target) - offset).length() < 1e-3);
    }
}
