//! Pointer gestures for the orbit controls: left drag rotates, right drag
//! pans, the wheel dollies.

use corelib::camera::Camera;
use corelib::orbit::OrbitControls;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Gesture {
    #[default]
    None,
    Rotate,
    Pan,
}

#[derive(Debug, Default)]
pub struct PointerState {
    gesture: Gesture,
    last: Option<(f64, f64)>,
}

impl PointerState {
    pub fn on_button(&mut self, button: MouseButton, state: ElementState, controls: &mut OrbitControls) {
        self.gesture = match (state, button) {
            (ElementState::Pressed, MouseButton::Left) => Gesture::Rotate,
            (ElementState::Pressed, MouseButton::Right) => Gesture::Pan,
            (ElementState::Released, _) => Gesture::None,
            (ElementState::Pressed, _) => self.gesture,
        };
        controls.set_interacting(self.gesture != Gesture::None);
    }

    pub fn on_cursor(
        &mut self,
        x: f64,
        y: f64,
        controls: &mut OrbitControls,
        camera: &Camera,
        viewport_height: u32,
    ) {
        if let Some((lx, ly)) = self.last {
            let (dx, dy) = ((x - lx) as f32, (y - ly) as f32);
            match self.gesture {
                Gesture::Rotate => controls.rotate_by_pixels(dx, dy, viewport_height),
                Gesture::Pan => controls.pan_by_pixels(dx, dy, viewport_height, camera),
                Gesture::None => {}
            }
        }
        self.last = Some((x, y));
    }

    pub fn on_cursor_left(&mut self) {
        self.last = None;
    }

    pub fn on_wheel(&mut self, delta: MouseScrollDelta, controls: &mut OrbitControls) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
        };
        controls.dolly(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{default_camera, default_controls};
    use corelib::orbit::OrbitSettings;

    fn eye_after(f: impl FnOnce(&mut PointerState, &mut OrbitControls, &Camera)) -> corelib::Vec3 {
        let mut camera = default_camera(1280, 720);
        let mut controls = default_controls();
        controls.settings = OrbitSettings {
            enable_damping: false,
            enable_zoom: true,
            ..controls.settings
        };
        let mut pointer = PointerState::default();
        f(&mut pointer, &mut controls, &camera);
        controls.update(&mut camera);
        camera.eye
    }

    #[test]
    fn hover_without_button_does_nothing() {
        let start = default_camera(1280, 720).eye;
        let eye = eye_after(|p, c, cam| {
            p.on_cursor(10.0, 10.0, c, cam, 720);
            p.on_cursor(200.0, 50.0, c, cam, 720);
        });
        assert!((eye - start).length() < 1e-4);
    }

    #[test]
    fn left_drag_orbits_at_constant_distance() {
        let start = default_camera(1280, 720).eye;
        let eye = eye_after(|p, c, cam| {
            p.on_cursor(10.0, 10.0, c, cam, 720);
            p.on_button(MouseButton::Left, ElementState::Pressed, c);
            p.on_cursor(110.0, 10.0, c, cam, 720);
        });
        assert!((eye - start).length() > 0.1);
        assert!((eye.length() - start.length()).abs() < 1e-3);
    }

    #[test]
    fn release_ends_gesture() {
        let start = default_camera(1280, 720).eye;
        let eye = eye_after(|p, c, cam| {
            p.on_cursor(10.0, 10.0, c, cam, 720);
            p.on_button(MouseButton::Left, ElementState::Pressed, c);
            p.on_button(MouseButton::Left, ElementState::Released, c);
            p.on_cursor(110.0, 10.0, c, cam, 720);
        });
        assert!((eye - start).length() < 1e-4);
    }

    #[test]
    fn wheel_up_zooms_in() {
        let start = default_camera(1280, 720).eye;
        let eye = eye_after(|p, c, _| p.on_wheel(MouseScrollDelta::LineDelta(0.0, 1.0), c));
        assert!(eye.length() < start.length());
    }
}
