//! Per-frame update: one task advances the orbit controls and, once the model
//! is in the scene, its rotation. The caller then draws exactly once.

use std::time::{Duration, Instant};

use corelib::CoreResult;
use corelib::camera::Camera;
use corelib::orbit::OrbitControls;
use corelib::scene::Scene;

use crate::pipeline::LoadState;

pub struct FrameLoop {
    model_spin: f32,
    frames: u64,
}

impl FrameLoop {
    /// `model_spin` is added to the model's Y rotation every frame.
    pub fn new(model_spin: f32) -> Self {
        Self {
            model_spin,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick(
        &mut self,
        state: LoadState,
        scene: &mut Scene,
        controls: &mut OrbitControls,
        camera: &mut Camera,
    ) -> CoreResult<()> {
        self.frames += 1;
        controls.update(camera);

        if state == LoadState::ModelLoaded {
            if let Some(model) = scene.model() {
                scene.transform_mut(model)?.rotation_euler.y += self.model_spin;
            }
        }
        Ok(())
    }
}

/// Logs frames per second roughly once per `period`.
pub struct FpsCounter {
    period: Duration,
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            window_start: Instant::now(),
            frames: 0,
        }
    }

    /// Count a frame; returns the rate when a period has elapsed.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.period {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{MODEL_SPIN_PER_FRAME, SceneLayout, default_camera, default_controls};
    use corelib::scene::MeshId;

    fn scene_with_model() -> Scene {
        let mut scene = Scene::new();
        let layout = SceneLayout::default();
        scene.add_model(layout.model_transform, Vec::new()).unwrap();
        scene
            .add_ground_plane(layout.ground_transform, MeshId(0))
            .unwrap();
        scene
    }

    fn model_yaw(scene: &Scene) -> f32 {
        scene
            .transform(scene.model().unwrap())
            .unwrap()
            .rotation_euler
            .y
    }

    #[test]
    fn rotation_waits_for_model_load() {
        let mut scene = scene_with_model();
        let mut camera = default_camera(1280, 720);
        let mut controls = default_controls();
        let mut frame = FrameLoop::new(MODEL_SPIN_PER_FRAME);

        for state in [LoadState::Idle, LoadState::EnvironmentLoaded, LoadState::Failed] {
            frame
                .tick(state, &mut scene, &mut controls, &mut camera)
                .unwrap();
        }
        assert_eq!(model_yaw(&scene), 0.0);
        assert_eq!(frame.frames(), 3);
    }

    #[test]
    fn rotation_decreases_by_fixed_step_per_frame() {
        let mut scene = scene_with_model();
        let mut camera = default_camera(1280, 720);
        let mut controls = default_controls();
        let mut frame = FrameLoop::new(MODEL_SPIN_PER_FRAME);

        let mut previous = model_yaw(&scene);
        for n in 1..=100 {
            frame
                .tick(LoadState::ModelLoaded, &mut scene, &mut controls, &mut camera)
                .unwrap();
            let yaw = model_yaw(&scene);
            assert!(yaw < previous);
            assert!((yaw - n as f32 * MODEL_SPIN_PER_FRAME).abs() < 1e-5);
            previous = yaw;
        }

        let ground = scene.ground_plane().unwrap();
        assert_eq!(scene.transform(ground).unwrap().rotation_euler.y, 0.0);
    }

    #[test]
    fn loaded_state_without_model_is_harmless() {
        let mut scene = Scene::new();
        let mut camera = default_camera(1280, 720);
        let mut controls = default_controls();
        let mut frame = FrameLoop::new(MODEL_SPIN_PER_FRAME);
        frame
            .tick(LoadState::ModelLoaded, &mut scene, &mut controls, &mut camera)
            .unwrap();
    }

    #[test]
    fn fps_reports_once_per_period() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(Duration::from_secs(1));
        fps.window_start = start;
        for i in 1..60 {
            assert!(fps.frame(start + Duration::from_millis(i * 16)).is_none());
        }
        let rate = fps.frame(start + Duration::from_secs(1)).unwrap();
        assert!((rate - 60.0).abs() < 1e-3);
        assert!(fps.frame(start + Duration::from_millis(1016)).is_none());
    }
}
