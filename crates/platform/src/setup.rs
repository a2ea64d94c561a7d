//! Fixed scene configuration: camera, lights and where loaded assets go.

use std::f32::consts::{FRAC_PI_2, PI};

use asset::MaterialData;
use corelib::camera::Camera;
use corelib::light::{AmbientLight, DirectionalLight, Light, SpotLight};
use corelib::orbit::{OrbitControls, OrbitSettings};
use corelib::transform::Transform;
use corelib::{Vec3, vec3};

/// Model rotation applied every frame once the model is in the scene (radians).
pub const MODEL_SPIN_PER_FRAME: f32 = -0.001;

pub fn default_camera(width: u32, height: u32) -> Camera {
    let mut camera = Camera::new_perspective(
        vec3(4.0, 0.8, 4.0),
        Vec3::ZERO,
        Vec3::Y,
        45f32.to_radians(),
        0.1,
        1000.0,
        1.0,
    );
    camera.set_viewport(width, height);
    camera
}

pub fn default_controls() -> OrbitControls {
    OrbitControls::new(Vec3::ZERO, OrbitSettings::default())
}

pub fn scene_lights() -> Vec<Light> {
    vec![
        Light::Ambient(AmbientLight {
            color: Vec3::ONE,
            intensity: 0.1,
        }),
        Light::Spot(SpotLight {
            color: Vec3::ONE,
            intensity: 90.0,
            position: vec3(0.0, 6.0, 5.0),
            target: Vec3::ZERO,
            distance: 10.0,
            angle: PI / 8.0,
            penumbra: 0.01,
            decay: 0.5,
        }),
        Light::Directional(DirectionalLight {
            color: Vec3::ONE,
            intensity: 7.0,
            position: vec3(0.0, 3.0, 5.0),
            target: Vec3::ZERO,
        }),
    ]
}

/// Placement of the model root and the generated ground disc.
#[derive(Clone, Debug)]
pub struct SceneLayout {
    pub model_transform: Transform,
    pub ground_transform: Transform,
    pub ground_radius: f32,
    pub ground_segments: u32,
    pub ground_material: MaterialData,
}

impl Default for SceneLayout {
    fn default() -> Self {
        let floor = vec3(0.0, -0.5, 0.0);
        Self {
            model_transform: Transform::from_translation(floor),
            ground_transform: Transform::from_translation(floor)
                .with_rotation_euler(vec3(-FRAC_PI_2, 0.0, 0.0)),
            ground_radius: 5.0,
            ground_segments: 50,
            ground_material: MaterialData::physical("ground", [128.0 / 255.0; 3], 0.8, 1.0)
                .with_double_sided(true),
        }
    }
}
