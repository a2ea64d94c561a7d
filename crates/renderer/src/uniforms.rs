//! GPU-side uniform layouts and their packing from scene state.

use bytemuck::{Pod, Zeroable};
use corelib::camera::Camera;
use corelib::light::Light;
use corelib::scene::Scene;
use glam::{Mat4, Vec3, Vec4};

/// Output-stage settings: clear color, fog and tone mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub clear_color: wgpu::Color,
    /// Linear RGB.
    pub fog_color: Vec3,
    /// Exponential-squared fog density; 0 disables fog.
    pub fog_density: f32,
    /// ACES filmic exposure.
    pub exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::WHITE,
            fog_color: Vec3::ONE,
            fog_density: 0.02,
            exposure: 0.8,
        }
    }
}

/// Per-frame UBO (16-byte aligned). One directional and one spot light are
/// supported; ambient lights are summed.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub dir_color: [f32; 4],
    pub dir_direction: [f32; 4],
    pub spot_color: [f32; 4],
    /// xyz position, w cutoff distance.
    pub spot_position: [f32; 4],
    /// xyz direction, w decay exponent.
    pub spot_direction: [f32; 4],
    /// x cone cos, y penumbra cos.
    pub spot_cone: [f32; 4],
    /// rgb fog color, a density.
    pub fog: [f32; 4],
    /// x exposure.
    pub params: [f32; 4],
}

impl FrameUniform {
    pub fn new(camera: &Camera, scene: &Scene, settings: &RenderSettings) -> Self {
        let mut u = Self::zeroed();
        u.view_proj = camera.proj_view().to_cols_array_2d();
        u.camera_pos = camera.eye.extend(1.0).to_array();
        u.fog = settings.fog_color.extend(settings.fog_density).to_array();
        u.params = [settings.exposure, 0.0, 0.0, 0.0];

        let mut ambient = Vec3::ZERO;
        let (mut has_dir, mut has_spot) = (false, false);
        for light in scene.lights() {
            match light {
                Light::Ambient(a) => ambient += a.color * a.intensity,
                Light::Directional(d) if !has_dir => {
                    has_dir = true;
                    u.dir_color = (d.color * d.intensity).extend(1.0).to_array();
                    u.dir_direction = d.direction().extend(0.0).to_array();
                }
                Light::Spot(s) if !has_spot => {
                    has_spot = true;
                    u.spot_color = (s.color * s.intensity).extend(1.0).to_array();
                    u.spot_position = s.position.extend(s.distance).to_array();
                    u.spot_direction = s.direction().extend(s.decay).to_array();
                    u.spot_cone = [s.cone_cos(), s.penumbra_cos(), 0.0, 0.0];
                }
                other => log::trace!("Extra light not uploaded: {:?}", other),
            }
        }
        u.ambient = ambient.extend(1.0).to_array();
        u
    }
}

/// Per-draw UBO: transforms and material factors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// x metallic, y roughness.
    pub material: [f32; 4],
}

impl ObjectUniform {
    pub fn new(world: Mat4, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal: world.inverse().transpose().to_cols_array_2d(),
            base_color,
            material: Vec4::new(metallic, roughness, 0.0, 0.0).to_array(),
        }
    }
}
