//! Punctual and ambient light descriptions (linear RGB, renderer-agnostic).

use crate::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Light arriving along `position -> target`, with no falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Unit vector the light travels along.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }
}

/// Cone light. `distance == 0` means unlimited range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub distance: f32,
    /// Half-angle of the cone, radians.
    pub angle: f32,
    /// Fraction of the cone attenuated by the soft edge, 0..=1.
    pub penumbra: f32,
    pub decay: f32,
}

impl SpotLight {
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }

    /// Cosine of the outer cone edge.
    pub fn cone_cos(&self) -> f32 {
        self.angle.cos()
    }

    /// Cosine where the penumbra starts (fully lit inside).
    pub fn penumbra_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Spot(SpotLight),
}
