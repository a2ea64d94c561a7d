//! Surface description shared by loaded models and procedural meshes.

use crate::texture::TextureData;

#[derive(Clone, Debug)]
pub struct MaterialData {
    pub name: String,
    /// Linear RGBA multiplier.
    pub base_color: [f32; 4],
    pub base_color_texture: Option<TextureData>,
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic: 1.0,
            roughness: 1.0,
            double_sided: false,
        }
    }
}

impl MaterialData {
    /// Untextured physical material (sRGB color converted to linear).
    pub fn physical(name: &str, srgb: [f32; 3], metallic: f32, roughness: f32) -> Self {
        let [r, g, b] = srgb.map(srgb_to_linear);
        Self {
            name: name.to_owned(),
            base_color: [r, g, b, 1.0],
            metallic,
            roughness,
            ..Self::default()
        }
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
