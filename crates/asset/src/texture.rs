//! Texture data handed to the renderer: tightly packed 8-bit sRGB RGBA.

use anyhow::{Result, bail};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Texture has zero extent ({}x{})", width, height);
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            bail!(
                "RGBA8 texture {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            );
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Expand tightly packed RGB8 pixels to RGBA8 with opaque alpha.
    pub fn from_rgb8(width: u32, height: u32, rgb: &[u8]) -> Result<Self> {
        let data = rgb
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect();
        Self::new_rgba8(width, height, data)
    }

    /// Expand 8-bit luminance to gray RGBA8 with opaque alpha.
    pub fn from_r8(width: u32, height: u32, luma: &[u8]) -> Result<Self> {
        let data = luma.iter().flat_map(|&l| [l, l, l, 255]).collect();
        Self::new_rgba8(width, height, data)
    }

    /// 1x1 opaque white, bound where a material has no texture.
    pub fn white() -> Self {
        Self {
            data: vec![255; 4],
            width: 1,
            height: 1,
        }
    }
}
