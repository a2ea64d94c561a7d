//! Radiance HDR (.hdr) equirectangular environment maps, decoded to linear RGB.

use std::path::Path;

use anyhow::{Context, Result, bail};
use glam::Vec3;

/// Linear-light RGB image laid out row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct HdrTexture {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Vec3>,
}

impl HdrTexture {
    pub fn new(width: u32, height: u32, texels: Vec<Vec3>) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("HDR texture has zero extent ({}x{})", width, height);
        }
        if texels.len() != width as usize * height as usize {
            bail!(
                "HDR texture {}x{} needs {} texels, got {}",
                width,
                height,
                width as usize * height as usize,
                texels.len()
            );
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Constant-color map, mostly useful as a fallback and in tests.
    pub fn solid(width: u32, height: u32, color: Vec3) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            texels: vec![color; width.max(1) as usize * height.max(1) as usize],
        }
    }

    /// Load and decode a Radiance HDR file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading environment map from {:?}", path);

        let img = image::ImageReader::open(path)
            .with_context(|| format!("Failed to open HDR file: {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to read HDR header: {}", path.display()))?
            .decode()
            .with_context(|| format!("Failed to decode HDR image: {}", path.display()))?;

        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let texels = rgb.pixels().map(|p| Vec3::from(p.0)).collect();

        log::info!("Loaded environment map {}x{}", width, height);
        Self::new(width, height, texels)
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Vec3 {
        self.texels[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Flat (non-RLE) Radiance file; widths below 8 are never run-length encoded.
    fn write_flat_hdr(pixels: &[[u8; 4]], width: usize, height: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".hdr").tempfile().unwrap();
        write!(
            file,
            "#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y {} +X {}\n",
            height, width
        )
        .unwrap();
        for p in pixels {
            file.write_all(p).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn decodes_rgbe_to_linear() {
        // RGBE (128,128,128,129) is 1.0; (128,64,0,130) is (2.0, 1.0, 0.0).
        let px = [[128, 128, 128, 129], [128, 64, 0, 130], [0, 0, 0, 0], [128, 128, 128, 129]];
        let file = write_flat_hdr(&px, 2, 2);

        let tex = HdrTexture::load(file.path()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 2));
        assert!((tex.texel(0, 0) - Vec3::ONE).length() < 1e-2);
        assert!((tex.texel(1, 0) - Vec3::new(2.0, 1.0, 0.0)).length() < 2e-2);
        assert_eq!(tex.texel(0, 1), Vec3::ZERO);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = HdrTexture::load("/nonexistent/env.hdr").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open HDR file"));
    }

    #[test]
    fn texel_count_must_match_extent() {
        assert!(HdrTexture::new(2, 2, vec![Vec3::ZERO; 3]).is_err());
        assert!(HdrTexture::new(0, 2, Vec::new()).is_err());
    }
}
