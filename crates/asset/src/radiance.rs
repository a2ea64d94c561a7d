//! Pre-filtered radiance maps: an equirectangular environment reduced to a
//! chain of progressively smaller and blurrier levels, one per roughness step.

use anyhow::{Result, bail};
use glam::Vec3;

use crate::hdr::HdrTexture;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadianceSettings {
    /// Width of level 0; the source is never upscaled.
    pub base_width: u32,
    /// Requested number of levels (capped by the level-0 size).
    pub levels: u32,
}

impl Default for RadianceSettings {
    fn default() -> Self {
        Self {
            base_width: 256,
            levels: 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadianceLevel {
    pub width: u32,
    pub height: u32,
    pub roughness: f32,
    pub texels: Vec<Vec3>,
}

impl RadianceLevel {
    pub fn mean(&self) -> Vec3 {
        let sum = self.texels.iter().copied().fold(Vec3::ZERO, |a, b| a + b);
        sum / self.texels.len().max(1) as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadianceMap {
    levels: Vec<RadianceLevel>,
}

impl RadianceMap {
    pub fn levels(&self) -> &[RadianceLevel] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Turns equirectangular textures into [`RadianceMap`]s. Single-use: both the
/// processor and the source texture are consumed by
/// [`RadianceProcessor::from_equirectangular`].
#[derive(Debug)]
pub struct RadianceProcessor {
    settings: RadianceSettings,
    kernels: Vec<Vec<f32>>,
}

impl RadianceProcessor {
    pub fn new(settings: RadianceSettings) -> Self {
        Self {
            settings,
            kernels: Vec::new(),
        }
    }

    pub fn is_compiled(&self) -> bool {
        !self.kernels.is_empty()
    }

    /// Precompute the blur kernels. Called lazily if skipped; calling it up
    /// front moves the cost out of the first conversion.
    pub fn compile(&mut self) {
        if self.is_compiled() {
            return;
        }
        self.kernels = (0..self.settings.levels.max(1))
            .map(gaussian_kernel)
            .collect();
        log::debug!("Radiance processor compiled {} kernels", self.kernels.len());
    }

    pub fn from_equirectangular(mut self, source: HdrTexture) -> Result<RadianceMap> {
        if self.settings.base_width == 0 {
            bail!("Radiance base width must be positive");
        }
        self.compile();

        let w0 = self.settings.base_width.min(source.width);
        let h0 = ((source.height as u64 * w0 as u64) / source.width as u64).max(1) as u32;
        let max_levels = w0.min(h0).ilog2() + 1;
        let count = self.settings.levels.clamp(1, max_levels) as usize;

        let mut levels = Vec::with_capacity(count);
        let mut current = downsample(&source.texels, source.width, source.height, w0, h0);
        let (mut w, mut h) = (w0, h0);

        for i in 0..count {
            if i > 0 {
                let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
                current = downsample(&current, w, h, nw, nh);
                (w, h) = (nw, nh);
                current = blur(&current, w, h, &self.kernels[i]);
            }
            let roughness = if count > 1 {
                i as f32 / (count - 1) as f32
            } else {
                0.0
            };
            levels.push(RadianceLevel {
                width: w,
                height: h,
                roughness,
                texels: current.clone(),
            });
        }

        log::info!(
            "Pre-filtered environment {}x{} into {} radiance levels (mean {:.3})",
            source.width,
            source.height,
            levels.len(),
            levels[0].mean()
        );
        Ok(RadianceMap { levels })
    }
}

/// Normalized Gaussian with radius equal to the level index.
fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let r = radius as i32;
    let sigma = radius as f32 * 0.5 + 0.5;
    let mut weights: Vec<f32> = (-r..=r)
        .map(|k| (-(k * k) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= total);
    weights
}

/// Box-filter `src` (sw x sh) down to dw x dh.
fn downsample(src: &[Vec3], sw: u32, sh: u32, dw: u32, dh: u32) -> Vec<Vec3> {
    let (sw, sh, dw, dh) = (sw as u64, sh as u64, dw as u64, dh as u64);
    let mut out = Vec::with_capacity((dw * dh) as usize);
    for y in 0..dh {
        let y0 = y * sh / dh;
        let y1 = ((y + 1) * sh / dh).max(y0 + 1);
        for x in 0..dw {
            let x0 = x * sw / dw;
            let x1 = ((x + 1) * sw / dw).max(x0 + 1);
            let mut acc = Vec3::ZERO;
            for sy in y0..y1 {
                let row = (sy * sw) as usize;
                for sx in x0..x1 {
                    acc += src[row + sx as usize];
                }
            }
            out.push(acc / ((x1 - x0) * (y1 - y0)) as f32);
        }
    }
    out
}

/// Separable blur: horizontal wraps around (longitude), vertical clamps at the poles.
fn blur(src: &[Vec3], w: u32, h: u32, kernel: &[f32]) -> Vec<Vec3> {
    if kernel.len() <= 1 {
        return src.to_vec();
    }
    let r = (kernel.len() / 2) as i64;
    let (wi, hi) = (w as i64, h as i64);

    let mut tmp = vec![Vec3::ZERO; src.len()];
    for y in 0..hi {
        for x in 0..wi {
            let mut acc = Vec3::ZERO;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x + k as i64 - r).rem_euclid(wi);
                acc += src[(y * wi + sx) as usize] * *weight;
            }
            tmp[(y * wi + x) as usize] = acc;
        }
    }

    let mut out = vec![Vec3::ZERO; src.len()];
    for y in 0..hi {
        for x in 0..wi {
            let mut acc = Vec3::ZERO;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y + k as i64 - r).clamp(0, hi - 1);
                acc += tmp[(sy * wi + x) as usize] * *weight;
            }
            out[(y * wi + x) as usize] = acc;
        }
    }
    out
}
