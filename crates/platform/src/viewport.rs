//! Keeps camera aspect and render-target size in step with the window.

use corelib::camera::Camera;
use winit::dpi::PhysicalSize;

/// Anything that owns a resizable drawing surface.
pub trait RenderTarget {
    fn resize(&mut self, width: u32, height: u32);
}

impl RenderTarget for renderer::GpuState {
    fn resize(&mut self, width: u32, height: u32) {
        renderer::GpuState::resize(self, width, height);
    }
}

/// Apply one resize event. Zero extents (minimized windows) are clamped to 1.
pub fn apply_resize(camera: &mut Camera, target: &mut impl RenderTarget, size: PhysicalSize<u32>) {
    let (width, height) = (size.width.max(1), size.height.max(1));
    camera.set_viewport(width, height);
    target.resize(width, height);
    log::debug!("Viewport resized to {}x{}", width, height);
}
