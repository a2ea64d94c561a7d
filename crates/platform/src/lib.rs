//! Platform layer: windowing, event loop and the glue between the asset
//! loader, the scene and the renderer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use asset::RadianceSettings;
use corelib::camera::Camera;
use corelib::orbit::OrbitControls;
use corelib::scene::Scene;
use renderer::{GpuState, RenderSettings};

pub mod frame;
pub mod input;
pub mod pipeline;
pub mod setup;
pub mod viewport;

use frame::{FpsCounter, FrameLoop};
use input::PointerState;
use pipeline::{AssetPaths, LoadEvent, LoadPipeline};
use setup::SceneLayout;

/// Everything the viewer takes from the command line.
#[derive(Clone, Debug)]
pub struct ViewerOptions {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    pub environment: PathBuf,
    pub model: PathBuf,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            width: 1280,
            height: 720,
            environment: PathBuf::from("bg2.hdr"),
            model: PathBuf::from("2022/scene.gltf"),
        }
    }
}

struct App {
    options: ViewerOptions,
    proxy: EventLoopProxy<LoadEvent>,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    scene: Scene,
    camera: Camera,
    controls: OrbitControls,
    pointer: PointerState,
    loads: LoadPipeline,
    frame: FrameLoop,
    fps: Option<FpsCounter>,

    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(options: ViewerOptions, proxy: EventLoopProxy<LoadEvent>) -> Self {
        let mut scene = Scene::new();
        for light in setup::scene_lights() {
            scene.add_light(light);
        }
        let fps = options
            .show_fps
            .then(|| FpsCounter::new(Duration::from_secs(1)));

        Self {
            camera: setup::default_camera(options.width, options.height),
            options,
            proxy,
            window: None,
            gpu: None,
            scene,
            controls: setup::default_controls(),
            pointer: PointerState::default(),
            loads: LoadPipeline::new(SceneLayout::default()),
            frame: FrameLoop::new(setup::MODEL_SPIN_PER_FRAME),
            fps,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Showcase3D")
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.options.backends,
            RenderSettings::default(),
        ))?;
        self.camera.set_viewport(size.width, size.height);

        let paths = AssetPaths {
            environment: self.options.environment.clone(),
            model: self.options.model.clone(),
        };
        // The worker reports through the proxy; its handle is not needed.
        pipeline::spawn_loader(paths, RadianceSettings::default(), self.proxy.clone())?;

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(gpu)) = (self.window.as_ref(), self.gpu.as_mut()) else {
            return;
        };

        if let Err(e) = self.frame.tick(
            self.loads.state(),
            &mut self.scene,
            &mut self.controls,
            &mut self.camera,
        ) {
            log::warn!("Frame update failed: {}", e);
        }

        match gpu.render(&self.camera, &self.scene) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated ({:?}); reconfiguring", e);
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory. Exiting event loop.");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("Frame skipped: {:?}", e),
        }

        if let Some(rate) = self.fps.as_mut().and_then(|f| f.frame(Instant::now())) {
            log::info!("FPS: {:.1} (frame {})", rate, self.frame.frames());
        }

        window.request_redraw();
    }
}

impl ApplicationHandler<LoadEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: LoadEvent) {
        let Some(gpu) = self.gpu.as_mut() else {
            log::warn!("Load event arrived before GPU init; dropped");
            return;
        };
        if let Err(e) = self.loads.apply(event, &mut self.scene, gpu) {
            log::error!("{}", e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    viewport::apply_resize(&mut self.camera, gpu, new_size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // A Resized event with the new physical size follows.
                log::info!("Scale factor changed: {:.3}", scale_factor);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.pointer.on_button(button, state, &mut self.controls);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let height = self.gpu.as_ref().map_or(self.options.height, |g| g.size().1);
                self.pointer.on_cursor(
                    position.x,
                    position.y,
                    &mut self.controls,
                    &self.camera,
                    height,
                );
            }
            WindowEvent::CursorLeft { .. } => self.pointer.on_cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                self.pointer.on_wheel(delta, &mut self.controls);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open the viewer window and run until it is closed.
pub fn run_viewer(options: ViewerOptions) -> Result<()> {
    let event_loop = EventLoop::<LoadEvent>::with_user_event()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create event loop: {e:?}"))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(options, event_loop.create_proxy());
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
