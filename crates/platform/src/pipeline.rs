//! Asset loading pipeline: a worker thread loads the environment, then the
//! model, and posts each result to the event loop, which owns the scene and
//! applies them through [`LoadPipeline`].

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use asset::{
    HdrTexture, MaterialData, MeshData, ModelData, RadianceMap, RadianceProcessor,
    RadianceSettings,
};
use corelib::scene::{MeshId, MeshPart, Scene};
use corelib::{CoreError, CoreResult};
use winit::event_loop::EventLoopProxy;

use crate::setup::SceneLayout;

/// One-shot completion of a loader stage.
#[derive(Debug)]
pub enum LoadEvent {
    Environment(Result<RadianceMap>),
    Model(Result<ModelData>),
}

impl LoadEvent {
    fn name(&self) -> &'static str {
        match self {
            LoadEvent::Environment(Ok(_)) => "environment loaded",
            LoadEvent::Environment(Err(_)) => "environment failed",
            LoadEvent::Model(Ok(_)) => "model loaded",
            LoadEvent::Model(Err(_)) => "model failed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    EnvironmentLoaded,
    ModelLoaded,
    Failed,
}

impl LoadState {
    fn name(self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::EnvironmentLoaded => "environment loaded",
            LoadState::ModelLoaded => "model loaded",
            LoadState::Failed => "failed",
        }
    }
}

/// Where loader results are delivered. Returns `false` once nobody listens.
pub trait LoadSink: Send + 'static {
    fn deliver(&self, event: LoadEvent) -> bool;
}

impl LoadSink for EventLoopProxy<LoadEvent> {
    fn deliver(&self, event: LoadEvent) -> bool {
        self.send_event(event).is_ok()
    }
}

impl LoadSink for Sender<LoadEvent> {
    fn deliver(&self, event: LoadEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Turns CPU meshes into ids the scene can reference.
pub trait MeshUploader {
    fn upload_mesh(&mut self, mesh: &MeshData, material: &MaterialData) -> MeshId;
}

impl MeshUploader for renderer::GpuState {
    fn upload_mesh(&mut self, mesh: &MeshData, material: &MaterialData) -> MeshId {
        renderer::GpuState::upload_mesh(self, mesh, material)
    }
}

#[derive(Clone, Debug)]
pub struct AssetPaths {
    pub environment: PathBuf,
    pub model: PathBuf,
}

/// Load and pre-filter the environment. The raw texture and the processor
/// are both consumed here and dropped once the radiance map exists.
pub fn load_environment(path: &Path, settings: RadianceSettings) -> Result<RadianceMap> {
    let texture = HdrTexture::load(path)?;
    let mut processor = RadianceProcessor::new(settings);
    processor.compile();
    processor
        .from_equirectangular(texture)
        .with_context(|| format!("Failed to pre-filter {}", path.display()))
}

/// Run both stages in order on the current thread. The model is only
/// requested after the environment stage succeeded.
pub fn run_loader(paths: &AssetPaths, settings: RadianceSettings, sink: &impl LoadSink) {
    let environment = load_environment(&paths.environment, settings);
    let proceed = environment.is_ok();
    if !sink.deliver(LoadEvent::Environment(environment)) || !proceed {
        return;
    }
    let model = asset::load_gltf(&paths.model);
    sink.deliver(LoadEvent::Model(model));
}

pub fn spawn_loader(
    paths: AssetPaths,
    settings: RadianceSettings,
    sink: impl LoadSink,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("asset-loader".into())
        .spawn(move || run_loader(&paths, settings, &sink))
}

pub type ErrorCallback = Box<dyn FnMut(&anyhow::Error)>;

/// Load state machine: `Idle -> EnvironmentLoaded -> ModelLoaded`, with
/// `Failed` reachable from either of the first two.
pub struct LoadPipeline {
    state: LoadState,
    layout: SceneLayout,
    environment: Option<RadianceMap>,
    on_error: ErrorCallback,
}

impl LoadPipeline {
    pub fn new(layout: SceneLayout) -> Self {
        Self::with_error_callback(
            layout,
            Box::new(|e| log::error!("Asset load failed: {:#}", e)),
        )
    }

    pub fn with_error_callback(layout: SceneLayout, on_error: ErrorCallback) -> Self {
        Self {
            state: LoadState::Idle,
            layout,
            environment: None,
            on_error,
        }
    }

    #[inline]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Pre-filtered environment, kept but not bound as background or lighting.
    pub fn environment(&self) -> Option<&RadianceMap> {
        self.environment.as_ref()
    }

    pub fn apply(
        &mut self,
        event: LoadEvent,
        scene: &mut Scene,
        uploader: &mut dyn MeshUploader,
    ) -> CoreResult<()> {
        match (self.state, event) {
            (LoadState::Idle, LoadEvent::Environment(Ok(map))) => {
                log::info!("Environment ready ({} radiance levels)", map.level_count());
                self.environment = Some(map);
                self.state = LoadState::EnvironmentLoaded;
            }
            (LoadState::EnvironmentLoaded, LoadEvent::Model(Ok(model))) => {
                self.attach_model(&model, scene, uploader)?;
                self.state = LoadState::ModelLoaded;
            }
            (LoadState::Idle, LoadEvent::Environment(Err(e)))
            | (LoadState::EnvironmentLoaded, LoadEvent::Model(Err(e))) => {
                self.state = LoadState::Failed;
                (self.on_error)(&e);
            }
            (state, event) => {
                return Err(CoreError::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                });
            }
        }
        Ok(())
    }

    fn attach_model(
        &self,
        model: &ModelData,
        scene: &mut Scene,
        uploader: &mut dyn MeshUploader,
    ) -> CoreResult<()> {
        let parts = model
            .parts
            .iter()
            .map(|p| MeshPart {
                mesh: uploader.upload_mesh(&p.mesh, &p.material),
                local: p.local,
            })
            .collect();
        scene.add_model(self.layout.model_transform, parts)?;

        let disc = MeshData::circle(self.layout.ground_radius, self.layout.ground_segments);
        let ground = uploader.upload_mesh(&disc, &self.layout.ground_material);
        scene.add_ground_plane(self.layout.ground_transform, ground)?;

        log::info!(
            "Model attached: {} parts, {} triangles",
            model.parts.len(),
            model.triangle_count()
        );
        Ok(())
    }
}
