pub mod render_loop;
pub mod status;

use std::sync::Arc;

use winit::window::Window;

use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::mesh::loader::check_file_name;
use crate::mesh::{LoadTicket, MeshLoader};
use crate::renderer::{GpuState, MeshBackend, MeshBuffers, Scene, SwapOutcome};

pub use render_loop::{CancellationToken, FrameStatus, RenderLoop};
pub use status::{LoadedFile, ViewerNotice, ViewerStatus, format_file_size};

/// Everything the viewer owns apart from the GPU itself: the scene, the
/// background loader, the frame loop and the status shown to the user.
pub struct ViewerCore<H> {
    pub scene: Scene<H>,
    loader: MeshLoader,
    render_loop: RenderLoop,
    status: ViewerStatus,
    notices: Vec<ViewerNotice>,
}

impl<H> ViewerCore<H> {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        Self {
            scene: Scene::new(config, width, height),
            loader: MeshLoader::new(config.reference_size),
            render_loop: RenderLoop::new(CancellationToken::new()),
            status: ViewerStatus::default(),
            notices: Vec::new(),
        }
    }

    /// Starts loading `bytes` as the mesh called `file_name`. Anything still
    /// in flight is superseded. Returns `None` if the file was rejected
    /// up front.
    pub fn request_load(&mut self, file_name: &str, bytes: Vec<u8>) -> Option<LoadTicket> {
        if !self.render_loop.is_running() {
            return None;
        }
        if let Err(e) = check_file_name(file_name) {
            log::warn!("rejected '{}': {}", file_name, e);
            self.fail(e);
            return None;
        }

        let size = format_file_size(bytes.len() as u64);
        log::info!("loading '{}' ({})", file_name, size);
        let ticket = self.loader.submit(file_name, bytes);

        self.status.loading = Some(file_name.to_string());
        self.notices.push(ViewerNotice::Loading {
            file_name: file_name.to_string(),
            size,
        });
        self.sync_loader_activity();
        Some(ticket)
    }

    /// The host picked a file but could not read it.
    pub fn report_read_failure(&mut self, file_name: &str, reason: impl Into<String>) {
        self.loader.supersede();
        self.status.loading = None;
        let err = ViewerError::Read {
            file_name: file_name.to_string(),
            reason: reason.into(),
        };
        log::warn!("{}", err);
        self.fail(err);
        self.sync_loader_activity();
    }

    /// Applies any finished loads. Results for superseded requests are
    /// dropped here; the scene double-checks before swapping.
    pub fn pump_loads<B>(&mut self, backend: &mut B) -> usize
    where
        B: MeshBackend<Handle = H>,
    {
        let mut swapped = 0;
        while let Some(result) = self.loader.try_recv_result() {
            if !result.ticket.is_current() {
                log::debug!("dropping result for superseded '{}'", result.file_name);
                continue;
            }
            self.status.loading = None;

            let loaded = match result.outcome {
                Ok(loaded) => loaded,
                Err(e) => {
                    log::warn!("failed to load '{}': {}", result.file_name, e);
                    self.fail(e);
                    continue;
                }
            };

            let size = format_file_size(loaded.byte_len as u64);
            match self
                .scene
                .replace_active_mesh(backend, &result.ticket, &result.file_name, loaded.mesh)
            {
                Ok(SwapOutcome::Swapped {
                    triangles,
                    degenerate,
                }) => {
                    swapped += 1;
                    self.status.loaded = Some(LoadedFile {
                        file_name: result.file_name.clone(),
                        size,
                        triangles,
                    });
                    self.status.last_error = None;
                    self.status.warning = None;
                    self.notices.push(ViewerNotice::Loaded {
                        file_name: result.file_name,
                        triangles,
                    });
                    if degenerate {
                        let warning = ViewerError::DegenerateMesh;
                        self.status.warning = Some(warning.to_string());
                        self.notices.push(ViewerNotice::Warning(warning));
                    }
                }
                Ok(SwapOutcome::Stale) => {}
                Err(e) => {
                    log::error!("could not upload '{}': {}", result.file_name, e);
                    self.fail(e);
                }
            }
        }
        self.sync_loader_activity();
        swapped
    }

    /// One iteration of the frame task, minus the drawing: applies finished
    /// loads and advances the orbit controls.
    pub fn tick<B>(&mut self, backend: &mut B) -> FrameStatus
    where
        B: MeshBackend<Handle = H>,
    {
        let Some(frame) = self.render_loop.begin_frame() else {
            return FrameStatus::Stopped;
        };
        log::trace!("frame {}", frame);
        self.pump_loads(backend);
        self.scene.camera.update();
        FrameStatus::Continue
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let applied = self.scene.resize(width, height);
        if applied {
            log::debug!("surface resized to {}x{}", width, height);
        }
        applied
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let (_, height) = self.scene.surface_size();
        self.scene.camera.rotate(dx, dy, height as f32);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.scene.camera.zoom(steps);
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    pub fn drain_notices(&mut self) -> Vec<ViewerNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    /// Stops the frame task and the loader and gives back the active mesh.
    /// Safe to call more than once.
    pub fn shutdown<B>(&mut self, backend: &mut B)
    where
        B: MeshBackend<Handle = H>,
    {
        self.render_loop.cancel();
        self.loader.stop();
        self.scene.clear(backend);
        self.status.loading = None;
        self.status.parsing = None;
        self.status.loader_busy = false;
    }

    fn sync_loader_activity(&mut self) {
        self.status.loader_busy = self.loader.pending();
        self.status.parsing = self.loader.current_job();
    }

    fn fail(&mut self, err: ViewerError) {
        self.status.last_error = Some(err.to_string());
        self.notices.push(ViewerNotice::Failed(err));
    }
}

/// The mounted viewer: a [`ViewerCore`] drawing into a wgpu surface.
pub struct Viewer {
    core: ViewerCore<MeshBuffers>,
    gpu: Option<GpuState>,
}

impl Viewer {
    pub fn mount(window: Arc<Window>, config: ViewerConfig) -> ViewerResult<Self> {
        let size = window.inner_size();
        let core = ViewerCore::new(&config, size.width, size.height);
        let gpu = pollster::block_on(GpuState::new(
            window,
            &config,
            core.scene.lights(),
            core.scene.grid(),
        ))?;
        log::info!("viewer mounted at {}x{}", size.width, size.height);
        Ok(Self {
            core,
            gpu: Some(gpu),
        })
    }

    pub fn gpu(&self) -> Option<&GpuState> {
        self.gpu.as_ref()
    }

    pub fn core(&self) -> &ViewerCore<MeshBuffers> {
        &self.core
    }

    pub fn request_load(&mut self, file_name: &str, bytes: Vec<u8>) -> Option<LoadTicket> {
        self.core.request_load(file_name, bytes)
    }

    pub fn report_read_failure(&mut self, file_name: &str, reason: impl Into<String>) {
        self.core.report_read_failure(file_name, reason);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.core.resize(width, height) {
            if let Some(gpu) = &mut self.gpu {
                gpu.resize(width, height);
            }
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.core.rotate(dx, dy);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.core.zoom(steps);
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        if let Some(gpu) = &mut self.gpu {
            gpu.set_vsync(enabled);
        }
    }

    pub fn status(&self) -> &ViewerStatus {
        self.core.status()
    }

    pub fn drain_notices(&mut self) -> Vec<ViewerNotice> {
        self.core.drain_notices()
    }

    pub fn fps(&self) -> f32 {
        self.core.render_loop().fps()
    }

    /// Runs one iteration of the frame task and draws the scene, then lets
    /// `overlay` paint on top before presenting.
    pub fn frame<F>(&mut self, overlay: F) -> FrameStatus
    where
        F: FnOnce(&GpuState, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let Some(gpu) = self.gpu.as_mut() else {
            return FrameStatus::Stopped;
        };
        if self.core.tick(gpu) == FrameStatus::Stopped {
            return FrameStatus::Stopped;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return FrameStatus::Continue;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return FrameStatus::Continue;
            }
            Err(e) => {
                log::error!("surface failure, tearing down viewer: {}", e);
                self.teardown();
                return FrameStatus::Stopped;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.core.scene.camera);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let active = self.core.scene.active_mesh().map(|a| &a.handle);
        gpu.render_scene(&view, &mut encoder, active);
        overlay(gpu, &mut encoder, &view);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        FrameStatus::Continue
    }

    /// Cancels the frame task, stops the loader, releases the active mesh
    /// and drops the surface. The window can be closed afterwards.
    pub fn teardown(&mut self) {
        let Some(mut gpu) = self.gpu.take() else {
            return;
        };
        self.core.shutdown(&mut gpu);
        let _ = gpu.device.poll(wgpu::Maintain::Wait);
        drop(gpu);
        log::info!("viewer torn down");
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.teardown();
    }
}
