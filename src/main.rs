use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::Context as _;
use crossbeam::channel::{self, Receiver, TryRecvError};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use objview::ui::{UiActions, UiState, apply_theme, draw_drop_hint, draw_help_overlay, draw_side_panel};
use objview::{FrameStatus, Viewer, ViewerConfig};

#[derive(Default)]
struct PointerState {
    rotating: bool,
    last_position: Option<PhysicalPosition<f64>>,
}

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    ui_state: UiState,
    pointer: PointerState,
    picker: Option<Receiver<Option<PathBuf>>>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        let ui_state = UiState::new(config.vsync);
        Self {
            config,
            window: None,
            viewer: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),
            ui_state,
            pointer: PointerState::default(),
            picker: None,
        }
    }

    fn init_viewer(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let viewer = Viewer::mount(window.clone(), self.config.clone())
            .context("failed to mount the viewer")?;
        let gpu = viewer
            .gpu()
            .context("viewer mounted without a GPU surface")?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.window = Some(window);
        self.viewer = Some(viewer);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn open_path(&mut self, path: &Path) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read(path) {
            Ok(bytes) => {
                viewer.request_load(&file_name, bytes);
            }
            Err(e) => viewer.report_read_failure(&file_name, e.to_string()),
        }
    }

    /// Opens the native picker without blocking the frame loop. The dialog
    /// future is created here, on the event-loop thread, and awaited on a
    /// helper thread.
    fn pick_file(&mut self) {
        if self.picker.is_some() {
            return;
        }

        let pick = rfd::AsyncFileDialog::new()
            .add_filter("Wavefront OBJ", &["obj"])
            .pick_file();
        let (tx, rx) = channel::bounded(1);
        let spawned = thread::Builder::new()
            .name("file-picker".into())
            .spawn(move || {
                let path = pollster::block_on(pick).map(|handle| handle.path().to_path_buf());
                let _ = tx.send(path);
            });

        match spawned {
            Ok(_) => {
                self.picker = Some(rx);
                self.ui_state.picker_open = true;
            }
            Err(e) => log::error!("failed to open file picker: {}", e),
        }
    }

    fn poll_picker(&mut self) {
        let Some(rx) = &self.picker else {
            return;
        };
        let picked = match rx.try_recv() {
            Ok(picked) => picked,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => None,
        };

        self.picker = None;
        self.ui_state.picker_open = false;
        if let Some(path) = picked {
            self.open_path(&path);
        }
    }

    fn redraw(&mut self) -> FrameStatus {
        self.poll_picker();

        let (Some(window), Some(egui_state), Some(viewer)) =
            (&self.window, &mut self.egui_state, &mut self.viewer)
        else {
            return FrameStatus::Stopped;
        };

        for notice in viewer.drain_notices() {
            self.ui_state.push_notice(&notice);
        }
        self.ui_state.expire_messages(Instant::now());

        let raw_input = egui_state.take_egui_input(window);
        let status = viewer.status().clone();
        let fps = viewer.fps();
        let distance = viewer.core().scene.camera.distance();
        let show_hint = status.loaded.is_none() && !status.is_loading();

        let ui_state = &mut self.ui_state;
        let mut actions = UiActions::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            actions = draw_side_panel(ctx, ui_state, &status, fps);
            if ui_state.show_help {
                draw_help_overlay(ctx, distance);
            }
            if show_hint {
                draw_drop_hint(ctx);
            }
        });
        egui_state.handle_platform_output(window, full_output.platform_output);

        if actions.vsync_changed {
            viewer.set_vsync(self.ui_state.vsync_enabled);
        }

        let Some(egui_renderer) = &mut self.egui_renderer else {
            return FrameStatus::Stopped;
        };
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let textures_delta = full_output.textures_delta;
        let pixels_per_point = full_output.pixels_per_point;

        let status = viewer.frame(|gpu, encoder, view| {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [gpu.config.width, gpu.config.height],
                pixels_per_point,
            };

            for (id, delta) in &textures_delta.set {
                egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, delta);
            }
            egui_renderer.update_buffers(
                &gpu.device,
                &gpu.queue,
                encoder,
                &paint_jobs,
                &screen_descriptor,
            );

            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        });

        for id in &textures_delta.free {
            egui_renderer.free_texture(id);
        }

        if actions.open_file {
            self.pick_file();
        }
        status
    }

    fn shutdown(&mut self) {
        if let Some(mut viewer) = self.viewer.take() {
            viewer.teardown();
        }
        self.egui_renderer = None;
        self.egui_state = None;
        self.window = None;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("OBJ Viewer")
            .with_inner_size(PhysicalSize::new(1280, 800));

        let result = event_loop
            .create_window(window_attrs)
            .context("failed to create window")
            .and_then(|window| self.init_viewer(Arc::new(window)));

        if let Err(e) = result {
            log::error!("{:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size.width, size.height);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.pointer.rotating = state == ElementState::Pressed;
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last), Some(viewer)) = (
                    self.pointer.rotating,
                    self.pointer.last_position,
                    &mut self.viewer,
                ) {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    viewer.rotate(dx, dy);
                }
                self.pointer.last_position = Some(position);
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer.rotating = false;
                self.pointer.last_position = None;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                if let Some(viewer) = &mut self.viewer {
                    viewer.zoom(steps);
                }
            }

            WindowEvent::DroppedFile(path) => {
                self.open_path(&path);
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == FrameStatus::Continue {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                } else {
                    log::info!("render loop stopped");
                    self.shutdown();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(ViewerConfig::default());
    event_loop.run_app(&mut app)?;
    Ok(())
}
