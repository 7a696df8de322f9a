//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's `ApplicationHandler`: the window and GPU
//! context come up on `resumed`, and every redraw runs fixed-rate engine
//! updates followed by a draw of the current grid level.

use std::sync::Arc;

use icogrid_config::Config;
use icogrid_grid::{LevelState, RefineEngine, RefineMode, RefineOutcome};
use icogrid_input::{KeyboardState, ViewerAction};
use icogrid_render::{
    BufferAllocator, CameraUniform, DepthTexture, LightUniform, LineVertex, MeshBuffer,
    OrbitCamera, RenderContext, ScenePipelines, SurfaceError, axes_lines, centroid_markers,
    edge_lines, grid_vertices, init_render_context_blocking, normal_rays, sphere_shell,
};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::frame_clock::FrameClock;
use crate::scene::{
    AXES_ORANGE, CENTROID_GREEN, EDGE_BLACK, EDGE_RED, NORMAL_MAGENTA, PREVIOUS_YELLOW, SceneState,
};

/// Background clear color.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Auto-rotate rate: 0.5° per 30 ms, expressed per second.
const AUTO_ROTATE_RATE: f64 = 0.5 / 0.03;

/// Extra spin while a reveal plays and rotation is not held fixed.
const REVEAL_SPIN_RATE: f64 = 40.0;

/// Arrow-key orbit rate, degrees per second.
const ARROW_RATE: f64 = 66.0;

/// Zoom rate, world units per second.
const ZOOM_RATE: f64 = 1.5;

/// Subdivisions of the translucent sphere shell.
const SHELL_SUBDIVISIONS: u32 = 3;

/// Edge length of the centroid marker crosses.
const CENTROID_MARKER_SIZE: f64 = 0.1;

/// Extent of the world axes overlay.
const AXES_EXTENT: f64 = 2.0;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let mut attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    attrs
}

/// Face and edge colors for the active level, following the reveal rules:
/// during a reveal the bisected intermediate shows yellow faces with red
/// edges and the extended result shows red faces; outside a reveal the
/// (fading) scene face color is used, with red edges flagging a level that
/// is bisected but not yet extended.
fn active_level_colors(
    state: LevelState,
    reveal_active: bool,
    scene_face: [f32; 4],
) -> ([f32; 4], [f32; 4]) {
    if reveal_active {
        match state {
            LevelState::Bisected => (PREVIOUS_YELLOW, EDGE_RED),
            _ => ([1.0, 0.0, 0.0, 1.0], EDGE_BLACK),
        }
    } else if state == LevelState::Bisected {
        (scene_face, EDGE_RED)
    } else {
        (scene_face, EDGE_BLACK)
    }
}

/// GPU resources that only exist once the window is up.
struct GpuState {
    ctx: RenderContext,
    depth: DepthTexture,
    pipelines: ScenePipelines,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    light_bind_group: wgpu::BindGroup,
    grid_mesh: Option<MeshBuffer>,
    previous_mesh: Option<MeshBuffer>,
    line_mesh: Option<MeshBuffer>,
    shell_mesh: Option<MeshBuffer>,
}

/// Application state: the refinement engine plus the window, GPU resources,
/// camera, scene toggles, and input tracking around it.
pub struct AppState {
    config: Config,
    engine: RefineEngine,
    camera: OrbitCamera,
    scene: SceneState,
    keyboard: KeyboardState,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    meshes_dirty: bool,
}

impl AppState {
    /// Build the engine and presentation state from configuration. Fails
    /// only if the base icosahedron buffer cannot be allocated.
    pub fn with_config(config: Config) -> Result<Self, icogrid_grid::GridError> {
        let mut engine = RefineEngine::new(config.grid.max_level as usize)?;
        engine.set_mode(if config.grid.one_step_refine {
            RefineMode::OneStep
        } else {
            RefineMode::TwoStep
        });
        engine.set_reveal_enabled(config.grid.animated_reveal);

        let camera = OrbitCamera::new(
            config.view.ortho_extent,
            config.view.fov_y_degrees,
            config.view.perspective,
        );
        let scene = SceneState::from_config(&config.view);

        Ok(Self {
            config,
            engine,
            camera,
            scene,
            keyboard: KeyboardState::new(),
            clock: FrameClock::new(),
            window: None,
            gpu: None,
            meshes_dirty: true,
        })
    }

    /// Handle the discrete key bindings pressed this frame.
    fn handle_actions(&mut self, event_loop: &ActiveEventLoop) {
        for action in ViewerAction::triggered(&self.keyboard) {
            match action {
                ViewerAction::Refine => match self.engine.refine() {
                    Ok(RefineOutcome::Rejected) => {
                        debug!("refine rejected (at ceiling or reveal in flight)");
                    }
                    Ok(outcome) => {
                        match outcome {
                            RefineOutcome::Bisected { level } => {
                                info!(level, "bisected");
                            }
                            RefineOutcome::Extended { level } => {
                                info!(level, "extended onto sphere");
                            }
                            RefineOutcome::Refined { level } => {
                                info!(level, "refined (bisect + extend)");
                            }
                            RefineOutcome::Rejected => unreachable!(),
                        }
                        if self.engine.reveal().is_some() {
                            self.scene.on_reveal_started();
                        }
                        self.meshes_dirty = true;
                    }
                    Err(e) => {
                        error!("fatal: {e}");
                        event_loop.exit();
                        return;
                    }
                },
                ViewerAction::Downgrid => {
                    if self.engine.downgrid() {
                        info!(level = self.engine.active_level(), "downgraded");
                        self.scene.on_downgrid();
                        self.meshes_dirty = true;
                    } else {
                        debug!("downgrid rejected at base level");
                    }
                }
                ViewerAction::ToggleEdges => {
                    self.scene.show_edges = !self.scene.show_edges;
                    self.meshes_dirty = true;
                }
                ViewerAction::ToggleNormals => {
                    self.scene.show_normals = !self.scene.show_normals;
                    self.meshes_dirty = true;
                }
                ViewerAction::ToggleCentroids => {
                    self.scene.show_centroids = !self.scene.show_centroids;
                    self.meshes_dirty = true;
                }
                ViewerAction::ToggleSphere => {
                    self.scene.show_sphere = !self.scene.show_sphere;
                    self.meshes_dirty = true;
                }
                ViewerAction::ToggleAxes => {
                    self.scene.show_axes = !self.scene.show_axes;
                    self.meshes_dirty = true;
                }
                ViewerAction::ToggleAutoRotate => {
                    self.scene.auto_rotate = !self.scene.auto_rotate;
                }
                ViewerAction::ToggleFixedRotation => {
                    self.scene.fixed_during_reveal = !self.scene.fixed_during_reveal;
                }
                ViewerAction::ToggleReveal => {
                    // Not while one is already playing.
                    if self.engine.reveal().is_none() {
                        let enabled = !self.engine.reveal_enabled();
                        self.engine.set_reveal_enabled(enabled);
                        info!(enabled, "progressive reveal");
                    }
                }
                ViewerAction::ToggleRefineMode => {
                    if self.engine.reveal().is_none() {
                        let mode = self.engine.mode().toggled();
                        self.engine.set_mode(mode);
                        info!(?mode, "refine mode");
                    }
                }
                ViewerAction::ToggleProjection => {
                    self.camera.perspective = !self.camera.perspective;
                }
                ViewerAction::ResetView => {
                    self.camera.reset_angles();
                }
                ViewerAction::Quit => {
                    info!("quit requested");
                    event_loop.exit();
                    return;
                }
            }
        }
    }

    /// One fixed-rate simulation step.
    fn update(&mut self, dt: f64) {
        let had_reveal = self.engine.reveal().is_some();
        if self.engine.tick(dt) {
            info!(
                level = self.engine.active_level(),
                "reveal complete"
            );
        }
        if had_reveal {
            self.meshes_dirty = true;
        }

        let reveal_active = self.engine.reveal().is_some();
        if reveal_active {
            if !self.scene.fixed_during_reveal {
                self.camera.rotate(REVEAL_SPIN_RATE * dt, 0.0);
            }
        } else if self.scene.auto_rotate {
            self.camera
                .rotate(AUTO_ROTATE_RATE * dt, AUTO_ROTATE_RATE * dt);
        }

        let held = |code: KeyCode| self.keyboard.is_pressed(PhysicalKey::Code(code));
        let mut d_yaw = 0.0;
        let mut d_pitch = 0.0;
        if held(KeyCode::ArrowRight) {
            d_yaw += ARROW_RATE * dt;
        }
        if held(KeyCode::ArrowLeft) {
            d_yaw -= ARROW_RATE * dt;
        }
        if held(KeyCode::ArrowUp) {
            d_pitch += ARROW_RATE * dt;
        }
        if held(KeyCode::ArrowDown) {
            d_pitch -= ARROW_RATE * dt;
        }
        if d_yaw != 0.0 || d_pitch != 0.0 {
            self.camera.rotate(d_yaw, d_pitch);
        }
        if held(KeyCode::Equal) || held(KeyCode::NumpadAdd) {
            self.camera.zoom_in(ZOOM_RATE * dt, self.engine.radius());
        }
        if held(KeyCode::Minus) || held(KeyCode::NumpadSubtract) {
            self.camera.zoom_out(ZOOM_RATE * dt);
        }

        if self.scene.fade(dt, reveal_active) {
            self.meshes_dirty = true;
        }
    }

    /// Rebuild the GPU meshes from the engine and scene state.
    fn rebuild_meshes(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let allocator = BufferAllocator::new(&gpu.ctx.device);

        let state = self.engine.active_state();
        let reveal_active = self.engine.reveal().is_some();
        let visible = self.engine.visible_triangles();
        let (face, edge) = active_level_colors(state, reveal_active, self.scene.face_rgba());

        gpu.grid_mesh = Some(allocator.vertex_mesh("grid", &grid_vertices(visible, face)));
        gpu.previous_mesh = if reveal_active {
            self.engine
                .previous_triangles()
                .map(|prev| {
                    allocator.vertex_mesh("grid-previous", &grid_vertices(prev, PREVIOUS_YELLOW))
                })
        } else {
            None
        };

        let mut lines: Vec<LineVertex> = Vec::new();
        if self.scene.show_edges {
            lines.extend(edge_lines(visible, edge));
            if reveal_active
                && let Some(prev) = self.engine.previous_triangles()
            {
                lines.extend(edge_lines(prev, EDGE_BLACK));
            }
        }
        if self.scene.show_normals {
            lines.extend(normal_rays(visible, NORMAL_MAGENTA));
        }
        if self.scene.show_centroids {
            lines.extend(centroid_markers(visible, CENTROID_MARKER_SIZE, CENTROID_GREEN));
        }
        if self.scene.show_axes {
            lines.extend(axes_lines(AXES_EXTENT, AXES_ORANGE));
        }
        gpu.line_mesh = if lines.is_empty() {
            None
        } else {
            Some(allocator.vertex_mesh("overlay-lines", &lines))
        };

        gpu.shell_mesh = if self.scene.show_sphere {
            let (vertices, indices) = sphere_shell(
                self.engine.radius(),
                SHELL_SUBDIVISIONS,
                self.scene.sphere_rgba(),
            );
            Some(allocator.indexed_mesh("sphere-shell", &vertices, &indices))
        } else {
            None
        };
    }

    /// Draw the frame and present it.
    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        gpu.ctx.queue.write_buffer(
            &gpu.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera.to_uniform()),
        );

        let frame = match gpu.ctx.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost) => {
                let (w, h) = (gpu.ctx.surface_config.width, gpu.ctx.surface_config.height);
                gpu.ctx.resize(w, h);
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                debug!("surface timeout, skipping frame");
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("icogrid-frame"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("icogrid-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthTexture::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&gpu.pipelines.grid);
            pass.set_bind_group(0, &gpu.camera_bind_group, &[]);
            pass.set_bind_group(1, &gpu.light_bind_group, &[]);
            if let Some(mesh) = &gpu.previous_mesh {
                mesh.draw(&mut pass);
            }
            if let Some(mesh) = &gpu.grid_mesh {
                mesh.draw(&mut pass);
            }

            if let Some(mesh) = &gpu.line_mesh {
                pass.set_pipeline(&gpu.pipelines.lines);
                pass.set_bind_group(0, &gpu.camera_bind_group, &[]);
                mesh.draw(&mut pass);
            }

            // Translucent shell last so the grid shows through it.
            if let Some(mesh) = &gpu.shell_mesh {
                pass.set_pipeline(&gpu.pipelines.shell);
                pass.set_bind_group(0, &gpu.camera_bind_group, &[]);
                pass.set_bind_group(1, &gpu.light_bind_group, &[]);
                mesh.draw(&mut pass);
            }
        }

        gpu.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.camera.set_aspect_ratio(size.width, size.height);

        let ctx = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let depth = DepthTexture::new(&ctx.device, size.width, size.height);
        let pipelines = ScenePipelines::new(&ctx.device, ctx.surface_format);

        let camera_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("icogrid-camera-uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("icogrid-camera-bg"),
            layout: &pipelines.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let light_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("icogrid-light-uniform"),
            size: std::mem::size_of::<LightUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue
            .write_buffer(&light_buffer, 0, bytemuck::bytes_of(&LightUniform::default()));
        let light_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("icogrid-light-bg"),
            layout: &pipelines.light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        self.gpu = Some(GpuState {
            ctx,
            depth,
            pipelines,
            camera_buffer,
            camera_bind_group,
            light_bind_group,
            grid_mesh: None,
            previous_mesh: None,
            line_mesh: None,
            shell_mesh: None,
        });
        self.meshes_dirty = true;
        self.window = Some(window);
        info!(
            max_level = self.engine.store().max_level(),
            radius = self.engine.radius(),
            "viewer ready at level 0 (icosahedron)"
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.camera.set_aspect_ratio(new_size.width, new_size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.ctx.resize(new_size.width, new_size.height);
                    gpu.depth
                        .resize(&gpu.ctx.device, new_size.width, new_size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.camera.set_aspect_ratio(size.width, size.height);
                    if let Some(gpu) = &mut self.gpu {
                        gpu.ctx.resize(size.width, size.height);
                        gpu.depth.resize(&gpu.ctx.device, size.width, size.height);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::RedrawRequested => {
                self.handle_actions(event_loop);

                let mut clock = std::mem::take(&mut self.clock);
                clock.tick(|dt| self.update(dt));
                self.clock = clock;

                if self.meshes_dirty {
                    self.rebuild_meshes();
                    self.meshes_dirty = false;
                }
                self.render(event_loop);

                self.keyboard.clear_transients();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer with the given config.
///
/// This function blocks until the window is closed. A failure to allocate
/// the base grid is fatal and terminates the process with a message.
pub fn run_with_config(config: Config) {
    let mut app = match AppState::with_config(config) {
        Ok(app) => app,
        Err(e) => {
            error!("cannot build base grid: {e}");
            std::process::exit(1);
        }
    };
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.run_app(&mut app).expect("Event loop failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FACE_GREY;

    #[test]
    fn test_window_attributes_follow_config() {
        let mut config = Config::default();
        config.window.title = "Test Grid".to_string();
        config.window.width = 640;
        config.window.height = 480;
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Test Grid");
        assert!(attrs.fullscreen.is_none());
    }

    #[test]
    fn test_active_level_colors_bisected_reveal() {
        let (face, edge) = active_level_colors(LevelState::Bisected, true, [0.5; 4]);
        assert_eq!(face, PREVIOUS_YELLOW);
        assert_eq!(edge, EDGE_RED);
    }

    #[test]
    fn test_active_level_colors_extended_reveal() {
        let (face, edge) = active_level_colors(LevelState::Extended, true, [0.5; 4]);
        assert_eq!(face, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(edge, EDGE_BLACK);
    }

    #[test]
    fn test_active_level_colors_quiescent() {
        let scene_face = [FACE_GREY[0], FACE_GREY[1], FACE_GREY[2], 1.0];
        let (face, edge) = active_level_colors(LevelState::Extended, false, scene_face);
        assert_eq!(face, scene_face);
        assert_eq!(edge, EDGE_BLACK);

        let (_, edge) = active_level_colors(LevelState::Bisected, false, scene_face);
        assert_eq!(edge, EDGE_RED);
    }

    #[test]
    fn test_app_state_seeds_engine_from_config() {
        let mut config = Config::default();
        config.grid.max_level = 3;
        config.grid.one_step_refine = true;
        config.grid.animated_reveal = false;
        let app = AppState::with_config(config).unwrap();
        assert_eq!(app.engine.store().max_level(), 3);
        assert_eq!(app.engine.mode(), RefineMode::OneStep);
        assert!(!app.engine.reveal_enabled());
    }
}
