mod hud;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use rooftop_assets::{AssetStore, AvatarRig};
use rooftop_input::{Action, InputFrame, InputState, Key};
use rooftop_kernel::{FixedTimestep, GameConfig, GameWorld};
use rooftop_render::{CameraMode, RenderView, build_draw_list};
use rooftop_render_wgpu::{GpuCamera, WgpuRenderer};
use rooftop_tools::{FrameTimer, GameInspector};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::hud::HudView;

#[derive(Parser)]
#[command(name = "rooftop-desktop", about = "Rooftop Gallery: a paintball shooting gallery over a procedural city")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Game configuration (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// City and round seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// glTF avatar whose animation clips follow the movement state
    #[arg(long)]
    avatar: Option<PathBuf>,
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyP => Key::P,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::F1 => Key::F1,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

fn map_button(button: MouseButton) -> Option<rooftop_input::MouseButton> {
    match button {
        MouseButton::Left => Some(rooftop_input::MouseButton::Left),
        MouseButton::Right => Some(rooftop_input::MouseButton::Right),
        _ => None,
    }
}

/// Game state owned by the window loop.
struct AppState {
    world: GameWorld,
    input: InputState,
    clock: FixedTimestep,
    camera: CameraMode,
    rig: Option<AvatarRig>,
    frame_timer: FrameTimer,
    last_frame: Instant,
    grabbed: bool,
    show_hud: bool,
    show_help: bool,
}

impl AppState {
    fn new(world: GameWorld, rig: Option<AvatarRig>) -> Self {
        let clock = FixedTimestep::new(world.config().tick_rate);
        Self {
            world,
            input: InputState::default(),
            clock,
            camera: CameraMode::default(),
            rig,
            frame_timer: FrameTimer::new(120),
            last_frame: Instant::now(),
            grabbed: false,
            show_hud: true,
            show_help: false,
        }
    }

    /// Apply toggles, then run as many fixed ticks as the frame time allows.
    fn update(&mut self, window: &Window) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.frame_timer.record(dt);

        for action in self.input.drain_triggers() {
            self.handle_trigger(action, window);
        }

        let ticks = self.clock.advance(dt.as_secs_f32());
        if ticks == 0 {
            return;
        }
        let frame = self.input.take_frame();
        // Look input applies once, however many ticks this frame runs.
        let held = InputFrame {
            look_delta: Default::default(),
            ..frame
        };
        for tick in 0..ticks {
            self.world.step(if tick == 0 { &frame } else { &held });
        }
        for event in self.world.drain_events() {
            tracing::debug!(?event, "game event");
        }
    }

    fn handle_trigger(&mut self, action: Action, window: &Window) {
        match action {
            Action::ToggleHud => self.show_hud = !self.show_hud,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ToggleCamera => {
                self.camera = self.camera.toggled();
                tracing::info!(camera = ?self.camera, "camera mode");
            }
            Action::TogglePause => {
                let paused = !self.world.paused();
                self.world.set_paused(paused);
                self.clock.reset();
            }
            Action::ResetRound => self.world.reset_round(),
            Action::ReleaseCursor => self.set_grab(window, false),
            _ => {}
        }
    }

    fn set_grab(&mut self, window: &Window, grab: bool) {
        if grab {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("cursor grab unavailable: {e}");
                return;
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("cursor release failed: {e}");
        }
        window.set_cursor_visible(!grab);
        self.grabbed = grab;
        if !grab {
            self.input.clear();
        }
    }

    fn current_clip(&self) -> Option<&str> {
        let rig = self.rig.as_ref()?;
        rig.clip_for(self.world.avatar().anim.name()).map(|c| c.name.as_str())
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        let summary = GameInspector::summary(&self.world);
        let view = HudView {
            summary: &summary,
            fps: self.frame_timer.fps(),
            clip: self.current_clip(),
            paused: self.world.paused(),
            grabbed: self.grabbed,
            third_person: !self.camera.is_first_person(),
        };
        if self.show_hud {
            hud::draw_hud(ctx, &view);
        }
        hud::draw_status(ctx, &view);
        if self.show_help {
            hud::draw_help(ctx);
        }
        if self.camera.is_first_person() || self.grabbed {
            hud::draw_crosshair(ctx);
        }
    }
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, world: &GameWorld) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Rooftop Gallery")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("rooftop_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        renderer.set_street_grid(&device, &world.config().city);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(backend = adapter.get_info().backend.to_str(), "GPU initialized");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, self.config.width, self.config.height);
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn redraw(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        state.update(&self.window);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let render_view = RenderView::for_avatar(&state.world, state.camera);
        let camera = GpuCamera::from_view(&render_view, self.aspect());
        let list = build_draw_list(&state.world, state.camera);
        self.renderer.render(&self.device, &self.queue, &view, &camera, &list);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        self.window.request_redraw();
    }
}

struct GpuApp {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &self.state.world) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let state = &mut self.state;

        // While playing, the game owns the keyboard and mouse.
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed && !state.grabbed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(summary = %GameInspector::summary(&state.world), "closing");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => gpu.resize(size),
            WindowEvent::Focused(false) => state.set_grab(&gpu.window, false),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    state.input.key(key, key_state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                let pressed = btn_state == ElementState::Pressed;
                if !state.grabbed {
                    // The click that grabs the cursor does not fire.
                    if pressed && button == MouseButton::Left {
                        state.set_grab(&gpu.window, true);
                    }
                } else if let Some(button) = map_button(button) {
                    state.input.button(button, pressed);
                }
            }
            WindowEvent::RedrawRequested => gpu.redraw(state, &self.egui_ctx),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.grabbed {
                self.state.input.mouse_motion(delta.0, delta.1);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn load_rig(path: &Path) -> Result<AvatarRig> {
    let mut store = AssetStore::new();
    store.import_gltf(path)?;
    let clips: Vec<_> = store.clips().cloned().collect();
    if clips.is_empty() {
        tracing::warn!(path = %path.display(), "avatar has no animations");
    }
    Ok(AvatarRig::from_clips(&clips))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("rooftop-desktop starting");

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let world = GameWorld::new(config)?;
    let rig = cli.avatar.as_deref().map(load_rig).transpose()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp {
        state: AppState::new(world, rig),
        egui_ctx: EguiContext::default(),
        gpu: None,
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
