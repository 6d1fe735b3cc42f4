//! Application shell: the winit event loop, input wiring, and the
//! per-frame tick that drives loading, controls, interpolation and
//! drawing.

mod egui_host;
mod input;
mod timing;

pub use egui_host::EguiFrameOutput;

use crate::assets::{self, LoadEvent};
use crate::render::pick::{self, Ray, MISS_DISTANCE};
use crate::render::{Camera, OrbitController, RenderContext};
use crate::scene::{LoadStatus, ViewerState};
use crate::ui;
use egui_host::EguiHost;
use input::{InputAction, InputState};
use timing::FrameTiming;

use glam::Vec2;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Turntable - glTF Viewer";

/// The single static asset this viewer shows, resolved relative to the
/// working directory.
const MODEL_PATH: &str = "assets/model.glb";

pub struct App {
    window: Option<Arc<Window>>,
    render: Option<RenderContext>,
    egui: Option<EguiHost>,
    state: ViewerState,
    camera: Camera,
    controller: OrbitController,
    input: InputState,
    timing: FrameTiming,
    loader: Option<Receiver<LoadEvent>>,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new() -> Self {
        let state = ViewerState::new();
        let controller = OrbitController::new(&state.framing);
        Self {
            window: None,
            render: None,
            egui: None,
            state,
            camera: Camera::new(1280, 720),
            controller,
            input: InputState::default(),
            timing: FrameTiming::new(WINDOW_TITLE.to_string()),
            loader: None,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(render) = &mut self.render {
            render.resize(new_size);
        }
        self.camera.set_viewport(new_size.width, new_size.height);
    }

    /// Drain loader events; mutually exclusive with drawing because the
    /// render tick is the only drain point.
    fn drain_loader(&mut self) {
        let Some(receiver) = &self.loader else {
            return;
        };
        let events: Vec<LoadEvent> = receiver.try_iter().collect();
        for event in events {
            match event {
                LoadEvent::Progress(fraction) => {
                    log::debug!("Loading model: {:.2}%", fraction * 100.0);
                    self.state.load = LoadStatus::Loading(fraction);
                }
                LoadEvent::Loaded(model) => {
                    let mut model = *model;
                    let translation = model.recenter();
                    log::info!(
                        "Model '{}' loaded: {} triangles, size {:?}, recentered by {:?}",
                        model.name,
                        model.triangle_count(),
                        model.size().to_array(),
                        translation.to_array()
                    );
                    if let Some(render) = &mut self.render {
                        render.upload_model(&model);
                    }
                    self.state.attach_model(model);
                    self.controller.frame(&self.state.framing);
                    self.loader = None;
                }
                LoadEvent::Failed(err) => {
                    log::warn!("Failed to load {}: {}", MODEL_PATH, err);
                    self.state.fail_load(err.to_string());
                    self.controller.frame(&self.state.framing);
                    if let Some(render) = &mut self.render {
                        render.clear_model();
                    }
                    self.loader = None;
                }
            }
        }
    }

    /// Reset camera and orbit target to the load-time framing. Also
    /// forces the look interpolation idle so it cannot clobber the
    /// reset on the next tick.
    fn recenter(&mut self) {
        self.state.look.cancel();
        self.controller.frame(&self.state.framing);
    }

    /// Primary-button press: raycast through the pointer and retarget
    /// the orbit controller via the timed interpolation.
    fn begin_look_at_pointer(&mut self) {
        let Some((cursor_x, cursor_y)) = self.input.cursor() else {
            return;
        };
        let Some(window) = &self.window else {
            return;
        };
        let size = window.inner_size();
        let ndc = Vec2::new(
            2.0 * cursor_x / size.width.max(1) as f32 - 1.0,
            1.0 - 2.0 * cursor_y / size.height.max(1) as f32,
        );
        let view_proj = self.camera.projection() * self.controller.view_matrix();
        let ray = Ray::through_ndc(self.controller.eye(), view_proj, ndc);
        let end = self
            .state
            .model
            .as_ref()
            .and_then(|model| pick::intersect_model(model, &ray))
            .unwrap_or_else(|| self.controller.eye() + self.controller.forward() * MISS_DISTANCE);
        self.state
            .look
            .begin(self.controller.target(), end, Instant::now());
    }

    fn redraw(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        self.drain_loader();

        let now = Instant::now();
        self.timing.update(Some(window.as_ref()), now);

        if let Some(target) = self.state.look.sample(now) {
            self.controller.set_target(target);
        }
        self.controller.update(self.timing.frame_dt);

        let Some(egui) = &mut self.egui else {
            return;
        };
        let mut panel = ui::PanelResponse::default();
        let state = &mut self.state;
        let ui_output = egui.run_ui(window.as_ref(), |ctx| {
            panel = ui::draw_panel(ctx, state);
        });

        if panel.changed {
            // Keep widgets and live lights in lockstep: apply before
            // the draw below.
            self.state.rig.apply(&self.state.settings);
        }
        if panel.recenter {
            self.recenter();
        }

        if let Some(render) = &mut self.render {
            render.render(&self.state.rig, &self.camera, &self.controller, ui_output);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(1280u32, 720u32))
            .with_resizable(true);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        match RenderContext::new(window.clone()) {
            Ok(render) => self.render = Some(render),
            Err(err) => {
                log::error!("Renderer initialization failed: {err}");
                event_loop.exit();
                return;
            }
        }
        self.egui = Some(EguiHost::new(&window));
        let size = window.inner_size();
        self.camera.set_viewport(size.width, size.height);
        self.update_target_frame_duration(&window);
        self.window = Some(window);

        self.loader = Some(assets::spawn_load(PathBuf::from(MODEL_PATH)));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let consumed = self
            .egui
            .as_mut()
            .map(|egui| egui.on_window_event(&window, &event))
            .unwrap_or(false);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
                self.update_target_frame_duration(&window);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.handle_resize(window.inner_size());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || consumed {
                    return;
                }
                match self.input.handle_key(event.physical_key) {
                    InputAction::Quit => event_loop.exit(),
                    InputAction::Recenter => self.recenter(),
                    InputAction::None => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (dx, dy) = self
                    .input
                    .cursor_moved(position.x as f32, position.y as f32);
                if self.input.rotate_held {
                    self.controller.inject_rotate(Vec2::new(dx, dy));
                } else if self.input.pan_held {
                    self.controller.inject_pan(Vec2::new(dx, dy));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.cursor_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                if consumed && pressed {
                    return;
                }
                self.input.handle_button(button, pressed);
                if button == MouseButton::Left && pressed {
                    self.begin_look_at_pointer();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if consumed {
                    return;
                }
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 60.0,
                };
                self.controller.inject_zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("🚀 Turntable glTF viewer");
    log::info!("   Drag to orbit, click to retarget, F to recenter, ESC to exit");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");

    log::info!("👋 Goodbye!");
}
