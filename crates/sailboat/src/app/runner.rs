use std::sync::Arc;
use std::time::Instant;

use ocean_sim::SceneConfig;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::{camera::FlyCamera, camera::InputState, context::GpuContext};
use crate::gpu::{self, RenderError};

/// Longest step fed to the simulation, so a stalled frame does not teleport it.
pub const MAX_FRAME_DT: f32 = 0.1;

pub trait App: Sized + 'static {
    fn init(ctx: &GpuContext, config: &SceneConfig) -> Result<Self, RenderError>;
    fn update(&mut self, ctx: &mut GpuContext, dt: f32);
    fn render(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    );

    fn on_key(&mut self, _key: KeyCode, _pressed: bool) {}
    fn on_resize(&mut self, _ctx: &GpuContext) {}
    fn camera(&self) -> &FlyCamera;
    fn camera_mut(&mut self) -> &mut FlyCamera;
    fn title() -> &'static str {
        "App"
    }
}

/// Run `A` until the window is closed or Escape is pressed.
///
/// Startup failures (adapter, device, shaders) end the loop and are returned.
pub fn run<A: App>(config: SceneConfig) -> Result<(), RenderError> {
    let event_loop = EventLoop::new().map_err(|e| RenderError::EventLoop(e.to_string()))?;
    let mut runner = AppRunner::<A>::new(config);
    event_loop
        .run_app(&mut runner)
        .map_err(|e| RenderError::EventLoop(e.to_string()))?;
    match runner.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Update camera movement flags. Returns false for keys that do not move the camera.
fn apply_movement_key(input: &mut InputState, code: KeyCode, pressed: bool) -> bool {
    match code {
        KeyCode::KeyW => input.forward = pressed,
        KeyCode::KeyS => input.back = pressed,
        KeyCode::KeyA => input.left = pressed,
        KeyCode::KeyD => input.right = pressed,
        KeyCode::Space => input.up = pressed,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => input.down = pressed,
        _ => return false,
    }
    true
}

struct AppRunner<A: App> {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    ctx: Option<GpuContext>,
    app: Option<A>,
    input_state: InputState,
    last_time: Option<Instant>,
    error: Option<RenderError>,
}

impl<A: App> AppRunner<A> {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            window: None,
            ctx: None,
            app: None,
            input_state: InputState::default(),
            last_time: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RenderError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RenderError> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(A::title())
                    .with_inner_size(winit::dpi::LogicalSize::new(1280, 720)),
            )
            .map_err(|e| RenderError::WindowCreation(e.to_string()))?;
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let ctx = pollster::block_on(GpuContext::new(window))?;
        let app = A::init(&ctx, &self.config)?;
        log::info!("Scene initialized");

        self.app = Some(app);
        self.ctx = Some(ctx);
        self.last_time = Some(Instant::now());
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if gpu::is_device_lost() {
            self.fail(event_loop, RenderError::DeviceLost);
            return;
        }
        let (Some(ctx), Some(app), Some(last_time)) = (&mut self.ctx, &mut self.app, self.last_time)
        else {
            return;
        };

        let now = Instant::now();
        let dt = (now - last_time).as_secs_f32().min(MAX_FRAME_DT);
        self.last_time = Some(now);

        app.camera_mut().update(&self.input_state, dt);
        app.update(ctx, dt);

        ctx.set_camera(app.camera());
        ctx.flush_scene();

        let surface_texture = match ctx.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                ctx.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, RenderError::Surface(wgpu::SurfaceError::OutOfMemory));
                return;
            }
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                return;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        app.render(ctx, &mut encoder, &view);

        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl<A: App> ApplicationHandler for AppRunner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.start(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let (Some(ctx), Some(app)) = (&mut self.ctx, &mut self.app) {
            match event {
                WindowEvent::Resized(size) => {
                    ctx.resize(size.width, size.height);
                    app.on_resize(ctx);
                }
                WindowEvent::KeyboardInput {
                    event,
                    is_synthetic: false,
                    ..
                } => {
                    let pressed = event.state == ElementState::Pressed;
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if code == KeyCode::Escape && pressed {
                            log::info!("Escape pressed, exiting");
                            event_loop.exit();
                        } else if !apply_movement_key(&mut self.input_state, code, pressed) {
                            app.on_key(code, pressed);
                        }
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                    };
                    app.camera_mut().on_scroll(scroll);
                }
                WindowEvent::CloseRequested => {
                    event_loop.exit();
                }
                _ => {}
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(app) = &mut self.app {
            if let DeviceEvent::MouseMotion { delta } = event {
                app.camera_mut()
                    .on_mouse_move(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.frame(event_loop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state_default() {
        let input = InputState::default();
        assert!(!input.forward);
        assert!(!input.back);
        assert!(!input.left);
        assert!(!input.right);
        assert!(!input.up);
        assert!(!input.down);
    }

    #[test]
    fn test_movement_keys_consumed() {
        let mut input = InputState::default();
        assert!(apply_movement_key(&mut input, KeyCode::KeyW, true));
        assert!(apply_movement_key(&mut input, KeyCode::ShiftRight, true));
        assert!(input.forward);
        assert!(input.down);
        assert!(apply_movement_key(&mut input, KeyCode::KeyW, false));
        assert!(!input.forward);
    }

    #[test]
    fn test_arrow_keys_pass_through() {
        let mut input = InputState::default();
        for code in [KeyCode::ArrowUp, KeyCode::ArrowDown, KeyCode::ArrowLeft, KeyCode::ArrowRight] {
            assert!(!apply_movement_key(&mut input, code, true));
        }
        assert!(!input.forward && !input.back && !input.left && !input.right);
    }
}
