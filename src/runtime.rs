//! The window/context harness and its blocking frame loop.
//!
//! [`run`] owns the winit event loop, a single window, and the OpenGL
//! context created on it through glutin. It forwards window events to an
//! [`Application`] and renders continuously until Escape is pressed or the
//! window is closed.

use std::num::NonZeroU32;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::{AppConfig, Application};
use crate::clock::{FpsCounter, FrameClock};
use crate::input::{self, Action, Key};

/// How often the frame rate is logged at debug level, in seconds.
const FPS_LOG_INTERVAL: f64 = 1.0;

/// Run `app` until its window is closed.
///
/// Calls [`Application::init`] with `config` before anything is created,
/// then builds the window and context from the (possibly modified) config.
///
/// # Errors
///
/// Returns an error, after logging it, if the event loop, window, or GL
/// context cannot be created, if [`Application::startup`] fails, or if
/// presenting a frame fails.
pub fn run<A: Application>(config: AppConfig, app: A) -> Result<()> {
    let result = run_loop(config, app);
    if let Err(err) = &result {
        log::error!("{err:#}");
    }
    result
}

fn run_loop<A: Application>(mut config: AppConfig, mut app: A) -> Result<()> {
    app.init(&mut config);
    log::debug!("starting {:?} ({}x{})", config.title, config.width, config.height);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut harness = Harness::new(config, app);
    event_loop
        .run_app(&mut harness)
        .context("event loop terminated with error")?;

    harness.error.map_or(Ok(()), Err)
}

/// Whether a key event should close the window.
#[must_use]
pub fn is_close_request(key: Key, action: Action) -> bool {
    key == Key::Escape && matches!(action, Action::Press | Action::Repeat)
}

/// The size as non-zero surface dimensions, or `None` while minimized.
#[must_use]
pub fn surface_size(size: PhysicalSize<u32>) -> Option<(NonZeroU32, NonZeroU32)> {
    Some((NonZeroU32::new(size.width)?, NonZeroU32::new(size.height)?))
}

/// Cursor positions arrive as sub-pixel floats; callbacks get whole pixels.
#[expect(clippy::cast_possible_truncation)]
fn window_coord(value: f64) -> i32 {
    value as i32
}

/// Everything that lives exactly as long as the window.
///
/// Field order is drop order: GL function table, then surface, then
/// context, then the window they were created on.
struct WindowState {
    gl: glow::Context,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl WindowState {
    fn create(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(config.resizable);
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|err| anyhow!("failed to create window: {err}"))?;
        let window = window.context("failed to create window")?;

        let display = gl_config.display();
        let (major, minor) = config.gl_version;
        let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(raw_window_handle);

        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .with_context(|| format!("failed to create OpenGL {major}.{minor} core context"))?;

        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::default())
            .context("failed to describe window surface")?;
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to initialize OpenGL context")?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol))
        };
        log::info!("OpenGL {}", unsafe { gl.get_parameter_string(glow::VERSION) });

        if config.vsync {
            if let Err(err) =
                surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                log::warn!("could not enable vsync: {err}");
            }
        }

        Ok(Self {
            gl,
            surface,
            context,
            window,
        })
    }
}

/// Prefer the config with the most MSAA samples.
///
/// # Panics
///
/// Panics if glutin offers no configs, which it reports as an error before
/// calling the picker.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    let config = configs
        .reduce(|best, candidate| {
            if candidate.num_samples() > best.num_samples() {
                candidate
            } else {
                best
            }
        })
        .expect("glutin offers at least one config");
    log::debug!("picked GL config with {} samples", config.num_samples());
    config
}

/// Adapts an [`Application`] to winit's [`ApplicationHandler`].
struct Harness<A> {
    config: AppConfig,
    app: A,
    window: Option<WindowState>,
    /// `startup` succeeded, so `shutdown` is owed.
    started: bool,
    clock: FrameClock,
    fps: FpsCounter,
    /// First fatal error; returned from [`run`] once the loop exits.
    error: Option<anyhow::Error>,
}

impl<A: Application> Harness<A> {
    fn new(config: AppConfig, app: A) -> Self {
        Self {
            config,
            app,
            window: None,
            started: false,
            clock: FrameClock::new(),
            fps: FpsCounter::new(FPS_LOG_INTERVAL),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        if self.error.is_none() {
            self.error = Some(err);
        } else {
            log::error!("{err:#}");
        }
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = WindowState::create(event_loop, &self.config)?;
        let window = self.window.insert(window);

        self.app
            .startup(&window.gl)
            .context("demo startup failed")?;
        self.started = true;

        if let Some((width, height)) = surface_size(window.window.inner_size()) {
            self.app.resize(&window.gl, width.get(), height.get());
        }

        self.clock = FrameClock::new();
        window.window.request_redraw();
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(window) = &self.window else {
            return Ok(());
        };

        let frame = self.clock.tick();
        self.app.render(&window.gl, frame.time);
        window
            .surface
            .swap_buffers(&window.context)
            .context("failed to swap buffers")?;

        if let Some(fps) = self.fps.record(frame.time) {
            log::debug!("{fps:.1} fps (frame {})", frame.frame_index);
        }
        Ok(())
    }
}

impl<A: Application> ApplicationHandler for Harness<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.window = None;
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = &self.window else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let key = input::map_key(event.physical_key);
                let action = input::map_action(event.state, event.repeat);
                if is_close_request(key, action) {
                    event_loop.exit();
                }
                self.app.on_key(key, action);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.app.on_mouse_button(
                    input::map_mouse_button(button),
                    input::map_action(state, false),
                );
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.app
                    .on_mouse_move(window_coord(position.x), window_coord(position.y));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.app.on_mouse_wheel(input::wheel_offset(delta));
            }

            WindowEvent::Resized(size) => {
                if let Some((width, height)) = surface_size(size) {
                    window.surface.resize(&window.context, width, height);
                    self.app.resize(&window.gl, size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.take() {
            if self.started {
                self.app.shutdown(&window.gl);
                self.started = false;
            }
            log::debug!("destroying window and OpenGL context");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_and_repeat_close() {
        assert!(is_close_request(Key::Escape, Action::Press));
        assert!(is_close_request(Key::Escape, Action::Repeat));
        assert!(!is_close_request(Key::Escape, Action::Release));
        assert!(!is_close_request(Key::Q, Action::Press));
    }

    #[test]
    fn minimized_surface_has_no_size() {
        assert_eq!(surface_size(PhysicalSize::new(0, 600)), None);
        assert_eq!(surface_size(PhysicalSize::new(800, 0)), None);
        let (w, h) = surface_size(PhysicalSize::new(800, 600)).expect("non-zero size");
        assert_eq!((w.get(), h.get()), (800, 600));
    }

    #[test]
    fn cursor_coordinates_truncate() {
        assert_eq!(window_coord(12.9), 12);
        assert_eq!(window_coord(-3.5), -3);
    }
}
