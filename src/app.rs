//! The callback surface every demo implements, and the window/context
//! settings the harness reads before creating anything.

use crate::error::GlError;
use crate::input::{Action, Key, MouseButton};

/// Window and context settings.
///
/// Demos may adjust these in [`Application::init`], which runs before the
/// window exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial inner width in physical pixels.
    pub width: u32,
    /// Initial inner height in physical pixels.
    pub height: u32,
    /// Requested OpenGL `(major, minor)` version. Always a core profile.
    pub gl_version: (u8, u8),
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Wait for vertical blank when swapping buffers.
    pub vsync: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "OpenGL".to_string(),
            width: 800,
            height: 600,
            gl_version: (4, 5),
            resizable: false,
            vsync: true,
        }
    }
}

impl AppConfig {
    /// Width over height of the configured size, or `1.0` for a degenerate
    /// height.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// A demo driven by [`run`](crate::runtime::run).
///
/// Only [`render`](Self::render) is required. The harness calls, in order:
/// `init`, `startup`, `resize` (once with the real surface size), then
/// `render` every frame with input callbacks interleaved, and finally
/// `shutdown` while the context is still current.
pub trait Application {
    /// Adjust window/context settings before the window is created.
    fn init(&mut self, config: &mut AppConfig) {
        let _ = config;
    }

    /// Create GPU resources. The context is current.
    ///
    /// # Errors
    ///
    /// A failure here aborts the run; the harness logs it and `run` returns
    /// an error.
    fn startup(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let _ = gl;
        Ok(())
    }

    /// Draw one frame. `current_time` is seconds since the loop started.
    fn render(&mut self, gl: &glow::Context, current_time: f64);

    /// The drawable was resized to `width` x `height` physical pixels.
    fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) {
        let _ = (gl, width, height);
    }

    /// A key changed state.
    fn on_key(&mut self, key: Key, action: Action) {
        let _ = (key, action);
    }

    /// A mouse button changed state.
    fn on_mouse_button(&mut self, button: MouseButton, action: Action) {
        let _ = (button, action);
    }

    /// The cursor moved to `(x, y)` in window pixels.
    fn on_mouse_move(&mut self, x: i32, y: i32) {
        let _ = (x, y);
    }

    /// The vertical scroll wheel moved by `offset` lines.
    fn on_mouse_wheel(&mut self, offset: f64) {
        let _ = offset;
    }

    /// Release GPU resources. The context is still current.
    fn shutdown(&mut self, gl: &glow::Context) {
        let _ = gl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_harness_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.title, "OpenGL");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.gl_version, (4, 5));
        assert!(!config.resizable);
        assert!(config.vsync);
    }

    #[test]
    fn aspect_ratio_of_default_size() {
        let aspect = AppConfig::default().aspect_ratio();
        assert!((aspect - 800.0 / 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn aspect_ratio_zero_height_falls_back_to_one() {
        let config = AppConfig {
            height: 0,
            ..AppConfig::default()
        };
        assert!((config.aspect_ratio() - 1.0).abs() < f32::EPSILON);
    }

    struct Counting {
        inits: u32,
    }

    impl Application for Counting {
        fn init(&mut self, config: &mut AppConfig) {
            self.inits += 1;
            config.title = "counting".into();
        }

        fn render(&mut self, _gl: &glow::Context, _current_time: f64) {}
    }

    #[test]
    fn init_can_rewrite_config() {
        let mut app = Counting { inits: 0 };
        let mut config = AppConfig::default();
        app.init(&mut config);
        assert_eq!(app.inits, 1);
        assert_eq!(config.title, "counting");
        // Input callbacks default to no-ops.
        app.on_key(Key::Escape, Action::Press);
        app.on_mouse_wheel(1.0);
    }
}
