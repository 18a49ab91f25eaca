//! Small OpenGL demo programs on a shared window/context harness.
//!
//! The harness ([`runtime::run`]) opens one window through [winit], creates a
//! core-profile OpenGL context on it with [glutin], loads GL functions via
//! [glow], and drives an [`Application`] until Escape is pressed or the
//! window is closed. Each demo is an independent `Application`:
//!
//! - [`demos::Triangle`]: one triangle, positioned and colored through
//!   generic vertex attributes, over a time-varying clear color.
//! - [`demos::SpinningCube`]: two dozen cubes drawn from one vertex buffer
//!   with per-cube model-view matrices and a perspective projection.
//! - [`demos::Sprites`]: a field of textured sprites drawn with a single
//!   instanced draw call, animated on the CPU every frame.
//!
//! # Safety
//!
//! GL calls are `unsafe`. Everything that issues them runs on the harness
//! thread while the context it created is current.
//!
//! [winit]: https://docs.rs/winit
//! [glutin]: https://docs.rs/glutin
//! [glow]: https://docs.rs/glow

pub mod app;
pub mod clock;
pub mod demos;
pub mod error;
pub mod input;
pub mod logging;
pub mod runtime;
pub mod shaders;
pub mod texture;
pub mod types;

pub use app::{AppConfig, Application};
pub use error::GlError;
pub use runtime::run;
