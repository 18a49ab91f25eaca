//! The demo programs. Each one is a self-contained [`Application`] and is
//! launched by its own binary under `src/bin/`.
//!
//! [`Application`]: crate::app::Application

pub mod cube;
pub mod sprites;
pub mod triangle;

pub use cube::SpinningCube;
pub use sprites::Sprites;
pub use triangle::Triangle;

/// Convert a surface dimension to the `i32` that `glViewport` expects,
/// saturating at `i32::MAX`.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_size_saturates() {
        assert_eq!(gl_size(800), 800);
        assert_eq!(gl_size(u32::MAX), i32::MAX);
    }
}
