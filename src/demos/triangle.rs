//! A single triangle whose position and the clear color oscillate with time.
//!
//! No vertex buffers are used: the vertex shader indexes a constant array
//! with `gl_VertexID`, and the offset and color are fed through generic
//! vertex attributes 0 and 1.

use glow::HasContext;

use crate::app::{AppConfig, Application};
use crate::error::GlError;
use crate::shaders;

/// Flat color of the triangle.
pub const TRIANGLE_COLOR: [f32; 4] = [0.0, 0.8, 1.0, 1.0];

/// Clear color at `time` seconds: red and green follow sine and cosine.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn clear_color(time: f64) -> [f32; 4] {
    [
        (time.sin() * 0.5 + 0.5) as f32,
        (time.cos() * 0.5 + 0.5) as f32,
        0.0,
        0.0,
    ]
}

/// Offset added to every triangle vertex at `time` seconds. The triangle
/// traces an ellipse with radii 0.5 and 0.6.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn triangle_offset(time: f64) -> [f32; 4] {
    [(time.sin() * 0.5) as f32, (time.cos() * 0.6) as f32, 0.0, 0.0]
}

struct Gpu {
    program: glow::Program,
    vao: glow::VertexArray,
}

/// The triangle demo.
#[derive(Default)]
pub struct Triangle {
    gpu: Option<Gpu>,
}

impl Application for Triangle {
    fn init(&mut self, config: &mut AppConfig) {
        config.title = "Triangle".to_string();
    }

    fn startup(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        unsafe {
            let program = shaders::compile_program(
                gl,
                shaders::TRIANGLE_VERTEX_SRC,
                shaders::TRIANGLE_FRAGMENT_SRC,
            )?;
            // Core profile refuses to draw without a bound VAO, even an empty one.
            let vao = match gl.create_vertex_array() {
                Ok(vao) => vao,
                Err(err) => {
                    gl.delete_program(program);
                    return Err(err.into());
                }
            };
            gl.bind_vertex_array(Some(vao));
            self.gpu = Some(Gpu { program, vao });
        }
        Ok(())
    }

    fn render(&mut self, gl: &glow::Context, current_time: f64) {
        let Some(gpu) = &self.gpu else {
            return;
        };

        let [r, g, b, a] = clear_color(current_time);
        let [ox, oy, oz, ow] = triangle_offset(current_time);
        let [cr, cg, cb, ca] = TRIANGLE_COLOR;

        unsafe {
            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT);

            gl.use_program(Some(gpu.program));
            gl.bind_vertex_array(Some(gpu.vao));

            gl.vertex_attrib_4_f32(0, ox, oy, oz, ow);
            gl.vertex_attrib_4_f32(1, cr, cg, cb, ca);

            gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
    }

    fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) {
        unsafe { gl.viewport(0, 0, super::gl_size(width), super::gl_size(height)) };
    }

    fn shutdown(&mut self, gl: &glow::Context) {
        if let Some(gpu) = self.gpu.take() {
            unsafe {
                gl.bind_vertex_array(None);
                gl.delete_program(gpu.program);
                gl.delete_vertex_array(gpu.vao);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgba_eq(actual: [f32; 4], expected: [f32; 4]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn clear_color_at_time_zero() {
        assert_rgba_eq(clear_color(0.0), [0.5, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn clear_color_at_quarter_turn() {
        assert_rgba_eq(clear_color(std::f64::consts::FRAC_PI_2), [1.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn clear_color_stays_in_unit_range() {
        for step in 0..1000 {
            let color = clear_color(f64::from(step) * 0.037);
            assert!(color.iter().all(|c| (0.0..=1.0).contains(c)), "{color:?}");
        }
    }

    #[test]
    fn offset_traces_ellipse() {
        assert_rgba_eq(triangle_offset(0.0), [0.0, 0.6, 0.0, 0.0]);
        assert_rgba_eq(
            triangle_offset(std::f64::consts::FRAC_PI_2),
            [0.5, 0.0, 0.0, 0.0],
        );
        for step in 0..100 {
            let [x, y, ..] = triangle_offset(f64::from(step) * 0.1);
            let on_ellipse = (x / 0.5).powi(2) + (y / 0.6).powi(2);
            assert!((on_ellipse - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn new_triangle_holds_no_gpu_state() {
        let triangle = Triangle::default();
        assert!(triangle.gpu.is_none());
    }
}
