//! Spinning cubes.
//!
//! One static vertex buffer holds a cube; each frame draws it [`CUBE_COUNT`]
//! times with a different model-view matrix, under a perspective projection
//! recomputed on resize. Press `M` to switch between one and many cubes.

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::app::{AppConfig, Application};
use crate::error::GlError;
use crate::input::{Action, Key};
use crate::shaders;
use crate::types::{stride_of, CubeVertex};

/// Number of cubes drawn in "many cubes" mode.
pub const CUBE_COUNT: usize = 24;

/// Vertical field of view of the projection, in degrees.
pub const FOV_Y_DEGREES: f32 = 50.0;

/// Near clip plane distance.
pub const Z_NEAR: f32 = 0.1;

/// Far clip plane distance.
pub const Z_FAR: f32 = 1000.0;

/// Clear color: dark green.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.25, 0.0, 1.0];

const fn v(x: f32, y: f32, z: f32) -> CubeVertex {
    CubeVertex { position: [x, y, z] }
}

/// Twelve triangles of a cube with half-extent 0.25, two per face.
pub const CUBE_VERTICES: [CubeVertex; 36] = [
    v(-0.25, 0.25, -0.25), v(-0.25, -0.25, -0.25), v(0.25, -0.25, -0.25),
    v(0.25, -0.25, -0.25), v(0.25, 0.25, -0.25), v(-0.25, 0.25, -0.25),

    v(0.25, -0.25, -0.25), v(0.25, -0.25, 0.25), v(0.25, 0.25, -0.25),
    v(0.25, -0.25, 0.25), v(0.25, 0.25, 0.25), v(0.25, 0.25, -0.25),

    v(0.25, -0.25, 0.25), v(-0.25, -0.25, 0.25), v(0.25, 0.25, 0.25),
    v(-0.25, -0.25, 0.25), v(-0.25, 0.25, 0.25), v(0.25, 0.25, 0.25),

    v(-0.25, -0.25, 0.25), v(-0.25, -0.25, -0.25), v(-0.25, 0.25, 0.25),
    v(-0.25, -0.25, -0.25), v(-0.25, 0.25, -0.25), v(-0.25, 0.25, 0.25),

    v(-0.25, -0.25, 0.25), v(0.25, -0.25, 0.25), v(0.25, -0.25, -0.25),
    v(0.25, -0.25, -0.25), v(-0.25, -0.25, -0.25), v(-0.25, -0.25, 0.25),

    v(-0.25, 0.25, -0.25), v(0.25, 0.25, -0.25), v(0.25, 0.25, 0.25),
    v(0.25, 0.25, 0.25), v(-0.25, 0.25, 0.25), v(-0.25, 0.25, -0.25),
];

/// Projection for a viewport with the given aspect ratio.
#[must_use]
pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
}

/// Model-view matrix of cube `index` at `time` seconds.
///
/// All cubes share a camera orbit (pushed 6 units back, spinning about Y at
/// 45°/s and about X at 21°/s); each one follows its own Lissajous path
/// phase-shifted by its index.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn model_view(index: usize, time: f64) -> Mat4 {
    let t = time as f32;
    let f = index as f32 + t * 0.3;

    Mat4::from_translation(Vec3::new(0.0, 0.0, -6.0))
        * Mat4::from_rotation_y((t * 45.0).to_radians())
        * Mat4::from_rotation_x((t * 21.0).to_radians())
        * Mat4::from_translation(Vec3::new(
            (2.1 * f).sin() * 2.0,
            (1.7 * f).cos() * 2.0,
            (1.3 * f).sin() * (1.5 * f).cos() * 2.0,
        ))
}

struct Gpu {
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    mv_location: glow::UniformLocation,
    proj_location: glow::UniformLocation,
}

/// The spinning-cube demo.
pub struct SpinningCube {
    gpu: Option<Gpu>,
    proj: Mat4,
    many_cubes: bool,
}

impl Default for SpinningCube {
    fn default() -> Self {
        Self {
            gpu: None,
            proj: projection(AppConfig::default().aspect_ratio()),
            many_cubes: true,
        }
    }
}

impl SpinningCube {
    /// How many cubes the next frame will draw.
    #[must_use]
    pub fn cube_count(&self) -> usize {
        if self.many_cubes {
            CUBE_COUNT
        } else {
            1
        }
    }

    unsafe fn create_gpu(gl: &glow::Context, program: glow::Program) -> Result<Gpu, GlError> {
        unsafe {
            let mv_location = shaders::uniform_location(gl, program, "mv_matrix")?;
            let proj_location = shaders::uniform_location(gl, program, "proj_matrix")?;

            let vao = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vao));

            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(err) => {
                    gl.delete_vertex_array(vao);
                    return Err(err.into());
                }
            };
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&CUBE_VERTICES),
                glow::STATIC_DRAW,
            );

            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride_of::<CubeVertex>(), 0);
            gl.enable_vertex_attrib_array(0);
            gl.bind_vertex_array(None);

            Ok(Gpu {
                program,
                vao,
                vbo,
                mv_location,
                proj_location,
            })
        }
    }
}

impl Application for SpinningCube {
    fn init(&mut self, config: &mut AppConfig) {
        config.title = "Spinning Cube".to_string();
        self.proj = projection(config.aspect_ratio());
    }

    fn startup(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        unsafe {
            let program =
                shaders::compile_program(gl, shaders::CUBE_VERTEX_SRC, shaders::CUBE_FRAGMENT_SRC)?;
            match Self::create_gpu(gl, program) {
                Ok(gpu) => self.gpu = Some(gpu),
                Err(err) => {
                    gl.delete_program(program);
                    return Err(err);
                }
            }

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
        }
        log::info!("press M to toggle between one and {CUBE_COUNT} cubes");
        Ok(())
    }

    fn render(&mut self, gl: &glow::Context, current_time: f64) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let [r, g, b, a] = CLEAR_COLOR;

        unsafe {
            gl.clear_color(r, g, b, a);
            gl.clear_depth_f32(1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.use_program(Some(gpu.program));
            gl.bind_vertex_array(Some(gpu.vao));
            gl.uniform_matrix_4_f32_slice(
                Some(&gpu.proj_location),
                false,
                &self.proj.to_cols_array(),
            );

            for index in 0..self.cube_count() {
                let mv = model_view(index, current_time);
                gl.uniform_matrix_4_f32_slice(Some(&gpu.mv_location), false, &mv.to_cols_array());
                gl.draw_arrays(glow::TRIANGLES, 0, 36);
            }
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        self.proj = projection(aspect);
        unsafe { gl.viewport(0, 0, super::gl_size(width), super::gl_size(height)) };
    }

    fn on_key(&mut self, key: Key, action: Action) {
        if key == Key::M && action == Action::Press {
            self.many_cubes = !self.many_cubes;
            log::debug!("drawing {} cube(s)", self.cube_count());
        }
    }

    fn shutdown(&mut self, gl: &glow::Context) {
        if let Some(gpu) = self.gpu.take() {
            unsafe {
                gl.bind_vertex_array(None);
                gl.delete_program(gpu.program);
                gl.delete_vertex_array(gpu.vao);
                gl.delete_buffer(gpu.vbo);
            }
        }
    }
}
