//! Instanced sprites drifting down the screen.
//!
//! A single textured quad is drawn [`SPRITE_COUNT`] times with one
//! `glDrawArraysInstanced` call. Per-sprite offset and size live in an
//! instance buffer that is refreshed every frame from a [`SpriteField`],
//! whose fall speeds are chosen at random on startup.

use std::ops::RangeInclusive;

use glow::HasContext;
use rand::Rng;

use crate::app::{AppConfig, Application};
use crate::clock::MAX_FRAME_DELTA;
use crate::error::GlError;
use crate::input::{Action, Key};
use crate::shaders;
use crate::texture;
use crate::types::{stride_of, SpriteInstance, SpriteVertex};

/// Number of sprites in the field.
pub const SPRITE_COUNT: usize = 512;

/// Fall speed range in NDC units per second.
pub const SPEED_RANGE: RangeInclusive<f32> = 0.1..=0.5;

/// Half-extent range in NDC units.
pub const SIZE_RANGE: RangeInclusive<f32> = 0.02..=0.08;

/// Edge length of the generated sprite texture, in pixels.
pub const TEXTURE_SIZE: u32 = 64;

/// Clear color: near-black blue.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.1, 1.0];

/// The shared quad, drawn as a triangle strip.
pub const QUAD: [SpriteVertex; 4] = [
    SpriteVertex { corner: [-1.0, -1.0], uv: [0.0, 0.0] },
    SpriteVertex { corner: [1.0, -1.0], uv: [1.0, 0.0] },
    SpriteVertex { corner: [-1.0, 1.0], uv: [0.0, 1.0] },
    SpriteVertex { corner: [1.0, 1.0], uv: [1.0, 1.0] },
];

/// Sprite positions plus the per-sprite speed that animates them.
///
/// `instances` is kept in GPU layout so it can be uploaded without a copy;
/// `speeds[i]` belongs to `instances[i]`.
#[derive(Debug, Clone)]
pub struct SpriteField {
    instances: Vec<SpriteInstance>,
    speeds: Vec<f32>,
}

impl SpriteField {
    /// Scatter `count` sprites uniformly over `[-1, 1]²` with random speed
    /// and size.
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let mut instances = Vec::with_capacity(count);
        let mut speeds = Vec::with_capacity(count);
        for _ in 0..count {
            instances.push(SpriteInstance {
                offset: [rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)],
                size: rng.random_range(SIZE_RANGE),
            });
            speeds.push(rng.random_range(SPEED_RANGE));
        }
        Self { instances, speeds }
    }

    /// Move every sprite down by its speed times `dt` seconds. A sprite
    /// that has fully left the bottom edge re-enters just above the top.
    pub fn update(&mut self, dt: f32) {
        for (sprite, speed) in self.instances.iter_mut().zip(&self.speeds) {
            sprite.offset[1] -= speed * dt;
            if sprite.offset[1] < -1.0 - sprite.size {
                sprite.offset[1] = 1.0 + sprite.size;
            }
        }
    }

    /// Current instance data, in upload order.
    #[must_use]
    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    /// Fall speed of each sprite, parallel to [`instances`](Self::instances).
    #[must_use]
    pub fn speeds(&self) -> &[f32] {
        &self.speeds
    }

    /// Number of sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the field has no sprites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Seconds to advance the field for a frame at `current_time`, given the
/// previous frame's time (if any). Never negative, never above
/// [`MAX_FRAME_DELTA`].
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn frame_delta(previous: Option<f64>, current_time: f64) -> f32 {
    let Some(previous) = previous else {
        return 0.0;
    };
    (current_time - previous).clamp(0.0, MAX_FRAME_DELTA.as_secs_f64()) as f32
}

struct Gpu {
    program: glow::Program,
    vao: glow::VertexArray,
    quad_vbo: glow::Buffer,
    instance_vbo: glow::Buffer,
    texture: glow::Texture,
    aspect_location: glow::UniformLocation,
}

/// The instanced-sprite demo.
pub struct Sprites {
    gpu: Option<Gpu>,
    field: SpriteField,
    aspect: f32,
    last_time: Option<f64>,
    paused: bool,
}

impl Default for Sprites {
    fn default() -> Self {
        Self {
            gpu: None,
            field: SpriteField::new(SPRITE_COUNT, &mut rand::rng()),
            aspect: AppConfig::default().aspect_ratio(),
            last_time: None,
            paused: false,
        }
    }
}

impl Sprites {
    /// Whether the animation is currently frozen.
    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    unsafe fn create_gpu(
        gl: &glow::Context,
        program: glow::Program,
        field: &SpriteField,
    ) -> Result<Gpu, GlError> {
        unsafe {
            let aspect_location = shaders::uniform_location(gl, program, "u_aspect")?;

            let vao = gl.create_vertex_array()?;
            let quad_vbo = gl.create_buffer()?;
            let instance_vbo = gl.create_buffer()?;
            let texture = texture::upload_rgba(gl, &texture::sprite_image(TEXTURE_SIZE))?;

            gl.bind_vertex_array(Some(vao));

            // Per-vertex quad corners and UVs.
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(quad_vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&QUAD),
                glow::STATIC_DRAW,
            );
            let quad_stride = stride_of::<SpriteVertex>();
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, quad_stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, quad_stride, 8);
            gl.enable_vertex_attrib_array(1);

            // Per-instance offset and size, sized once and refilled each frame.
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(instance_vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(field.instances()),
                glow::DYNAMIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride_of::<SpriteInstance>(), 0);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_divisor(2, 1);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Gpu {
                program,
                vao,
                quad_vbo,
                instance_vbo,
                texture,
                aspect_location,
            })
        }
    }
}

impl Application for Sprites {
    fn init(&mut self, config: &mut AppConfig) {
        config.title = "Instanced Sprites".to_string();
        self.aspect = config.aspect_ratio();
    }

    fn startup(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        unsafe {
            let program = shaders::compile_program(
                gl,
                shaders::SPRITE_VERTEX_SRC,
                shaders::SPRITE_FRAGMENT_SRC,
            )?;
            match Self::create_gpu(gl, program, &self.field) {
                Ok(gpu) => self.gpu = Some(gpu),
                Err(err) => {
                    gl.delete_program(program);
                    return Err(err);
                }
            }

            // The sprite texture is premultiplied.
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);
        }
        log::info!("{} sprites, press Space to pause", self.field.len());
        Ok(())
    }

    fn render(&mut self, gl: &glow::Context, current_time: f64) {
        let dt = frame_delta(self.last_time, current_time);
        self.last_time = Some(current_time);
        if !self.paused {
            self.field.update(dt);
        }

        let Some(gpu) = &self.gpu else {
            return;
        };
        let [r, g, b, a] = CLEAR_COLOR;
        let count = i32::try_from(self.field.len()).unwrap_or(i32::MAX);

        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(gpu.instance_vbo));
            gl.buffer_sub_data_u8_slice(
                glow::ARRAY_BUFFER,
                0,
                bytemuck::cast_slice(self.field.instances()),
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT);

            gl.use_program(Some(gpu.program));
            gl.uniform_1_f32(Some(&gpu.aspect_location), self.aspect);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(gpu.texture));
            gl.bind_vertex_array(Some(gpu.vao));

            gl.draw_arrays_instanced(glow::TRIANGLE_STRIP, 0, 4, count);

            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
        unsafe { gl.viewport(0, 0, super::gl_size(width), super::gl_size(height)) };
    }

    fn on_key(&mut self, key: Key, action: Action) {
        if key == Key::Space && action == Action::Press {
            self.paused = !self.paused;
            log::debug!("animation {}", if self.paused { "paused" } else { "resumed" });
        }
    }

    fn shutdown(&mut self, gl: &glow::Context) {
        if let Some(gpu) = self.gpu.take() {
            unsafe {
                gl.disable(glow::BLEND);
                gl.delete_program(gpu.program);
                gl.delete_vertex_array(gpu.vao);
                gl.delete_buffer(gpu.quad_vbo);
                gl.delete_buffer(gpu.instance_vbo);
                gl.delete_texture(gpu.texture);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_field(count: usize) -> SpriteField {
        SpriteField::new(count, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn field_parameters_are_in_range() {
        let field = seeded_field(SPRITE_COUNT);
        assert_eq!(field.len(), SPRITE_COUNT);
        assert_eq!(field.speeds().len(), SPRITE_COUNT);
        for (sprite, speed) in field.instances().iter().zip(field.speeds()) {
            assert!(sprite.offset.iter().all(|c| (-1.0..=1.0).contains(c)));
            assert!(SIZE_RANGE.contains(&sprite.size));
            assert!(SPEED_RANGE.contains(speed));
        }
    }

    #[test]
    fn same_seed_same_field() {
        assert_eq!(seeded_field(16).instances(), seeded_field(16).instances());
    }

    #[test]
    fn update_moves_each_sprite_by_its_own_speed() {
        let mut field = seeded_field(32);
        let before = field.instances().to_vec();
        field.update(0.1);
        for ((old, new), speed) in before.iter().zip(field.instances()).zip(field.speeds()) {
            assert!((old.offset[0] - new.offset[0]).abs() < f32::EPSILON);
            let fell = old.offset[1] - new.offset[1];
            // No sprite can wrap in 0.1s: the largest drop is 0.05.
            assert!((fell - speed * 0.1).abs() < 1e-6, "fell {fell}, speed {speed}");
        }
    }

    #[test]
    fn sprite_wraps_to_the_top_and_keeps_x() {
        let mut field = SpriteField {
            instances: vec![SpriteInstance {
                offset: [0.3, -1.04],
                size: 0.05,
            }],
            speeds: vec![0.5],
        };
        field.update(0.1);
        let sprite = field.instances()[0];
        assert!((sprite.offset[0] - 0.3).abs() < f32::EPSILON);
        assert!((sprite.offset[1] - 1.05).abs() < 1e-6);
    }

    #[test]
    fn sprite_partially_visible_at_bottom_does_not_wrap() {
        let mut field = SpriteField {
            instances: vec![SpriteInstance {
                offset: [0.0, -1.0],
                size: 0.08,
            }],
            speeds: vec![0.1],
        };
        field.update(0.1);
        assert!((field.instances()[0].offset[1] + 1.01).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_leaves_field_unchanged() {
        let mut field = seeded_field(8);
        let before = field.instances().to_vec();
        field.update(0.0);
        assert_eq!(field.instances(), before.as_slice());
    }

    #[test]
    fn empty_field() {
        let mut field = seeded_field(0);
        assert!(field.is_empty());
        field.update(1.0);
        assert!(field.instances().is_empty());
    }

    #[test]
    fn frame_delta_first_frame_is_zero() {
        assert!(frame_delta(None, 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn frame_delta_is_clamped() {
        assert!((frame_delta(Some(1.0), 1.016) - 0.016).abs() < 1e-6);
        assert!((frame_delta(Some(1.0), 9.0) - 0.25).abs() < f32::EPSILON);
        assert!(frame_delta(Some(2.0), 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn quad_covers_unit_square_uvs() {
        for vertex in &QUAD {
            for (corner, uv) in vertex.corner.iter().zip(vertex.uv) {
                assert!((corner * 0.5 + 0.5 - uv).abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn space_toggles_pause() {
        let mut demo = Sprites::default();
        assert!(!demo.paused());
        demo.on_key(Key::Space, Action::Press);
        assert!(demo.paused());
        demo.on_key(Key::Space, Action::Release);
        assert!(demo.paused());
        demo.on_key(Key::Space, Action::Press);
        assert!(!demo.paused());
    }
}
