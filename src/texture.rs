//! Procedural sprite image and RGBA texture upload.

use glow::{HasContext, PixelUnpackData};
use image::{Rgba, RgbaImage};

use crate::error::GlError;

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// Convert a `u32` to `i32` for GL API calls.
///
/// # Panics
///
/// Panics if `value > i32::MAX`, which is unreachable for real image sizes.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).expect("dimension exceeds i32::MAX")
}

/// Build a `size` x `size` soft round sprite.
///
/// Intensity falls off smoothly from 1 at the center to 0 at the inscribed
/// circle's edge; pixels outside the circle are fully transparent. Color is
/// premultiplied by alpha, with a slight blue tint.
#[must_use]
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sprite_image(size: u32) -> RgbaImage {
    let half = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        // Sample at pixel centers.
        let dx = (x as f32 + 0.5 - half) / half;
        let dy = (y as f32 + 0.5 - half) / half;
        let r = (dx * dx + dy * dy).sqrt();

        let falloff = (1.0 - r).clamp(0.0, 1.0);
        let alpha = falloff * falloff * (3.0 - 2.0 * falloff);

        let channel = |c: f32| (c * alpha * 255.0).round() as u8;
        Rgba([channel(0.85), channel(0.9), channel(1.0), channel(1.0)])
    })
}

/// Upload an RGBA image as a mipmapped 2D texture.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`GlError::Resource`] if the texture object cannot be created.
pub unsafe fn upload_rgba(gl: &glow::Context, image: &RgbaImage) -> Result<glow::Texture, GlError> {
    let (width, height) = image.dimensions();

    unsafe {
        let texture = gl.create_texture()?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            RGBA8_INTERNAL_FORMAT,
            gl_size(width),
            gl_size(height),
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            PixelUnpackData::Slice(Some(image.as_raw())),
        );
        set_sprite_tex_params(gl);
        gl.generate_mipmap(glow::TEXTURE_2D);
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}

/// Trilinear filtering, clamped at the edges.
unsafe fn set_sprite_tex_params(gl: &glow::Context) {
    // GL constant values are small enough that the cast is always safe.
    #[expect(clippy::cast_possible_wrap)]
    unsafe {
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR_MIPMAP_LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_has_requested_dimensions() {
        let img = sprite_image(32);
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(img.as_raw().len(), 32 * 32 * 4);
    }

    #[test]
    fn center_is_opaque_and_corners_transparent() {
        let img = sprite_image(64);
        let center = img.get_pixel(32, 32);
        assert!(center[3] > 240, "center alpha {}", center[3]);
        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert_eq!(img.get_pixel(x, y)[3], 0, "corner ({x}, {y})");
        }
    }

    #[test]
    fn color_is_premultiplied() {
        let img = sprite_image(64);
        for pixel in img.pixels() {
            let [r, g, b, a] = pixel.0;
            assert!(r <= a && g <= a && b <= a, "{:?}", pixel.0);
        }
    }

    #[test]
    fn alpha_falls_off_from_center() {
        let img = sprite_image(64);
        let row: Vec<u8> = (32..64).map(|x| img.get_pixel(x, 32)[3]).collect();
        assert!(row.windows(2).all(|w| w[0] >= w[1]), "{row:?}");
    }
}
