//! Vertex layouts uploaded to GPU buffers.
//!
//! Every type here is `#[repr(C)]` and [`Pod`], so slices of them can be
//! handed to `glBufferData` through [`bytemuck::cast_slice`].

use bytemuck::{Pod, Zeroable};

/// A cube corner position in model space.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct CubeVertex {
    /// Model-space position; `w` is supplied as 1 by the attribute fetch.
    pub position: [f32; 3],
}

/// A corner of the shared sprite quad.
///
/// `corner` spans `[-1, 1]` and is scaled by each instance's size; `uv`
/// spans `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SpriteVertex {
    /// Quad corner in `[-1, 1]`.
    pub corner: [f32; 2],
    /// Texture coordinate in `[0, 1]`.
    pub uv: [f32; 2],
}

/// Per-instance sprite data, read with an attribute divisor of 1.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SpriteInstance {
    /// Sprite center in NDC.
    pub offset: [f32; 2],
    /// Half-extent in NDC (vertical; horizontal is divided by aspect).
    pub size: f32,
}

/// Byte stride of `T` as the `i32` that `glVertexAttribPointer` expects.
///
/// # Panics
///
/// Panics if `T` is larger than `i32::MAX` bytes, which no vertex type is.
#[must_use]
pub fn stride_of<T>() -> i32 {
    i32::try_from(std::mem::size_of::<T>()).expect("vertex stride exceeds i32::MAX")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_have_no_padding() {
        assert_eq!(std::mem::size_of::<CubeVertex>(), 12);
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 16);
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 12);
    }

    #[test]
    fn stride_matches_size() {
        assert_eq!(stride_of::<SpriteVertex>(), 16);
        assert_eq!(stride_of::<SpriteInstance>(), 12);
    }

    #[test]
    fn instance_slice_casts_to_packed_floats() {
        let instances = [
            SpriteInstance {
                offset: [0.5, -0.5],
                size: 0.05,
            },
            SpriteInstance {
                offset: [1.0, 2.0],
                size: 3.0,
            },
        ];
        let floats: &[f32] = bytemuck::cast_slice(&instances);
        assert_eq!(floats, &[0.5, -0.5, 0.05, 1.0, 2.0, 3.0]);
    }
}
