//! GLSL shader sources and compilation helpers.
//!
//! All shaders target GLSL 4.50 core, matching the 4.5 core-profile context
//! the harness requests by default.

use glow::HasContext;

use crate::error::{GlError, ShaderStage};

/// Vertex shader for the triangle demo.
///
/// Positions are hard-coded and indexed by `gl_VertexID`, so no vertex
/// buffer is bound. The offset and color come from generic vertex
/// attributes set with `glVertexAttrib4f` each frame.
///
/// | Location | Name     | Type   | Description                 |
/// |----------|----------|--------|-----------------------------|
/// | `0`      | `offset` | `vec4` | Added to every vertex       |
/// | `1`      | `color`  | `vec4` | Flat color for the triangle |
pub const TRIANGLE_VERTEX_SRC: &str = r"#version 450 core

layout (location = 0) in vec4 offset;
layout (location = 1) in vec4 color;

out VS_OUT
{
    vec4 color;
} vs_out;

void main(void)
{
    const vec4 vertices[3] = vec4[3](
        vec4( 0.25, -0.25, 0.5, 1.0),
        vec4(-0.25, -0.25, 0.5, 1.0),
        vec4( 0.25,  0.25, 0.5, 1.0)
    );

    gl_Position = vertices[gl_VertexID] + offset;
    vs_out.color = color;
}
";

/// Fragment shader for the triangle demo. Passes the interpolated color
/// straight through.
pub const TRIANGLE_FRAGMENT_SRC: &str = r"#version 450 core

in VS_OUT
{
    vec4 color;
} fs_in;

out vec4 color;

void main(void)
{
    color = fs_in.color;
}
";

/// Vertex shader for the cube demo.
///
/// # Uniforms
///
/// | Name          | Type   | Description                  |
/// |---------------|--------|------------------------------|
/// | `mv_matrix`   | `mat4` | Per-cube model-view matrix   |
/// | `proj_matrix` | `mat4` | Perspective projection       |
pub const CUBE_VERTEX_SRC: &str = r"#version 450 core

// Three components are supplied, w defaults to 1.
layout (location = 0) in vec4 position;

out VS_OUT
{
    vec4 color;
} vs_out;

uniform mat4 mv_matrix;
uniform mat4 proj_matrix;

void main(void)
{
    gl_Position = proj_matrix * mv_matrix * position;
    // Map the [-0.25, 0.25] cube to a [0, 1] color cube.
    vs_out.color = position * 2.0 + vec4(0.5, 0.5, 0.5, 0.0);
}
";

/// Fragment shader for the cube demo.
pub const CUBE_FRAGMENT_SRC: &str = r"#version 450 core

in VS_OUT
{
    vec4 color;
} fs_in;

out vec4 color;

void main(void)
{
    color = fs_in.color;
}
";

/// Vertex shader for instanced sprites.
///
/// Each instance supplies its center offset and half-size in NDC; the quad
/// corners are shared across instances.
///
/// | Location | Name         | Type   | Rate         |
/// |----------|--------------|--------|--------------|
/// | `0`      | `a_corner`   | `vec2` | per vertex   |
/// | `1`      | `a_uv`       | `vec2` | per vertex   |
/// | `2`      | `a_instance` | `vec3` | per instance |
///
/// # Uniforms
///
/// | Name       | Type    | Description                            |
/// |------------|---------|----------------------------------------|
/// | `u_aspect` | `float` | Viewport width / height, keeps squares |
pub const SPRITE_VERTEX_SRC: &str = r"#version 450 core

layout (location = 0) in vec2 a_corner;
layout (location = 1) in vec2 a_uv;
layout (location = 2) in vec3 a_instance;

uniform float u_aspect;

out vec2 v_uv;

void main(void)
{
    vec2 half_extent = vec2(a_instance.z / u_aspect, a_instance.z);
    gl_Position = vec4(a_instance.xy + a_corner * half_extent, 0.0, 1.0);
    v_uv = a_uv;
}
";

/// Fragment shader for instanced sprites. The texture is already
/// premultiplied, so the sample is written as-is.
pub const SPRITE_FRAGMENT_SRC: &str = r"#version 450 core

layout (binding = 0) uniform sampler2D u_sprite;

in vec2 v_uv;

out vec4 frag_color;

void main(void)
{
    frag_color = texture(u_sprite, v_uv);
}
";

/// Compile a shader program from vertex and fragment source strings.
///
/// The compiled shader objects are detached and deleted after successful
/// linking, so only the program handle needs to be cleaned up by the caller.
/// Compile and link logs are forwarded to the log at error level before the
/// error is returned.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`GlError::ShaderCompile`] with the driver's info log if either
/// stage fails to compile, or [`GlError::ProgramLink`] if linking fails.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, GlError> {
    let vs = unsafe { compile_shader(gl, ShaderStage::Vertex, vertex_src) }?;
    let fs = match unsafe { compile_shader(gl, ShaderStage::Fragment, fragment_src) } {
        Ok(fs) => fs,
        Err(err) => {
            unsafe { gl.delete_shader(vs) };
            return Err(err);
        }
    };

    unsafe {
        let program = match gl.create_program() {
            Ok(program) => program,
            Err(err) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(err.into());
            }
        };

        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let info = gl.get_program_info_log(program);
            log::error!("program link failed:\n{info}");
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(GlError::ProgramLink(info));
        }

        // The program keeps its own copy of the binaries.
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        Ok(program)
    }
}

/// Look up a uniform that the program is required to have.
///
/// # Safety
///
/// Requires a valid, current OpenGL context, and `program` must be a linked
/// program from that context.
///
/// # Errors
///
/// Returns [`GlError::MissingUniform`] when the driver reports no active
/// uniform under `name` (including when it was optimized away).
pub unsafe fn uniform_location(
    gl: &glow::Context,
    program: glow::Program,
    name: &'static str,
) -> Result<glow::UniformLocation, GlError> {
    unsafe { gl.get_uniform_location(program, name) }.ok_or(GlError::MissingUniform(name))
}

/// Compile a single shader stage from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, GlError> {
    unsafe {
        let shader = gl.create_shader(stage.gl_enum())?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let info = gl.get_shader_info_log(shader);
            log::error!("{stage} shader failed to compile:\n{info}");
            gl.delete_shader(shader);
            return Err(GlError::ShaderCompile { stage, log: info });
        }

        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SOURCES: [(&str, &str); 6] = [
        ("triangle vs", TRIANGLE_VERTEX_SRC),
        ("triangle fs", TRIANGLE_FRAGMENT_SRC),
        ("cube vs", CUBE_VERTEX_SRC),
        ("cube fs", CUBE_FRAGMENT_SRC),
        ("sprite vs", SPRITE_VERTEX_SRC),
        ("sprite fs", SPRITE_FRAGMENT_SRC),
    ];

    #[test]
    fn version_directive_is_first_line() {
        // Drivers reject sources where `#version` is not the first token.
        for (name, src) in ALL_SOURCES {
            assert!(
                src.starts_with("#version 450 core\n"),
                "{name} does not start with the version directive"
            );
        }
    }

    #[test]
    fn cube_shader_declares_matrix_uniforms() {
        assert!(CUBE_VERTEX_SRC.contains("uniform mat4 mv_matrix;"));
        assert!(CUBE_VERTEX_SRC.contains("uniform mat4 proj_matrix;"));
    }

    #[test]
    fn sprite_shader_declares_aspect_uniform() {
        assert!(SPRITE_VERTEX_SRC.contains("uniform float u_aspect;"));
    }
}
