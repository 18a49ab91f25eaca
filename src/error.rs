//! Error type shared by the shader, texture, and demo setup code.

use std::fmt;

/// Shader pipeline stage, used to label compile errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// `GL_VERTEX_SHADER`.
    Vertex,
    /// `GL_FRAGMENT_SHADER`.
    Fragment,
}

impl ShaderStage {
    /// The GL enum passed to `glCreateShader`.
    #[must_use]
    pub fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors raised while creating GL resources.
#[derive(Debug, thiserror::Error)]
pub enum GlError {
    /// A shader stage failed to compile. `log` is the driver's info log.
    #[error("{stage} shader compile error: {log}")]
    ShaderCompile {
        /// Which stage failed.
        stage: ShaderStage,
        /// Info log reported by the driver.
        log: String,
    },

    /// The program failed to link.
    #[error("program link error: {0}")]
    ProgramLink(String),

    /// A GL object (buffer, vertex array, texture, ...) could not be created.
    #[error("failed to create GL object: {0}")]
    Resource(String),

    /// A uniform the demo relies on is not active in the linked program.
    #[error("uniform `{0}` missing from program")]
    MissingUniform(&'static str),
}

impl From<String> for GlError {
    /// `glow` reports object-creation failures as bare strings.
    fn from(message: String) -> Self {
        Self::Resource(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_the_stage() {
        let err = GlError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "0:3(1): error: syntax error".into(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader compile error: 0:3(1): error: syntax error"
        );
    }

    #[test]
    fn glow_string_errors_become_resource_errors() {
        let err: GlError = String::from("out of memory").into();
        assert!(matches!(err, GlError::Resource(ref m) if m == "out of memory"));
        assert_eq!(err.to_string(), "failed to create GL object: out of memory");
    }

    #[test]
    fn stage_maps_to_gl_enum() {
        assert_eq!(ShaderStage::Vertex.gl_enum(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Fragment.gl_enum(), glow::FRAGMENT_SHADER);
    }

    #[test]
    fn missing_uniform_message() {
        assert_eq!(
            GlError::MissingUniform("mv_matrix").to_string(),
            "uniform `mv_matrix` missing from program"
        );
    }
}
