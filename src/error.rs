//! # Error Types
//!
//! Every fallible operation in the engine returns [`Result`], whose error side is
//! [`RenderError`]. Variants fall into four families:
//!
//! - **Missing resources**: a shader, texture or buffer was referenced but is not
//!   available. Fatal to the single draw call that hit it.
//! - **Compile failures**: a GPU program failed to compile or link. Carries the
//!   backend's diagnostic log.
//! - **Decode failures**: asset bytes could not be turned into pixels. The texture
//!   stays unusable until the next context version.
//! - **Graph errors**: attaching a transform would create a follow cycle.
//!
//! Degenerate numeric input (zero aspect ratio, a ray parallel to the picking plane)
//! is never an error; those paths clamp or return `None`.

use thiserror::Error;

use crate::gfx::shader::ShaderId;
use crate::gfx::texture::TextureId;
use crate::math::TransformId;

/// Engine-wide error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("shader {0} not found")]
    ShaderNotFound(ShaderId),

    #[error("texture {0} not found")]
    TextureNotFound(TextureId),

    #[error("model '{model}' has no {attribute} buffer but its shader consumes one")]
    MissingBuffer {
        model: String,
        attribute: &'static str,
    },

    #[error("model '{model}' samples a texture but has none assigned")]
    MissingTexture { model: String },

    #[error("{0} was used before its CPU-side data was initialized")]
    ResourceNotInitialized(&'static str),

    #[error("cannot allocate a zero-sized buffer")]
    EmptyBuffer,

    #[error("GPU handle {0} is not valid in the current context")]
    InvalidHandle(String),

    #[error("failed to compile shader '{shader}': {log}")]
    CompileFailure { shader: String, log: String },

    #[error("failed to decode '{name}': {reason}")]
    DecodeFailure { name: String, reason: String },

    #[error("transform {0} would follow itself")]
    CyclicTransformGraph(TransformId),

    #[error("transform {0} does not exist")]
    UnknownTransform(TransformId),

    #[error("unsupported by the graphics backend: {0}")]
    Unsupported(String),

    #[error("graphics backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// True for errors that only affect the resource they were raised for
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            RenderError::ShaderNotFound(_)
                | RenderError::TextureNotFound(_)
                | RenderError::MissingBuffer { .. }
                | RenderError::MissingTexture { .. }
                | RenderError::InvalidHandle(_)
        )
    }
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_failure_carries_log() {
        let err = RenderError::CompileFailure {
            shader: "blur".to_string(),
            log: "error: expected ';'".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("blur"));
        assert!(message.contains("expected ';'"));
        assert!(!err.is_missing_resource());
    }

    #[test]
    fn test_missing_resource_family() {
        assert!(RenderError::ShaderNotFound(ShaderId(3)).is_missing_resource());
        assert!(RenderError::MissingBuffer {
            model: "card".into(),
            attribute: "normal",
        }
        .is_missing_resource());
        assert!(!RenderError::EmptyBuffer.is_missing_resource());
    }
}
