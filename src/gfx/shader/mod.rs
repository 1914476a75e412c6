//! # Shaders
//!
//! Program variants ([`ShaderKind`]), the lazily compiled [`ShaderProgram`] and the
//! [`ShaderManager`] registry. Program text is WGSL under `wgsl/`; every variant
//! shares the uniform block in `wgsl/common.wgsl`.
//!
//! ```rust
//! use glade::gfx::shader::{BuiltinShader, ShaderManager};
//!
//! let mut shaders = ShaderManager::new();
//! let id = shaders.add_builtin(BuiltinShader::DefaultTexture);
//! assert_eq!(id, BuiltinShader::DefaultTexture.id());
//! ```

pub mod manager;
pub mod program;
pub mod source;

use std::fmt;

pub use manager::ShaderManager;
pub use program::{
    AlphaHandling, AlphaTarget, AttributeLocations, BuiltinShader, ShaderKind, ShaderProgram,
    ShaderVariables, SourceAlpha,
};
pub use source::ShaderSource;

/// Registry id of a shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader #{}", self.0)
    }
}
