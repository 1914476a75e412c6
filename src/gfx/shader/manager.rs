use log::warn;

use crate::error::{RenderError, Result};
use crate::gfx::resources::{GpuContext, Registry};
use crate::gfx::shader::{BuiltinShader, ShaderId, ShaderProgram};

/// Registry of shader programs plus the id of the one in use
#[derive(Debug, Default)]
pub struct ShaderManager {
    programs: Registry<ShaderProgram>,
    current: Option<ShaderId>,
}

impl ShaderManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a built-in under its ordinal. Adding it twice is a no-op.
    pub fn add_builtin(&mut self, shader: BuiltinShader) -> ShaderId {
        ShaderId(self.programs.insert_builtin(shader.id().0, || shader.create()))
    }

    /// Registers every built-in
    pub fn add_builtins(&mut self) {
        for shader in BuiltinShader::ALL {
            self.add_builtin(shader);
        }
    }

    /// Registers a program under `name`.
    ///
    /// If the name is taken, the existing id is returned and `program` is dropped.
    pub fn add(&mut self, name: &str, program: ShaderProgram) -> ShaderId {
        ShaderId(self.programs.register(name, || program))
    }

    pub fn get(&self, id: ShaderId) -> Option<&ShaderProgram> {
        self.programs.get(id.0)
    }

    pub fn get_mut(&mut self, id: ShaderId) -> Option<&mut ShaderProgram> {
        self.programs.get_mut(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<ShaderId> {
        self.programs.id_of(name).map(ShaderId)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Id of the shader selected last, `None` after a reset
    pub fn current(&self) -> Option<ShaderId> {
        self.current
    }

    pub fn reset_current(&mut self) {
        self.current = None;
    }

    /// Compiles every registered program for the current context version.
    ///
    /// All programs are attempted; the first failure is returned.
    pub fn compile_all(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        let mut first_error = None;
        for (_, program) in self.programs.iter_mut() {
            if let Err(err) = program.compile(gpu) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Compiles the program if needed and makes it current
    pub fn use_shader(&mut self, gpu: &mut GpuContext<'_>, id: ShaderId) -> Result<()> {
        let Some(program) = self.programs.get_mut(id.0) else {
            warn!("Shader {} not found", id);
            return Err(RenderError::ShaderNotFound(id));
        };
        program.use_program(gpu)?;
        self.current = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use crate::gfx::resources::DYNAMIC_ID_BASE;
    use crate::gfx::shader::ShaderKind;
    use crate::gfx::texture::MemoryAssets;

    #[test]
    fn test_builtin_and_named_ids_do_not_collide() {
        let mut shaders = ShaderManager::new();
        shaders.add_builtins();
        let named = shaders.add("glow", ShaderProgram::new(ShaderKind::Blur));
        let again = shaders.add("glow", ShaderProgram::new(ShaderKind::DefaultColor));

        assert_eq!(named, ShaderId(DYNAMIC_ID_BASE));
        assert_eq!(again, named);
        assert_eq!(shaders.get(named).and_then(|p| p.kind()), Some(ShaderKind::Blur));
        assert_eq!(shaders.len(), 6);
        assert_eq!(shaders.id_of("glow"), Some(named));
    }

    #[test]
    fn test_use_unknown_shader_fails() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut shaders = ShaderManager::new();
        let mut gpu = GpuContext::new(&mut backend, &assets, 1);

        assert_eq!(
            shaders.use_shader(&mut gpu, ShaderId(42)),
            Err(RenderError::ShaderNotFound(ShaderId(42)))
        );
        assert_eq!(shaders.current(), None);
    }

    #[test]
    fn test_use_tracks_current_and_recompiles_after_bump() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut shaders = ShaderManager::new();
        let id = shaders.add_builtin(BuiltinShader::DefaultColor);

        {
            let mut gpu = GpuContext::new(&mut backend, &assets, 1);
            shaders.use_shader(&mut gpu, id).unwrap();
            shaders.use_shader(&mut gpu, id).unwrap();
        }
        assert_eq!(shaders.current(), Some(id));
        assert_eq!(backend.programs_compiled(), 1);

        backend.lose_context();
        shaders.reset_current();
        let mut gpu = GpuContext::new(&mut backend, &assets, 2);
        shaders.use_shader(&mut gpu, id).unwrap();
        assert_eq!(backend.programs_compiled(), 2);
    }

    #[test]
    fn test_compile_all_reports_first_failure_but_compiles_the_rest() {
        let mut backend = RecordingBackend::new();
        backend.fail_compilation_of("default_texture", "bad sampler");
        let assets = MemoryAssets::new();
        let mut shaders = ShaderManager::new();
        shaders.add_builtins();

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        let err = shaders.compile_all(&mut gpu).unwrap_err();
        assert!(matches!(err, RenderError::CompileFailure { ref shader, .. } if shader == "default_texture"));
        assert_eq!(backend.programs_compiled(), 4);
    }
}
