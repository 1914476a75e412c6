use log::warn;

use crate::error::{RenderError, Result};
use crate::gfx::backend::GraphicsBackend;
use crate::gfx::resources::{GpuContext, Registry};
use crate::gfx::texture::{GpuTexture, TextureId};

/// Registry of textures plus the one currently bound
#[derive(Debug, Default)]
pub struct TextureManager {
    textures: Registry<Box<dyn GpuTexture>>,
    current: Option<TextureId>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a texture without a name
    pub fn add(&mut self, texture: impl GpuTexture + 'static) -> TextureId {
        TextureId(self.textures.insert_anonymous(Box::new(texture)))
    }

    /// Adds a texture under `name`; a known name returns its existing id
    pub fn register(&mut self, name: &str, texture: impl GpuTexture + 'static) -> TextureId {
        TextureId(self.textures.register(name, || Box::new(texture) as Box<dyn GpuTexture>))
    }

    pub fn get(&self, id: TextureId) -> Option<&dyn GpuTexture> {
        self.textures.get(id.0).map(|t| t.as_ref())
    }

    pub fn id_of(&self, name: &str) -> Option<TextureId> {
        self.textures.id_of(name).map(TextureId)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture bound last, `None` when nothing is bound
    pub fn current(&self) -> Option<TextureId> {
        self.current
    }

    /// Uploads every texture for the current context version
    pub fn create_all(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        let mut first_error = None;
        for (_, texture) in self.textures.iter_mut() {
            if let Err(err) = texture.create(gpu) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Uploads if needed and binds starting at unit 0
    pub fn bind(&mut self, gpu: &mut GpuContext<'_>, id: TextureId) -> Result<()> {
        let Some(texture) = self.textures.get_mut(id.0) else {
            warn!("Texture {} not found", id);
            return Err(RenderError::TextureNotFound(id));
        };
        texture.bind(gpu, 0)?;
        self.current = Some(id);
        Ok(())
    }

    /// Unbinds whatever is bound; does nothing if nothing is
    pub fn unbind_current(&mut self, backend: &mut dyn GraphicsBackend) {
        let Some(id) = self.current.take() else {
            return;
        };
        if let Some(texture) = self.textures.get(id.0) {
            texture.unbind(backend, 0);
        }
    }

    /// Forgets the current binding without touching the backend, for a fresh context
    pub fn reset_current(&mut self) {
        self.current = None;
    }
}
