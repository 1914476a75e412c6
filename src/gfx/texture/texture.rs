use std::fmt;

use log::{debug, warn};

use crate::error::{RenderError, Result};
use crate::gfx::backend::{GraphicsBackend, TextureFormat, TextureHandle, TextureUpload, TextureWrap};
use crate::gfx::resources::{GpuContext, VersionStamp, VersionedResource};
use crate::gfx::texture::loader::DecodedImage;
use crate::gfx::texture::pkm;

/// Anything the texture manager can bind
pub trait GpuTexture: fmt::Debug {
    fn name(&self) -> &str;

    /// Makes sure the GPU copy exists for the current context version
    fn create(&mut self, gpu: &mut GpuContext<'_>) -> Result<()>;

    /// Creates if needed and binds starting at texture unit `unit`
    fn bind(&mut self, gpu: &mut GpuContext<'_>, unit: u32) -> Result<()>;

    fn unbind(&self, backend: &mut dyn GraphicsBackend, unit: u32);

    /// Number of consecutive units [`bind`](Self::bind) occupies
    fn unit_count(&self) -> u32 {
        1
    }
}

/// Where a texture's pixels come from
#[derive(Debug, Clone)]
pub enum PixelSource {
    /// Image asset decoded through the asset loader
    Asset(String),
    /// Pixels kept in memory for the texture's whole life
    Pixels(DecodedImage),
}

/// Loading state shared by the single-image texture types
#[derive(Debug, Default)]
struct TextureSlot {
    handle: Option<TextureHandle>,
    stamp: VersionStamp,
    size: Option<(u32, u32)>,
    error: Option<RenderError>,
}

/// Clones start unloaded so no two textures own the same handle
impl Clone for TextureSlot {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl TextureSlot {
    /// Deletes the handle if it belongs to the current context
    fn release(&mut self, gpu: &mut GpuContext<'_>) {
        if let Some(handle) = self.handle.take() {
            if self.stamp.is_current(gpu.version) {
                gpu.backend.delete_texture(handle);
            }
        }
    }

    /// Stores the outcome of an upload. A failure leaves the texture unusable
    /// until the next context version and is not propagated.
    fn settle(&mut self, name: &str, outcome: Result<(TextureHandle, u32, u32)>) {
        match outcome {
            Ok((handle, width, height)) => {
                self.handle = Some(handle);
                self.size = Some((width, height));
                self.error = None;
            }
            Err(err) => {
                warn!("Texture '{}' is unusable: {}", name, err);
                self.handle = None;
                self.size = None;
                self.error = Some(err);
            }
        }
    }
}

/// RGBA texture decoded from an image
#[derive(Debug, Clone)]
pub struct Texture {
    name: String,
    source: PixelSource,
    mipmaps: bool,
    wrap: TextureWrap,
    sample_size: u32,
    slot: TextureSlot,
}

impl Texture {
    /// Texture whose pixels come from the image asset `asset`
    pub fn new(asset: impl Into<String>) -> Self {
        let asset = asset.into();
        Self::with_source(asset.clone(), PixelSource::Asset(asset))
    }

    /// Texture over pixels already in memory
    pub fn from_image(name: impl Into<String>, image: DecodedImage) -> Self {
        Self::with_source(name.into(), PixelSource::Pixels(image))
    }

    fn with_source(name: String, source: PixelSource) -> Self {
        Self {
            name,
            source,
            mipmaps: true,
            wrap: TextureWrap::ClampToEdge,
            sample_size: 1,
            slot: TextureSlot::default(),
        }
    }

    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    pub fn with_repeat(mut self, repeating: bool) -> Self {
        self.wrap = if repeating {
            TextureWrap::Repeat
        } else {
            TextureWrap::ClampToEdge
        };
        self
    }

    /// Decode at `1 / sample_size` of the original resolution
    pub fn with_sample_size(mut self, sample_size: u32) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    pub fn handle(&self) -> Option<TextureHandle> {
        self.slot.handle
    }

    /// Uploaded size, `None` until a successful upload
    pub fn size(&self) -> Option<(u32, u32)> {
        self.slot.size
    }

    /// Why the last upload failed
    pub fn error(&self) -> Option<&RenderError> {
        self.slot.error.as_ref()
    }

    fn upload(&self, gpu: &mut GpuContext<'_>) -> Result<(TextureHandle, u32, u32)> {
        let image = match &self.source {
            PixelSource::Asset(asset) => gpu.assets.load_image(asset)?,
            PixelSource::Pixels(image) => image.clone(),
        };
        let image = image.downsample(self.sample_size);
        let handle = gpu.backend.create_texture(&TextureUpload {
            label: &self.name,
            width: image.width,
            height: image.height,
            format: TextureFormat::Rgba8,
            data: &image.rgba,
            mipmaps: self.mipmaps,
            wrap: self.wrap,
        })?;
        Ok((handle, image.width, image.height))
    }
}

impl VersionedResource for Texture {
    fn stamp(&self) -> VersionStamp {
        self.slot.stamp
    }

    fn stamp_mut(&mut self) -> &mut VersionStamp {
        &mut self.slot.stamp
    }

    fn recreate(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.slot.release(gpu);
        let outcome = self.upload(gpu);
        if let Ok((handle, ..)) = &outcome {
            debug!("Uploaded texture '{}' as {}", self.name, handle);
        }
        self.slot.settle(&self.name, outcome);
        Ok(())
    }
}

impl GpuTexture for Texture {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.ensure_current(gpu).map(|_| ())
    }

    fn bind(&mut self, gpu: &mut GpuContext<'_>, unit: u32) -> Result<()> {
        self.create(gpu)?;
        gpu.backend.bind_texture(unit, self.slot.handle);
        Ok(())
    }

    fn unbind(&self, backend: &mut dyn GraphicsBackend, unit: u32) {
        backend.bind_texture(unit, None);
    }
}

/// ETC1/ETC2/EAC texture read from a PKM asset
#[derive(Debug, Clone)]
pub struct CompressedTexture {
    asset: String,
    wrap: TextureWrap,
    slot: TextureSlot,
}

impl CompressedTexture {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            wrap: TextureWrap::ClampToEdge,
            slot: TextureSlot::default(),
        }
    }

    pub fn with_repeat(mut self, repeating: bool) -> Self {
        self.wrap = if repeating {
            TextureWrap::Repeat
        } else {
            TextureWrap::ClampToEdge
        };
        self
    }

    pub fn handle(&self) -> Option<TextureHandle> {
        self.slot.handle
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.slot.size
    }

    pub fn error(&self) -> Option<&RenderError> {
        self.slot.error.as_ref()
    }

    fn upload(&self, gpu: &mut GpuContext<'_>) -> Result<(TextureHandle, u32, u32)> {
        let bytes = gpu.assets.read(&self.asset)?;
        let image = pkm::parse(&bytes).map_err(|e| e.into_decode_failure(&self.asset))?;
        let (width, height) = image.header.padded_size();
        let handle = gpu.backend.create_texture(&TextureUpload {
            label: &self.asset,
            width,
            height,
            format: TextureFormat::Compressed(image.header.format),
            data: &image.data,
            mipmaps: false,
            wrap: self.wrap,
        })?;
        Ok((handle, width, height))
    }
}

impl VersionedResource for CompressedTexture {
    fn stamp(&self) -> VersionStamp {
        self.slot.stamp
    }

    fn stamp_mut(&mut self) -> &mut VersionStamp {
        &mut self.slot.stamp
    }

    fn recreate(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.slot.release(gpu);
        let outcome = self.upload(gpu);
        self.slot.settle(&self.asset, outcome);
        Ok(())
    }
}

impl GpuTexture for CompressedTexture {
    fn name(&self) -> &str {
        &self.asset
    }

    fn create(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.ensure_current(gpu).map(|_| ())
    }

    fn bind(&mut self, gpu: &mut GpuContext<'_>, unit: u32) -> Result<()> {
        self.create(gpu)?;
        gpu.backend.bind_texture(unit, self.slot.handle);
        Ok(())
    }

    fn unbind(&self, backend: &mut dyn GraphicsBackend, unit: u32) {
        backend.bind_texture(unit, None);
    }
}

/// Several textures bound together, child `i` on unit `i`
#[derive(Debug)]
pub struct Multitexture {
    name: String,
    textures: Vec<Box<dyn GpuTexture>>,
}

impl Multitexture {
    pub fn new(name: impl Into<String>, textures: Vec<Box<dyn GpuTexture>>) -> Self {
        Self {
            name: name.into(),
            textures,
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl GpuTexture for Multitexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        for texture in &mut self.textures {
            texture.create(gpu)?;
        }
        Ok(())
    }

    fn bind(&mut self, gpu: &mut GpuContext<'_>, unit: u32) -> Result<()> {
        let mut next = unit;
        for texture in &mut self.textures {
            texture.bind(gpu, next)?;
            next += texture.unit_count();
        }
        Ok(())
    }

    fn unbind(&self, backend: &mut dyn GraphicsBackend, unit: u32) {
        let mut next = unit;
        for texture in &self.textures {
            texture.unbind(backend, next);
            next += texture.unit_count();
        }
    }

    fn unit_count(&self) -> u32 {
        self.textures.iter().map(|t| t.unit_count()).sum()
    }
}
