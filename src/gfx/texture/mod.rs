//! # Textures
//!
//! [`Texture`] (decoded RGBA images), [`CompressedTexture`] (PKM files holding
//! ETC1/ETC2/EAC blocks) and [`Multitexture`] all implement [`GpuTexture`] and are
//! kept by the [`TextureManager`]. Pixels are fetched through an [`AssetLoader`]
//! every time a texture is (re)created for a new context version.

pub mod loader;
pub mod manager;
pub mod pkm;
#[allow(clippy::module_inception)]
pub mod texture;

use std::fmt;

pub use loader::{decode_image, AssetLoader, DecodedImage, DirectoryAssets, MemoryAssets};
pub use manager::TextureManager;
pub use texture::{CompressedTexture, GpuTexture, Multitexture, PixelSource, Texture};

/// Registry id of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture #{}", self.0)
    }
}
