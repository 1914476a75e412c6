//! Asset access for textures.
//!
//! The engine never touches platform storage directly. Textures ask an
//! [`AssetLoader`] for bytes or pixels by logical name, which keeps recreation
//! after a context loss independent of where the data lives.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{RenderError, Result};

/// Tightly packed RGBA8 pixels
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::DecodeFailure {
                name: format!("{width}x{height} image"),
                reason: format!("{} bytes of pixels, expected {expected}", rgba.len()),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Single-color image
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba: rgba.repeat(width as usize * height as usize),
        }
    }

    /// Shrinks the image by an integer factor, at least to 1x1
    pub fn downsample(self, factor: u32) -> Self {
        if factor <= 1 {
            return self;
        }
        let (width, height) = (self.width, self.height);
        let Some(buffer) = RgbaImage::from_raw(width, height, self.rgba.clone()) else {
            return self;
        };
        let resized = image::imageops::resize(
            &buffer,
            (width / factor).max(1),
            (height / factor).max(1),
            FilterType::Triangle,
        );
        Self {
            width: resized.width(),
            height: resized.height(),
            rgba: resized.into_raw(),
        }
    }
}

/// Decodes PNG or JPEG bytes into RGBA8
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes).map_err(|e| RenderError::DecodeFailure {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Source of raw asset bytes and decoded images
pub trait AssetLoader {
    /// Raw bytes of the asset called `name`
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Decoded pixels of the image asset called `name`
    fn load_image(&self, name: &str) -> Result<DecodedImage> {
        let bytes = self.read(name)?;
        decode_image(name, &bytes)
    }
}

impl<T: AssetLoader + ?Sized> AssetLoader for Box<T> {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        (**self).read(name)
    }

    fn load_image(&self, name: &str) -> Result<DecodedImage> {
        (**self).load_image(name)
    }
}

#[derive(Debug, Clone)]
enum MemoryAsset {
    Bytes(Vec<u8>),
    Image(DecodedImage),
}

/// Assets held in memory, for tests and generated content
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    assets: HashMap<String, MemoryAsset>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bytes(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(name.into(), MemoryAsset::Bytes(bytes));
    }

    /// Stores already decoded pixels; `load_image` returns them as is
    pub fn insert_image(&mut self, name: impl Into<String>, image: DecodedImage) {
        self.assets.insert(name.into(), MemoryAsset::Image(image));
    }

    pub fn with_image(mut self, name: impl Into<String>, image: DecodedImage) -> Self {
        self.insert_image(name, image);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    fn missing(name: &str) -> RenderError {
        RenderError::DecodeFailure {
            name: name.to_string(),
            reason: "no such asset".to_string(),
        }
    }
}

impl AssetLoader for MemoryAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        match self.assets.get(name) {
            Some(MemoryAsset::Bytes(bytes)) => Ok(bytes.clone()),
            Some(MemoryAsset::Image(image)) => Ok(image.rgba.clone()),
            None => Err(Self::missing(name)),
        }
    }

    fn load_image(&self, name: &str) -> Result<DecodedImage> {
        match self.assets.get(name) {
            Some(MemoryAsset::Image(image)) => Ok(image.clone()),
            Some(MemoryAsset::Bytes(bytes)) => decode_image(name, bytes),
            None => Err(Self::missing(name)),
        }
    }
}

/// Assets read from files below a root directory
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl AssetLoader for DirectoryAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        std::fs::read(&path).map_err(|e| RenderError::DecodeFailure {
            name: name.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_assets_return_stored_image() {
        let assets = MemoryAssets::new().with_image("white", DecodedImage::solid(2, 2, [255; 4]));
        let image = assets.load_image("white").unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.rgba.len(), 16);
        assert!(assets.load_image("missing").is_err());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let mut assets = MemoryAssets::new();
        assets.insert_bytes("broken.png", vec![1, 2, 3, 4]);
        assert!(matches!(
            assets.load_image("broken.png"),
            Err(RenderError::DecodeFailure { ref name, .. }) if name == "broken.png"
        ));
    }

    #[test]
    fn test_png_round_trip_through_decoder() {
        let source = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        source.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let decoded = decode_image("tile.png", png.get_ref()).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_downsample_keeps_at_least_one_pixel() {
        let image = DecodedImage::solid(8, 2, [0, 0, 0, 255]).downsample(4);
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.rgba.len(), 8);
    }

    #[test]
    fn test_new_validates_length() {
        assert!(DecodedImage::new(2, 2, vec![0; 15]).is_err());
        assert!(DecodedImage::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_directory_assets_report_missing_files() {
        let assets = DirectoryAssets::new("/definitely/not/here");
        assert!(matches!(
            assets.read("a.png"),
            Err(RenderError::DecodeFailure { .. })
        ));
    }
}
