//! PKM container for ETC1/ETC2/EAC block-compressed textures.
//!
//! A 16-byte big-endian header followed by the raw payload:
//!
//! | offset | size | field                    |
//! |--------|------|--------------------------|
//! | 0      | 6    | magic `PKM 10` / `PKM 20` |
//! | 6      | 2    | format code              |
//! | 8      | 2    | encoded width            |
//! | 10     | 2    | encoded height           |
//! | 12     | 2    | actual width             |
//! | 14     | 2    | actual height            |

use thiserror::Error;

use crate::error::RenderError;

pub const HEADER_SIZE: usize = 16;

const MAGIC_V1: &[u8; 6] = b"PKM 10";
const MAGIC_V2: &[u8; 6] = b"PKM 20";

const FORMAT_OFFSET: usize = 6;
const ENCODED_WIDTH_OFFSET: usize = 8;
const ENCODED_HEIGHT_OFFSET: usize = 10;
const WIDTH_OFFSET: usize = 12;
const HEIGHT_OFFSET: usize = 14;

/// Largest gap allowed between encoded and actual size, per axis
const MAX_PADDING: u16 = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PkmError {
    #[error("file is {0} bytes, shorter than the PKM header")]
    TooShort(usize),

    #[error("bad magic sequence")]
    BadMagic,

    #[error("unknown compression format code {0:#06x}")]
    UnknownFormat(u16),

    #[error("encoded size {encoded_width}x{encoded_height} does not fit actual size {width}x{height}")]
    BadDimensions {
        encoded_width: u16,
        encoded_height: u16,
        width: u16,
        height: u16,
    },

    #[error("payload holds {actual} bytes, expected {expected}")]
    Truncated { expected: usize, actual: usize },
}

impl PkmError {
    /// Attaches the asset name, turning this into a decode failure
    pub fn into_decode_failure(self, name: &str) -> RenderError {
        RenderError::DecodeFailure {
            name: name.to_string(),
            reason: self.to_string(),
        }
    }
}

/// The eight compression formats a PKM header can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EtcFormat {
    Etc1Rgb8,
    Etc2Rgb8,
    Etc2Rgba8Eac,
    Etc2Rgb8Punchthrough,
    EacR11,
    EacRg11,
    EacR11Signed,
    EacRg11Signed,
}

impl EtcFormat {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(EtcFormat::Etc1Rgb8),
            1 => Some(EtcFormat::Etc2Rgb8),
            3 => Some(EtcFormat::Etc2Rgba8Eac),
            4 => Some(EtcFormat::Etc2Rgb8Punchthrough),
            5 => Some(EtcFormat::EacR11),
            6 => Some(EtcFormat::EacRg11),
            7 => Some(EtcFormat::EacR11Signed),
            8 => Some(EtcFormat::EacRg11Signed),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            EtcFormat::Etc1Rgb8 => 0,
            EtcFormat::Etc2Rgb8 => 1,
            EtcFormat::Etc2Rgba8Eac => 3,
            EtcFormat::Etc2Rgb8Punchthrough => 4,
            EtcFormat::EacR11 => 5,
            EtcFormat::EacRg11 => 6,
            EtcFormat::EacR11Signed => 7,
            EtcFormat::EacRg11Signed => 8,
        }
    }

    /// Bytes per 4x4 block.
    ///
    /// The two-channel EAC formats carry two 8-byte R11 blocks, so they are 16
    /// bytes like RGBA8, not the 8 bytes of the other formats.
    pub fn block_bytes(self) -> usize {
        match self {
            EtcFormat::Etc2Rgba8Eac | EtcFormat::EacRg11 | EtcFormat::EacRg11Signed => 16,
            _ => 8,
        }
    }

    /// Payload size for an image of the given encoded size
    pub fn payload_size(self, encoded_width: u16, encoded_height: u16) -> usize {
        let blocks_w = (encoded_width as usize).div_ceil(4);
        let blocks_h = (encoded_height as usize).div_ceil(4);
        blocks_w * blocks_h * self.block_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkmHeader {
    /// `true` for the `PKM 20` magic
    pub etc2: bool,
    pub format: EtcFormat,
    pub encoded_width: u16,
    pub encoded_height: u16,
    pub width: u16,
    pub height: u16,
}

impl PkmHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, PkmError> {
        if bytes.len() < HEADER_SIZE {
            return Err(PkmError::TooShort(bytes.len()));
        }
        let etc2 = match &bytes[..6] {
            magic if magic == MAGIC_V2 => true,
            magic if magic == MAGIC_V1 => false,
            _ => return Err(PkmError::BadMagic),
        };

        let read = |offset: usize| u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
        let code = read(FORMAT_OFFSET);
        let format = EtcFormat::from_code(code).ok_or(PkmError::UnknownFormat(code))?;

        let header = Self {
            etc2,
            format,
            encoded_width: read(ENCODED_WIDTH_OFFSET),
            encoded_height: read(ENCODED_HEIGHT_OFFSET),
            width: read(WIDTH_OFFSET),
            height: read(HEIGHT_OFFSET),
        };
        if !fits(header.encoded_width, header.width) || !fits(header.encoded_height, header.height) {
            return Err(PkmError::BadDimensions {
                encoded_width: header.encoded_width,
                encoded_height: header.encoded_height,
                width: header.width,
                height: header.height,
            });
        }
        Ok(header)
    }

    pub fn payload_size(&self) -> usize {
        self.format.payload_size(self.encoded_width, self.encoded_height)
    }

    /// Encoded size rounded up to whole blocks
    pub fn padded_size(&self) -> (u32, u32) {
        let round = |v: u16| (v as u32).div_ceil(4) * 4;
        (round(self.encoded_width), round(self.encoded_height))
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..6].copy_from_slice(if self.etc2 { MAGIC_V2 } else { MAGIC_V1 });
        let fields = [
            (FORMAT_OFFSET, self.format.code()),
            (ENCODED_WIDTH_OFFSET, self.encoded_width),
            (ENCODED_HEIGHT_OFFSET, self.encoded_height),
            (WIDTH_OFFSET, self.width),
            (HEIGHT_OFFSET, self.height),
        ];
        for (offset, value) in fields {
            out[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
        }
        out
    }
}

fn fits(encoded: u16, actual: u16) -> bool {
    encoded >= actual && encoded - actual <= MAX_PADDING
}

/// A parsed PKM file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkmImage {
    pub header: PkmHeader,
    pub data: Vec<u8>,
}

/// Parses a whole PKM file. Trailing bytes after the payload are ignored.
pub fn parse(bytes: &[u8]) -> Result<PkmImage, PkmError> {
    let header = PkmHeader::parse(bytes)?;
    let expected = header.payload_size();
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() < expected {
        return Err(PkmError::Truncated {
            expected,
            actual: payload.len(),
        });
    }
    Ok(PkmImage {
        header,
        data: payload[..expected].to_vec(),
    })
}
