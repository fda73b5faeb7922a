//! Decoding and encoding of whole image files.
//!
//! Backends decode a file once, transform it in memory and re-encode it in
//! the same container format. Only the formats listed in
//! [`SUPPORTED_FORMATS`] are accepted.
//!
//! # Examples
//!
//! ```ignore
//! use orientfix_core::codec::{decode_image, encode_image};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let (image, format) = decode_image(&bytes).unwrap();
//! let reencoded = encode_image(&image.rotate90(), format, 100).unwrap();
//! ```

mod decode;
mod encode;

use image::ImageFormat;
use thiserror::Error;

pub use decode::{decode_image, sniff_format};
pub use encode::{encode_image, encode_jpeg};

/// Container formats the backends can rewrite.
pub const SUPPORTED_FORMATS: [ImageFormat; 3] =
    [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Gif];

/// Returns true if `format` can be decoded and re-encoded.
pub fn is_supported(format: ImageFormat) -> bool {
    SUPPORTED_FORMATS.contains(&format)
}

/// Error types for decoding and encoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The container format is not recognized or not rewritable.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}
