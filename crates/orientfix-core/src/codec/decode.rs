//! Image decoding with format detection.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use super::{is_supported, CodecError};

/// Detect the container format from the file's magic bytes.
///
/// # Errors
///
/// Returns `CodecError::UnsupportedFormat` if the format is unknown or is not
/// one of the rewritable formats.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, CodecError> {
    let format = image::guess_format(bytes)
        .map_err(|_| CodecError::UnsupportedFormat("unrecognized".to_string()))?;

    if !is_supported(format) {
        return Err(CodecError::UnsupportedFormat(format!("{:?}", format)));
    }
    Ok(format)
}

/// Decode an image from bytes, keeping its native color type.
///
/// Returns the decoded pixels together with the detected container format so
/// the caller can write the result back in the same format.
///
/// # Errors
///
/// Returns `CodecError::UnsupportedFormat` for formats outside
/// [`super::SUPPORTED_FORMATS`] and `CodecError::CorruptedFile` if decoding
/// fails.
pub fn decode_image(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), CodecError> {
    let format = sniff_format(bytes)?;

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format);

    let img = reader
        .decode()
        .map_err(|e| CodecError::CorruptedFile(e.to_string()))?;

    Ok((img, format))
}
