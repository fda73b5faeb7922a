//! Encoding back into the source container format.
//!
//! JPEG output uses the `image` crate's encoder with an explicit quality
//! setting. PNG and GIF keep the alpha channel so transparency survives a
//! rotation.

use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, Frame, ImageEncoder, ImageFormat};

use super::{is_supported, CodecError};

/// Encode an image in the given container format.
///
/// # Arguments
///
/// * `img` - Pixels to encode
/// * `format` - Target container format (JPEG, PNG or GIF)
/// * `jpeg_quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns `CodecError::UnsupportedFormat` for other formats and
/// `CodecError::EncodingFailed` if the encoder rejects the pixels.
pub fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, CodecError> {
    if !is_supported(format) {
        return Err(CodecError::UnsupportedFormat(format!("{:?}", format)));
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(CodecError::InvalidDimensions {
            width: img.width(),
            height: img.height(),
        });
    }

    match format {
        ImageFormat::Jpeg => encode_jpeg_dynamic(img, jpeg_quality),
        ImageFormat::Gif => encode_gif(img),
        _ => {
            let mut buffer = Cursor::new(Vec::new());
            img.write_to(&mut buffer, format)
                .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;
            Ok(buffer.into_inner())
        }
    }
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Errors
///
/// Returns `CodecError::InvalidDimensions` for a zero width or height and
/// `CodecError::InvalidPixelData` if the buffer length doesn't match.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, CodecError> {
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(CodecError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    write_jpeg(pixels, width, height, ExtendedColorType::Rgb8, quality)
}

fn encode_jpeg_dynamic(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    // JPEG has no alpha channel; grayscale stays grayscale.
    match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            let luma = img.to_luma8();
            write_jpeg(luma.as_raw(), luma.width(), luma.height(), ExtendedColorType::L8, quality)
        }
        _ => {
            let rgb = img.to_rgb8();
            write_jpeg(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8, quality)
        }
    }
}

fn write_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
    quality: u8,
) -> Result<Vec<u8>, CodecError> {
    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());

    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(pixels, width, height, color)
        .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn encode_gif(img: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder
            .encode_frame(Frame::new(img.to_rgba8()))
            .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;
    }
    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::codec::decode_image;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=24, 1u32..=24)
    }

    proptest! {
        /// Property: PNG output decodes back to the exact same pixels.
        #[test]
        fn prop_png_is_lossless(
            (width, height) in dimensions_strategy(),
            seed in any::<u8>(),
        ) {
            let rgba = image::RgbaImage::from_fn(width, height, |x, y| {
                image::Rgba([
                    (x as u8).wrapping_mul(31).wrapping_add(seed),
                    (y as u8).wrapping_mul(17),
                    seed,
                    ((x + y) % 2 * 255) as u8,
                ])
            });

            let bytes = encode_image(&DynamicImage::ImageRgba8(rgba.clone()), ImageFormat::Png, 100).unwrap();
            let (decoded, _) = decode_image(&bytes).unwrap();
            prop_assert_eq!(decoded.to_rgba8(), rgba);
        }

        /// Property: JPEG output keeps the dimensions it was given.
        #[test]
        fn prop_jpeg_keeps_dimensions((width, height) in dimensions_strategy()) {
            let pixels = vec![90u8; (width * height * 3) as usize];
            let bytes = encode_jpeg(&pixels, width, height, 100).unwrap();
            let (decoded, _) = decode_image(&bytes).unwrap();
            prop_assert_eq!((decoded.width(), decoded.height()), (width, height));
        }
    }
}
