//! Fixture builders shared by the unit tests.

use std::io::Cursor;

use crate::codec::{encode_image, encode_jpeg};
use image::{DynamicImage, ImageFormat, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageICC};

/// Camera make recorded next to the orientation in every fixture EXIF block.
pub(crate) const FIXTURE_MAKE: &[u8] = b"Cam";

/// Minimal little-endian TIFF whose IFD0 holds Make and Orientation.
pub(crate) fn tiff_with_orientation(value: u16) -> Vec<u8> {
    let mut tiff = vec![
        b'I', b'I', 0x2A, 0x00, // byte order + magic
        0x08, 0x00, 0x00, 0x00, // offset of IFD0
        0x02, 0x00, // two entries
        0x0F, 0x01, // tag 0x010F (Make)
        0x02, 0x00, // type ASCII
        0x04, 0x00, 0x00, 0x00, // count 4, stored inline
    ];
    tiff.extend_from_slice(FIXTURE_MAKE);
    tiff.push(0x00);
    tiff.extend_from_slice(&[
        0x12, 0x01, // tag 0x0112 (Orientation)
        0x03, 0x00, // type SHORT
        0x01, 0x00, 0x00, 0x00, // count 1
    ]);
    tiff.extend_from_slice(&value.to_le_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]); // value padding
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD
    tiff
}

/// A gray `width` x `height` JPEG with an APP1 Exif segment after SOI.
pub(crate) fn jpeg_with_orientation(width: u32, height: u32, value: u16) -> Vec<u8> {
    let pixels = vec![100u8; (width * height * 3) as usize];
    let jpeg = encode_jpeg(&pixels, width, height, 90).unwrap();

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff_with_orientation(value));
    let segment_len = (payload.len() + 2) as u16;

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A PNG of `img` with an eXIf chunk placed right after IHDR.
pub(crate) fn png_with_orientation(img: &RgbaImage, value: u16) -> Vec<u8> {
    let png = encode_image(&DynamicImage::ImageRgba8(img.clone()), ImageFormat::Png, 100).unwrap();
    let data = tiff_with_orientation(value);

    let mut chunk = Vec::new();
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let mut typed = b"eXIf".to_vec();
    typed.extend_from_slice(&data);
    chunk.extend_from_slice(&typed);
    chunk.extend_from_slice(&crc32fast::hash(&typed).to_be_bytes());

    // signature (8) + IHDR chunk (4 length + 4 type + 13 data + 4 crc)
    let ihdr_end = 8 + 25;
    let mut out = png[..ihdr_end].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[ihdr_end..]);
    out
}

/// `jpeg` with `profile` embedded as its ICC profile.
pub(crate) fn with_icc_profile(jpeg: &[u8], profile: &[u8]) -> Vec<u8> {
    let mut parsed = Jpeg::from_bytes(Bytes::copy_from_slice(jpeg)).unwrap();
    parsed.set_icc_profile(Some(Bytes::copy_from_slice(profile)));

    let mut out = Vec::new();
    parsed.encoder().write_to(&mut out).unwrap();
    out
}

/// The primary-image EXIF field `tag` of encoded image bytes.
pub(crate) fn exif_field(bytes: &[u8], tag: exif::Tag) -> Option<exif::Field> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    exif.get_field(tag, exif::In::PRIMARY).cloned()
}
