//! Backend built on `image::DynamicImage`.
//!
//! Uses the `image` crate's clockwise `rotate90`/`rotate180`/`rotate270` and
//! `fliph`/`flipv`, which line up with the canonical vocabulary one to one.
//! The native color type is kept throughout, so PNG and GIF transparency
//! survives the rewrite. EXIF and ICC data of JPEG and PNG sources are
//! carried into the output with the orientation reset to 1.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageFormat};
use log::debug;

use super::{write_atomic, Backend, BackendError};
use crate::codec::{decode_image, encode_image, CodecError};
use crate::metadata::PreservedMetadata;
use crate::orientation::{Operation, Rotation};

const NAME: &str = "image";

/// Backend that transforms a decoded `DynamicImage` and re-encodes it in
/// its source format.
#[derive(Debug)]
pub struct ImageBackend {
    image: DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
    animated: bool,
    metadata: PreservedMetadata,
    destination: Option<PathBuf>,
    output: Option<Vec<u8>>,
}

impl ImageBackend {
    /// Wrap an already decoded image; `persist` encodes into memory.
    pub fn new(image: DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Self {
        Self {
            image,
            format,
            jpeg_quality,
            animated: false,
            metadata: PreservedMetadata::default(),
            destination: None,
            output: None,
        }
    }

    /// Decode an encoded image; `persist` encodes into memory.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedFormat` for formats other than
    /// JPEG, PNG and GIF, and `CodecError::CorruptedFile` if decoding fails.
    pub fn from_bytes(bytes: &[u8], jpeg_quality: u8) -> Result<Self, BackendError> {
        let (image, format) = decode_image(bytes)?;
        let animated = format == ImageFormat::Gif && is_animated_gif(bytes)?;

        Ok(Self {
            animated,
            metadata: PreservedMetadata::extract(bytes),
            ..Self::new(image, format, jpeg_quality)
        })
    }

    /// Open a file for correction in place.
    ///
    /// # Errors
    ///
    /// Same as [`ImageBackend::from_bytes`], plus I/O errors reading `path`.
    pub fn open(path: &Path, jpeg_quality: u8) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        let backend = Self::from_bytes(&bytes, jpeg_quality)?;

        debug!(
            "image backend opened {} ({:?}, {}x{})",
            path.display(),
            backend.format,
            backend.image.width(),
            backend.image.height()
        );

        Ok(Self {
            destination: Some(path.to_path_buf()),
            ..backend
        })
    }

    /// The image with all staged operations applied.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// The source container format, which is also the output format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encoded bytes produced by `persist`, if it has run.
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn into_output(self) -> Option<Vec<u8>> {
        self.output
    }

    fn ensure_still(&self, op: Operation) -> Result<(), BackendError> {
        if self.animated {
            return Err(BackendError::UnsupportedOperation {
                backend: NAME,
                operation: op.to_string(),
                reason: "animated GIF frames would be dropped".to_string(),
            });
        }
        Ok(())
    }
}

fn is_animated_gif(bytes: &[u8]) -> Result<bool, BackendError> {
    let decoder =
        GifDecoder::new(Cursor::new(bytes)).map_err(|e| CodecError::CorruptedFile(e.to_string()))?;
    Ok(decoder.into_frames().take(2).count() > 1)
}

impl Backend for ImageBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn rotate_clockwise(&mut self, rotation: Rotation) -> Result<(), BackendError> {
        self.ensure_still(Operation::RotateClockwise(rotation))?;
        self.image = match rotation {
            Rotation::Clockwise90 => self.image.rotate90(),
            Rotation::Clockwise180 => self.image.rotate180(),
            Rotation::Clockwise270 => self.image.rotate270(),
        };
        Ok(())
    }

    fn flip_horizontal(&mut self) -> Result<(), BackendError> {
        self.ensure_still(Operation::FlipHorizontal)?;
        self.image = self.image.fliph();
        Ok(())
    }

    fn flip_vertical(&mut self) -> Result<(), BackendError> {
        self.ensure_still(Operation::FlipVertical)?;
        self.image = self.image.flipv();
        Ok(())
    }

    fn persist(&mut self) -> Result<(), BackendError> {
        if self.output.is_some() {
            return Err(BackendError::AlreadyPersisted(NAME));
        }

        let encoded = encode_image(&self.image, self.format, self.jpeg_quality)?;
        let bytes = self.metadata.apply(encoded);
        if let Some(path) = &self.destination {
            write_atomic(path, &bytes)?;
        }
        self.output = Some(bytes);
        Ok(())
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
