//! RGB canvas backend.
//!
//! The canvas rotates counter-clockwise by quarter turns and mirrors across
//! an [`Axis`]. Those are its only primitives; the [`Backend`] impl composes
//! them to realize clockwise rotations and horizontal/vertical flips.
//!
//! # Coordinate System
//!
//! - Pixels are RGB, 3 bytes each, row-major
//! - Origin is top-left corner
//! - A counter-clockwise quarter turn maps `(x, y)` to `(y, width - 1 - x)`

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use log::debug;

use super::{write_atomic, Backend, BackendError};
use crate::codec::{decode_image, encode_jpeg, CodecError};
use crate::metadata::PreservedMetadata;
use crate::orientation::Rotation;

const NAME: &str = "canvas";

/// Mirror axis for [`Canvas::mirror`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Mirror across the vertical axis (left and right swap).
    Vertical,
    /// Mirror across the horizontal axis (top and bottom swap).
    Horizontal,
}

/// An RGB pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl Canvas {
    /// Create a new Canvas with the given dimensions and pixel data.
    ///
    /// The buffer length is not checked here; see [`Canvas::validate`].
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a canvas by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Canvas from an image::RgbImage.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbImage.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) out of bounds", x, y);
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check that the pixel buffer holds exactly width * height RGB pixels.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidPixelData` on a length mismatch.
    pub fn validate(&self) -> Result<(), CodecError> {
        let expected = (self.width as usize) * (self.height as usize) * 3;
        if self.pixels.len() != expected {
            return Err(CodecError::InvalidPixelData {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Rotate counter-clockwise by `quarter_turns` * 90 degrees.
    pub fn rotate_counter_clockwise(&mut self, quarter_turns: u8) {
        for _ in 0..quarter_turns % 4 {
            self.rotate_quarter_ccw();
        }
    }

    fn rotate_quarter_ccw(&mut self) {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut output = vec![0u8; self.pixels.len()];

        // New canvas is h x w; (x, y) lands on (y, w - 1 - x).
        for y in 0..h {
            for x in 0..w {
                let src = (y * w + x) * 3;
                let dst = ((w - 1 - x) * h + y) * 3;
                output[dst..dst + 3].copy_from_slice(&self.pixels[src..src + 3]);
            }
        }

        self.width = h as u32;
        self.height = w as u32;
        self.pixels = output;
    }

    /// Mirror the canvas across `axis`, in place.
    pub fn mirror(&mut self, axis: Axis) {
        let (w, h) = (self.width as usize, self.height as usize);
        let row_len = w * 3;

        match axis {
            Axis::Vertical => {
                for row in self.pixels.chunks_exact_mut(row_len.max(1)) {
                    for x in 0..w / 2 {
                        let (a, b) = (x * 3, (w - 1 - x) * 3);
                        for c in 0..3 {
                            row.swap(a + c, b + c);
                        }
                    }
                }
            }
            Axis::Horizontal => {
                for y in 0..h / 2 {
                    let (top, bottom) = self.pixels.split_at_mut((h - 1 - y) * row_len);
                    top[y * row_len..(y + 1) * row_len].swap_with_slice(&mut bottom[..row_len]);
                }
            }
        }
    }
}

/// Backend that stages changes on an in-memory [`Canvas`].
///
/// The committed canvas stays equal to the original until [`Backend::persist`]
/// succeeds. When opened from a file, persisting also rewrites that file as
/// JPEG; the canvas carries no alpha, so only JPEG sources are accepted.
#[derive(Debug)]
pub struct CanvasBackend {
    committed: Canvas,
    working: Canvas,
    destination: Option<PathBuf>,
    metadata: PreservedMetadata,
    jpeg_quality: u8,
    persisted: bool,
}

impl CanvasBackend {
    /// Stage changes on a copy of `canvas`; persisting only updates memory.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidPixelData` if the canvas buffer doesn't
    /// match its dimensions.
    pub fn new(canvas: Canvas) -> Result<Self, BackendError> {
        canvas.validate()?;
        Ok(Self {
            working: canvas.clone(),
            committed: canvas,
            destination: None,
            metadata: PreservedMetadata::default(),
            jpeg_quality: 100,
            persisted: false,
        })
    }

    /// Open a JPEG file for correction in place.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedFormat` for anything but JPEG, and
    /// I/O or decode errors if the file cannot be read.
    pub fn open(path: &Path, jpeg_quality: u8) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        let (img, format) = decode_image(&bytes)?;
        if format != ImageFormat::Jpeg {
            return Err(CodecError::UnsupportedFormat(format!(
                "{:?} (the canvas backend only writes JPEG)",
                format
            ))
            .into());
        }

        debug!(
            "canvas backend opened {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );

        let canvas = Canvas::from_rgb_image(img.into_rgb8());
        Ok(Self {
            destination: Some(path.to_path_buf()),
            metadata: PreservedMetadata::extract(&bytes),
            jpeg_quality,
            ..Self::new(canvas)?
        })
    }

    /// The canvas as last persisted (the original until `persist` succeeds).
    pub fn committed(&self) -> &Canvas {
        &self.committed
    }

    /// The canvas with all staged operations applied.
    pub fn working(&self) -> &Canvas {
        &self.working
    }

    pub fn into_committed(self) -> Canvas {
        self.committed
    }
}

impl Backend for CanvasBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn rotate_clockwise(&mut self, rotation: Rotation) -> Result<(), BackendError> {
        // n clockwise quarter turns == (4 - n) counter-clockwise ones
        self.working
            .rotate_counter_clockwise(4 - rotation.quarter_turns());
        Ok(())
    }

    fn flip_horizontal(&mut self) -> Result<(), BackendError> {
        self.working.mirror(Axis::Vertical);
        Ok(())
    }

    fn flip_vertical(&mut self) -> Result<(), BackendError> {
        self.working.mirror(Axis::Horizontal);
        Ok(())
    }

    fn persist(&mut self) -> Result<(), BackendError> {
        if self.persisted {
            return Err(BackendError::AlreadyPersisted(NAME));
        }

        if let Some(path) = &self.destination {
            let bytes = encode_jpeg(
                &self.working.pixels,
                self.working.width,
                self.working.height,
                self.jpeg_quality,
            )?;
            write_atomic(path, &self.metadata.apply(bytes))?;
        }

        self.committed = self.working.clone();
        self.persisted = true;
        Ok(())
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::backend::{apply, execute};
    use crate::orientation::{plan, Operation, OrientationCode, TransformPlan};
    use proptest::prelude::*;

    /// Strategy for generating canvas dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=12, 1u32..=12)
    }

    fn code_strategy() -> impl Strategy<Value = OrientationCode> {
        prop::sample::select(OrientationCode::ALL.to_vec())
    }

    /// Every pixel encodes its own coordinates, so any two layouts differ.
    fn labelled(width: u32, height: u32) -> Canvas {
        Canvas::from_fn(width, height, |x, y| [x as u8, y as u8, 7])
    }

    fn run(canvas: &Canvas, plan: TransformPlan) -> Canvas {
        let mut backend = CanvasBackend::new(canvas.clone()).unwrap();
        execute(plan, &mut backend).unwrap();
        backend.into_committed()
    }

    fn run_ops(canvas: &Canvas, ops: &[Operation]) -> Canvas {
        let mut backend = CanvasBackend::new(canvas.clone()).unwrap();
        for op in ops {
            apply(&mut backend, *op).unwrap();
        }
        backend.persist().unwrap();
        backend.into_committed()
    }

    proptest! {
        /// Property: output dimensions follow the plan's dimension arithmetic.
        #[test]
        fn prop_dimensions_match_plan(
            (width, height) in dimensions_strategy(),
            code in code_strategy(),
        ) {
            let result = run(&labelled(width, height), plan(code));
            prop_assert_eq!(result.dimensions(), code.oriented_dimensions(width, height));
            prop_assert_eq!(result.pixels.len(), (width * height * 3) as usize);
        }

        /// Property: once corrected, the image reads as upright and the
        /// (empty) plan for that changes nothing.
        #[test]
        fn prop_correction_is_idempotent(
            (width, height) in dimensions_strategy(),
            code in code_strategy(),
        ) {
            let once = run(&labelled(width, height), plan(code));
            let twice = run(&once, plan(OrientationCode::Normal));
            prop_assert_eq!(twice, once);
        }

        /// Property: mirroring twice, or rotating 180 twice, restores the original.
        #[test]
        fn prop_involutions(
            (width, height) in dimensions_strategy(),
            code in prop::sample::select(vec![
                OrientationCode::MirrorHorizontal,
                OrientationCode::Rotate180,
                OrientationCode::MirrorVertical,
            ]),
        ) {
            let original = labelled(width, height);
            let back = run(&run(&original, plan(code)), plan(code));
            prop_assert_eq!(back, original);
        }

        /// Property: a quarter turn one way then three quarters nets to identity.
        #[test]
        fn prop_rotate_90_then_270_is_identity(size in 1u32..=12, height in 1u32..=12) {
            let square = labelled(size, size);
            let back = run(&run(&square, plan(OrientationCode::Rotate90)), plan(OrientationCode::Rotate270));
            prop_assert_eq!(back, square);

            let rect = labelled(size, height);
            let back = run(&run(&rect, plan(OrientationCode::Rotate90)), plan(OrientationCode::Rotate270));
            prop_assert_eq!(back, rect);
        }

        /// Property: code 5 equals flip-then-rotate and differs from rotate-then-flip.
        #[test]
        fn prop_transpose_is_order_sensitive(
            (width, height) in (1u32..=12, 1u32..=12).prop_filter("needs two pixels", |(w, h)| w * h > 1),
        ) {
            let original = labelled(width, height);
            let planned = run(&original, plan(OrientationCode::Transpose));

            let flip_then_rotate = run_ops(
                &original,
                &[Operation::FlipHorizontal, Operation::RotateClockwise(Rotation::Clockwise90)],
            );
            let rotate_then_flip = run_ops(
                &original,
                &[Operation::RotateClockwise(Rotation::Clockwise90), Operation::FlipHorizontal],
            );

            prop_assert_eq!(&planned, &flip_then_rotate);
            prop_assert_ne!(&planned, &rotate_then_flip);
        }

        /// Property: a translated clockwise turn is undone by the same number
        /// of native counter-clockwise turns.
        #[test]
        fn prop_translation_matches_native(
            (width, height) in dimensions_strategy(),
            turns in 1u8..=3,
        ) {
            let rotation = Rotation::try_from(turns as u16 * 90).unwrap();
            let original = labelled(width, height);

            let mut backend = CanvasBackend::new(original.clone()).unwrap();
            backend.rotate_clockwise(rotation).unwrap();

            let mut canvas = backend.working().clone();
            canvas.rotate_counter_clockwise(turns);
            prop_assert_eq!(canvas, original);
        }
    }
}
