//! EXIF orientation codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw orientation value outside the EXIF range 1-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid EXIF orientation code: {0} (expected 1-8)")]
pub struct InvalidOrientationCode(pub u32);

/// EXIF orientation values (1-8).
///
/// Each value describes how the stored pixel data relates to the upright
/// picture. See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u8)]
pub enum OrientationCode {
    /// Already upright.
    Normal = 1,
    /// Mirrored left-right.
    MirrorHorizontal = 2,
    /// Rotated 180 degrees.
    Rotate180 = 3,
    /// Mirrored top-bottom.
    MirrorVertical = 4,
    /// Mirrored and rotated a quarter turn.
    Transpose = 5,
    /// Rotated 90 degrees clockwise.
    Rotate90 = 6,
    /// Mirrored and rotated three quarter turns.
    Transverse = 7,
    /// Rotated 270 degrees clockwise.
    Rotate270 = 8,
}

impl OrientationCode {
    /// Every code, in numeric order.
    pub const ALL: [OrientationCode; 8] = [
        OrientationCode::Normal,
        OrientationCode::MirrorHorizontal,
        OrientationCode::Rotate180,
        OrientationCode::MirrorVertical,
        OrientationCode::Transpose,
        OrientationCode::Rotate90,
        OrientationCode::Transverse,
        OrientationCode::Rotate270,
    ];

    /// Parse a raw metadata value into a code that needs correction.
    ///
    /// Returns `None` when the value is absent, outside 1-8, or equal to 1.
    /// "No metadata" and "metadata says upright" are deliberately
    /// indistinguishable here: both mean nothing has to be done.
    pub fn parse(raw: Option<u32>) -> Option<OrientationCode> {
        match raw.map(OrientationCode::try_from) {
            Some(Ok(OrientationCode::Normal)) | Some(Err(_)) | None => None,
            Some(Ok(code)) => Some(code),
        }
    }

    /// The numeric EXIF value.
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Returns true if correcting this orientation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            OrientationCode::Transpose
                | OrientationCode::Rotate90
                | OrientationCode::Transverse
                | OrientationCode::Rotate270
        )
    }

    /// Dimensions of the canvas once this orientation has been corrected.
    pub fn oriented_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl TryFrom<u32> for OrientationCode {
    type Error = InvalidOrientationCode;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OrientationCode::Normal),
            2 => Ok(OrientationCode::MirrorHorizontal),
            3 => Ok(OrientationCode::Rotate180),
            4 => Ok(OrientationCode::MirrorVertical),
            5 => Ok(OrientationCode::Transpose),
            6 => Ok(OrientationCode::Rotate90),
            7 => Ok(OrientationCode::Transverse),
            8 => Ok(OrientationCode::Rotate270),
            other => Err(InvalidOrientationCode(other)),
        }
    }
}

impl From<OrientationCode> for u32 {
    fn from(code: OrientationCode) -> Self {
        code.value() as u32
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
