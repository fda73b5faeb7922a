//! The orientation table: which operations bring each code upright.
//!
//! Plans are written in a single vocabulary: rotations are clockwise, in
//! degrees, and any mirroring happens before the rotation. Backends whose
//! native primitives use another convention translate at their own boundary;
//! this table is the only place where orientation semantics are encoded.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::OrientationCode;

/// A rotation angle that is not a quarter, half or three-quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported rotation: {0} degrees (expected 90, 180 or 270)")]
pub struct InvalidRotation(pub u16);

/// Clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// The rotation angle in degrees, clockwise.
    #[inline]
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Number of clockwise quarter turns (1-3).
    #[inline]
    pub fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    /// Returns true if this rotation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        !matches!(self, Rotation::Clockwise180)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Clockwise180),
            270 => Ok(Rotation::Clockwise270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// A single geometric step of a [`TransformPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "degrees", rename_all = "snake_case")]
pub enum Operation {
    /// Rotate the whole canvas clockwise, growing it to fit.
    RotateClockwise(Rotation),
    /// Mirror left-right (around the vertical axis).
    FlipHorizontal,
    /// Mirror top-bottom (around the horizontal axis).
    FlipVertical,
}

impl Operation {
    /// Canvas dimensions after applying this operation to a `width` x `height` canvas.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Operation::RotateClockwise(rotation) if rotation.swaps_dimensions() => (height, width),
            _ => (width, height),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::RotateClockwise(rotation) => {
                write!(f, "rotate {} clockwise", rotation.degrees())
            }
            Operation::FlipHorizontal => f.write_str("flip horizontal"),
            Operation::FlipVertical => f.write_str("flip vertical"),
        }
    }
}

/// An ordered sequence of operations, applied one after another.
///
/// Order matters: each operation works on the output of the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransformPlan {
    operations: &'static [Operation],
}

impl TransformPlan {
    /// The plan that changes nothing.
    pub const EMPTY: TransformPlan = TransformPlan { operations: &[] };

    /// The operations in application order.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        self.operations
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Canvas dimensions after the whole plan has run.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        self.operations
            .iter()
            .fold((width, height), |(w, h), op| op.output_dimensions(w, h))
    }
}

impl IntoIterator for TransformPlan {
    type Item = Operation;
    type IntoIter = std::iter::Copied<std::slice::Iter<'static, Operation>>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter().copied()
    }
}

impl fmt::Display for TransformPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("identity");
        }
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                f.write_str(", then ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

const MIRROR_HORIZONTAL: &[Operation] = &[Operation::FlipHorizontal];
const ROTATE_180: &[Operation] = &[Operation::RotateClockwise(Rotation::Clockwise180)];
const MIRROR_VERTICAL: &[Operation] = &[Operation::FlipVertical];
const TRANSPOSE: &[Operation] = &[
    Operation::FlipHorizontal,
    Operation::RotateClockwise(Rotation::Clockwise90),
];
const ROTATE_90: &[Operation] = &[Operation::RotateClockwise(Rotation::Clockwise90)];
const TRANSVERSE: &[Operation] = &[
    Operation::FlipHorizontal,
    Operation::RotateClockwise(Rotation::Clockwise270),
];
const ROTATE_270: &[Operation] = &[Operation::RotateClockwise(Rotation::Clockwise270)];

/// Map an orientation code to the operations that bring the image upright.
///
/// Pure and total: every code has exactly one plan, and `Normal` maps to the
/// empty plan.
pub fn plan(code: OrientationCode) -> TransformPlan {
    let operations = match code {
        OrientationCode::Normal => TransformPlan::EMPTY.operations,
        OrientationCode::MirrorHorizontal => MIRROR_HORIZONTAL,
        OrientationCode::Rotate180 => ROTATE_180,
        OrientationCode::MirrorVertical => MIRROR_VERTICAL,
        OrientationCode::Transpose => TRANSPOSE,
        OrientationCode::Rotate90 => ROTATE_90,
        OrientationCode::Transverse => TRANSVERSE,
        OrientationCode::Rotate270 => ROTATE_270,
    };
    TransformPlan { operations }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Operation::{FlipHorizontal, FlipVertical, RotateClockwise};
    use Rotation::{Clockwise180, Clockwise270, Clockwise90};

    fn ops(raw: u32) -> Vec<Operation> {
        let code = OrientationCode::try_from(raw).unwrap();
        plan(code).into_iter().collect()
    }

    #[test]
    fn test_orientation_table() {
        assert_eq!(ops(1), vec![]);
        assert_eq!(ops(2), vec![FlipHorizontal]);
        assert_eq!(ops(3), vec![RotateClockwise(Clockwise180)]);
        assert_eq!(ops(4), vec![FlipVertical]);
        assert_eq!(ops(5), vec![FlipHorizontal, RotateClockwise(Clockwise90)]);
        assert_eq!(ops(6), vec![RotateClockwise(Clockwise90)]);
        assert_eq!(ops(7), vec![FlipHorizontal, RotateClockwise(Clockwise270)]);
        assert_eq!(ops(8), vec![RotateClockwise(Clockwise270)]);
    }

    #[test]
    fn test_parsed_codes_never_yield_empty_plan() {
        for raw in 0..=16u32 {
            if let Some(code) = OrientationCode::parse(Some(raw)) {
                assert!(!plan(code).is_empty(), "code {} planned nothing", raw);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        for code in OrientationCode::ALL {
            assert_eq!(plan(code), plan(code));
        }
    }

    #[test]
    fn test_plan_dimensions_match_code() {
        for code in OrientationCode::ALL {
            assert_eq!(
                plan(code).output_dimensions(2, 3),
                code.oriented_dimensions(2, 3),
                "code {:?}",
                code
            );
        }
    }

    #[test]
    fn test_rotation_degrees_round_trip() {
        for rotation in [Clockwise90, Clockwise180, Clockwise270] {
            assert_eq!(Rotation::try_from(rotation.degrees()), Ok(rotation));
        }
        assert_eq!(Rotation::try_from(45), Err(InvalidRotation(45)));
        assert_eq!(Rotation::try_from(0), Err(InvalidRotation(0)));
        assert_eq!(Rotation::try_from(360), Err(InvalidRotation(360)));
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(Clockwise90.quarter_turns(), 1);
        assert_eq!(Clockwise180.quarter_turns(), 2);
        assert_eq!(Clockwise270.quarter_turns(), 3);
    }

    #[test]
    fn test_plan_display() {
        assert_eq!(plan(OrientationCode::Normal).to_string(), "identity");
        assert_eq!(
            plan(OrientationCode::Transverse).to_string(),
            "flip horizontal, then rotate 270 clockwise"
        );
    }

    #[test]
    fn test_empty_plan_len() {
        let empty = TransformPlan::EMPTY;
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.iter().count(), 0);
    }
}
