//! Orientation codes and the transform plans that correct them.
//!
//! This module is pure: no I/O, no shared state, no knowledge of backends.
//!
//! # Flow
//!
//! 1. A raw metadata value (possibly absent) goes through [`OrientationCode::parse`].
//! 2. If that yields a code, [`plan`] maps it to a [`TransformPlan`].
//! 3. The plan is handed to a [`crate::backend::Backend`] via [`crate::backend::execute`].
//!
//! # Conventions
//!
//! - Rotations are clockwise, in degrees (90, 180 or 270)
//! - Mirroring is applied before rotation within a plan
//! - Origin is the top-left corner

mod code;
mod plan;

pub use code::{InvalidOrientationCode, OrientationCode};
pub use plan::{plan, InvalidRotation, Operation, Rotation, TransformPlan};
