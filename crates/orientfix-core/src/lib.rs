//! orientfix Core - EXIF orientation normalization
//!
//! This crate rewrites images whose pixels are stored in sensor orientation
//! so that they display upright without relying on the EXIF orientation tag.
//!
//! # Module Structure
//!
//! - `orientation` - Orientation codes and the table mapping them to transform plans
//! - `backend` - The pixel backend capability set, the plan executor, and two backends
//! - `metadata` - EXIF orientation extraction and EXIF/ICC carry-over on rewrite
//! - `codec` - Decoding and re-encoding of JPEG, PNG and GIF
//! - `fixer` - Per-file correction with backend selection and per-path locking
//!
//! # Example
//!
//! ```ignore
//! use orientfix_core::{plan, OrientationCode, OrientationFixer};
//!
//! // Pure planning
//! if let Some(code) = OrientationCode::parse(Some(6)) {
//!     println!("{}", plan(code)); // "rotate 90 clockwise"
//! }
//!
//! // In-place correction
//! let fixer = OrientationFixer::default();
//! fixer.fix_path("photo.jpg".as_ref())?;
//! ```

pub mod backend;
pub mod codec;
pub mod fixer;
pub mod metadata;
pub mod orientation;

#[cfg(test)]
mod test_support;

pub use backend::{execute, Backend, BackendError, Canvas, CanvasBackend, ImageBackend};
pub use fixer::{BackendKind, Correction, FixError, FixerConfig, OrientationFixer};
pub use orientation::{plan, Operation, OrientationCode, Rotation, TransformPlan};
