//! Pixel backends and the plan executor.
//!
//! A [`Backend`] is anything that can rotate and mirror a whole canvas and
//! later commit the result. Backends expose the canonical vocabulary of
//! [`crate::orientation::Operation`] (clockwise rotation, horizontal and
//! vertical flips) and translate to their own primitives internally. They
//! never hold their own orientation table.
//!
//! # Execution contract
//!
//! [`execute`] applies every operation of a plan in order and then calls
//! [`Backend::persist`] exactly once. If an operation fails, `persist` is not
//! called and the original medium is left as it was.
//!
//! # Backends
//!
//! - [`ImageBackend`] - `image::DynamicImage`, JPEG/PNG/GIF, keeps alpha
//! - [`CanvasBackend`] - plain RGB canvas with counter-clockwise native rotation

mod canvas;
mod dynamic;
mod persist;

use thiserror::Error;

use crate::codec::CodecError;
use crate::orientation::{Operation, Rotation, TransformPlan};

pub use canvas::{Axis, Canvas, CanvasBackend};
pub use dynamic::ImageBackend;
pub(crate) use persist::write_atomic;

/// Error types for backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend cannot carry out an operation for this image.
    #[error("{backend} backend cannot {operation}: {reason}")]
    UnsupportedOperation {
        backend: &'static str,
        operation: String,
        reason: String,
    },

    /// Decoding or encoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error while reading the source or committing the result.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `persist` was called more than once.
    #[error("{0} backend has already persisted its result")]
    AlreadyPersisted(&'static str),
}

impl BackendError {
    /// Returns true if a different backend might succeed where this one failed.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            BackendError::UnsupportedOperation { .. }
                | BackendError::Codec(CodecError::UnsupportedFormat(_))
        )
    }
}

/// The capability set a pixel backend must provide.
///
/// Implementations stage every change in memory; nothing reaches the
/// original medium before [`Backend::persist`].
pub trait Backend {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Rotate the full canvas clockwise, swapping dimensions for 90 and 270.
    fn rotate_clockwise(&mut self, rotation: Rotation) -> Result<(), BackendError>;

    /// Mirror left-right in place.
    fn flip_horizontal(&mut self) -> Result<(), BackendError>;

    /// Mirror top-bottom in place.
    fn flip_vertical(&mut self) -> Result<(), BackendError>;

    /// Commit the staged result back to the original storage location.
    fn persist(&mut self) -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn rotate_clockwise(&mut self, rotation: Rotation) -> Result<(), BackendError> {
        (**self).rotate_clockwise(rotation)
    }

    fn flip_horizontal(&mut self) -> Result<(), BackendError> {
        (**self).flip_horizontal()
    }

    fn flip_vertical(&mut self) -> Result<(), BackendError> {
        (**self).flip_vertical()
    }

    fn persist(&mut self) -> Result<(), BackendError> {
        (**self).persist()
    }
}

/// Apply a single operation through a backend's primitives.
pub fn apply<B: Backend + ?Sized>(backend: &mut B, op: Operation) -> Result<(), BackendError> {
    match op {
        Operation::RotateClockwise(rotation) => backend.rotate_clockwise(rotation),
        Operation::FlipHorizontal => backend.flip_horizontal(),
        Operation::FlipVertical => backend.flip_vertical(),
    }
}

/// Run a plan against a backend and persist the result.
///
/// Operations run strictly in order. The first failure aborts the run before
/// `persist` is reached.
pub fn execute<B: Backend + ?Sized>(plan: TransformPlan, backend: &mut B) -> Result<(), BackendError> {
    for op in plan {
        apply(backend, op)?;
    }
    backend.persist()
}
