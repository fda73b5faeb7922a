//! In-place orientation correction for image files.
//!
//! [`OrientationFixer`] is the composition root: it reads the orientation,
//! asks the planner for a plan, and runs that plan through the first
//! configured backend that can handle the file. When a backend reports that
//! it cannot handle an image, the same plan is retried on the next one.
//!
//! At most one correction per path is in flight at a time; calls for
//! different paths run in parallel.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{execute, Backend, BackendError, CanvasBackend, ImageBackend};
use crate::metadata::{read_orientation, read_orientation_from_path};
use crate::orientation::{plan, OrientationCode, TransformPlan};

/// The backends a fixer can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// [`ImageBackend`]: JPEG, PNG and still GIF, keeps alpha.
    Image,
    /// [`CanvasBackend`]: JPEG only.
    Canvas,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Image => "image",
            BackendKind::Canvas => "canvas",
        }
    }

    fn open(self, path: &Path, jpeg_quality: u8) -> Result<Box<dyn Backend>, BackendError> {
        Ok(match self {
            BackendKind::Image => Box::new(ImageBackend::open(path, jpeg_quality)?),
            BackendKind::Canvas => Box::new(CanvasBackend::open(path, jpeg_quality)?),
        })
    }
}

/// Fixer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    /// Backends in order of preference.
    pub backends: Vec<BackendKind>,
    /// JPEG quality used when re-encoding (1-100).
    pub jpeg_quality: u8,
    /// Retry on the next backend when one cannot handle an image.
    pub fallback_on_unsupported: bool,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            backends: vec![BackendKind::Image, BackendKind::Canvas],
            jpeg_quality: 100,
            fallback_on_unsupported: true,
        }
    }
}

/// What a fix call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// No orientation metadata, or already upright. Nothing was written.
    Unchanged,
    /// The image was rewritten upright.
    Corrected {
        code: OrientationCode,
        plan: TransformPlan,
        backend: &'static str,
    },
}

impl Correction {
    pub fn is_corrected(&self) -> bool {
        matches!(self, Correction::Corrected { .. })
    }
}

/// Error types for orientation correction.
#[derive(Debug, Error)]
pub enum FixError {
    /// The configuration lists no backends.
    #[error("No backend configured")]
    NoBackend,

    /// Correcting a file failed; the file was left untouched.
    #[error("Failed to correct {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// Correcting an in-memory image failed.
    #[error("Failed to correct image: {0}")]
    Buffer(#[source] BackendError),
}

/// Corrects image orientation in place.
#[derive(Debug, Default)]
pub struct OrientationFixer {
    config: FixerConfig,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl OrientationFixer {
    pub fn new(config: FixerConfig) -> Self {
        Self {
            config,
            locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    /// Rewrite the file at `path` upright if its metadata asks for it.
    ///
    /// Unreadable or absent metadata counts as "already upright". On error
    /// the file is left byte-for-byte unchanged.
    pub fn fix_path(&self, path: &Path) -> Result<Correction, FixError> {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let lock = self.locks.entry(key.clone()).or_default().clone();

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.fix_path_locked(path)
        };

        drop(lock);
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    fn fix_path_locked(&self, path: &Path) -> Result<Correction, FixError> {
        let Some(code) = OrientationCode::parse(read_orientation_from_path(path)) else {
            debug!("{}: no orientation correction needed", path.display());
            return Ok(Correction::Unchanged);
        };

        if self.config.backends.is_empty() {
            return Err(FixError::NoBackend);
        }

        let mut last_error = None;
        for &kind in &self.config.backends {
            let attempt = kind
                .open(path, self.config.jpeg_quality)
                .and_then(|mut backend| execute(plan(code), &mut backend));

            match attempt {
                Ok(()) => {
                    info!(
                        "{}: corrected orientation {} ({}) with {} backend",
                        path.display(),
                        code.value(),
                        plan(code),
                        kind.name()
                    );
                    return Ok(Correction::Corrected {
                        code,
                        plan: plan(code),
                        backend: kind.name(),
                    });
                }
                Err(e) if e.is_unsupported() && self.config.fallback_on_unsupported => {
                    warn!("{}: {} backend skipped: {}", path.display(), kind.name(), e);
                    last_error = Some(e);
                }
                Err(e) => {
                    return Err(FixError::File {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            }
        }

        match last_error {
            Some(source) => Err(FixError::File {
                path: path.to_path_buf(),
                source,
            }),
            None => Err(FixError::NoBackend),
        }
    }

    /// Correct an encoded image held in memory.
    ///
    /// Returns the input unchanged when no correction is needed. Uses the
    /// image backend regardless of the configured list, since only it can
    /// re-encode every supported format without a file.
    pub fn fix_bytes(&self, bytes: &[u8]) -> Result<(Vec<u8>, Correction), FixError> {
        let Some(code) = OrientationCode::parse(read_orientation(bytes)) else {
            debug!("no orientation correction needed");
            return Ok((bytes.to_vec(), Correction::Unchanged));
        };

        let mut backend =
            ImageBackend::from_bytes(bytes, self.config.jpeg_quality).map_err(FixError::Buffer)?;
        execute(plan(code), &mut backend).map_err(FixError::Buffer)?;

        let output = backend.into_output().unwrap_or_default();
        info!("corrected orientation {} ({}) in memory", code.value(), plan(code));

        Ok((
            output,
            Correction::Corrected {
                code,
                plan: plan(code),
                backend: BackendKind::Image.name(),
            },
        ))
    }
}
