//! Atomic replacement of an image file.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

/// Unique hidden sibling of `target`, e.g. `dir/.photo.jpg.a1B2c3.orientfix-tmp`.
fn sibling_temp_file(target: &Path) -> io::Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut prefix = OsString::from(".");
    prefix.push(target.file_name().unwrap_or_default());
    prefix.push(".");

    Builder::new()
        .prefix(&prefix)
        .suffix(".orientfix-tmp")
        .tempfile_in(dir)
}

/// Replaces the file at `path` with `content` atomically.
///
/// Symlinks are followed: the file they point at is replaced and the link
/// is kept. The content goes to a uniquely named temporary file next to the
/// target, which is then renamed over it with the target's permissions. On
/// failure the temporary file is removed and the target is left
/// byte-for-byte unchanged.
///
/// # Errors
///
/// Returns an error if writing or renaming fails.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let mut temp = sibling_temp_file(&target)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(&target) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(&target)?;
    Ok(())
}
