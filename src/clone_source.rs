use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Refuse,
    Replace,
}

/// `dest_dir/new_name` with the source file's extension.
pub fn clone_destination(source: &Path, new_name: &str, dest_dir: &Path) -> PathBuf {
    let mut file_name = new_name.to_owned();
    if let Some(ext) = source.extension() {
        file_name.push('.');
        file_name.push_str(&ext.to_string_lossy());
    }
    dest_dir.join(file_name)
}

/// Copy a layer's backing file to `dest_dir` under `new_name`. The copy is
/// written to a temporary file in `dest_dir` and renamed into place, so an
/// existing destination is only replaced by a complete copy.
pub fn clone_source(
    source: &Path,
    new_name: &str,
    dest_dir: &Path,
    overwrite: Overwrite,
) -> Result<PathBuf> {
    let dest = clone_destination(source, new_name, dest_dir);

    if dest.exists() {
        // replacing the source with itself would delete it
        let same_file = fs::canonicalize(&dest)? == fs::canonicalize(source)?;
        if overwrite == Overwrite::Refuse || same_file {
            return Err(Error::FileExists(dest));
        }
        tracing::warn!(path = %dest.display(), "overwriting existing file");
    }

    let tmp = NamedTempFile::new_in(dest_dir)?;
    let bytes = fs::copy(source, tmp.path())?;
    tmp.persist(&dest).map_err(|e| e.error)?;
    tracing::info!(
        from = %source.display(),
        to = %dest.display(),
        bytes,
        "cloned layer source"
    );
    Ok(dest)
}
