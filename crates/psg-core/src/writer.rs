use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BuildError;
use crate::{FileKind, GeneratedFile};

/// What happened to a file handed to [`write_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// An existing scaffold file was left alone.
    Skipped(PathBuf),
}

/// Write `file` below `out`, creating parent directories. Existing files are
/// truncated, except scaffold files, which are kept unless `force` is set.
pub fn write_file(
    out: &Path,
    file: &GeneratedFile,
    force: bool,
) -> Result<WriteOutcome, BuildError> {
    let path = out.join(&file.path);

    if file.kind == FileKind::Scaffold && !force && path.exists() {
        log::info!("skipping existing {} (use --force to overwrite)", path.display());
        return Ok(WriteOutcome::Skipped(path));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, &file.content).map_err(|source| BuildError::Io {
        path: path.clone(),
        source,
    })?;
    log::debug!("wrote {}", path.display());
    Ok(WriteOutcome::Written(path))
}
