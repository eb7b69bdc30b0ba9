use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::EngineError;

/// Writes `{dir}/{name}` through a temp file and a rename, so a failed or
/// interrupted write never leaves a partial document behind. An existing
/// document of the same name is replaced.
pub fn write_document(dir: &Path, name: &str, content: &[u8]) -> Result<PathBuf, EngineError> {
    let target = dir.join(name);
    let classify = |err: io::Error| map_write_error(&target, err);

    let mut tmp = NamedTempFile::new_in(dir).map_err(classify)?;
    tmp.write_all(content).map_err(classify)?;
    tmp.flush().map_err(classify)?;
    tmp.as_file_mut().sync_all().map_err(classify)?;

    if target.exists() {
        fs::remove_file(&target).map_err(classify)?;
    }
    tmp.persist(&target).map_err(|e| classify(e.error))?;
    Ok(target)
}

fn map_write_error(target: &Path, err: io::Error) -> EngineError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => EngineError::PermissionDenied {
            path: target.to_path_buf(),
            source: err,
        },
        io::ErrorKind::StorageFull => EngineError::InsufficientSpace(target.to_path_buf()),
        _ => EngineError::Io(err),
    }
}
