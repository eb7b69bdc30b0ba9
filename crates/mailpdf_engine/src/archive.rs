use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use engine_logging::engine_info;

use crate::EngineError;

const ARCHIVE_EXTENSION: &str = "pst";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Cheap checks before any conversion work: the archive exists, is a regular
/// file with the archive extension and is not empty.
pub fn probe_archive(path: &Path) -> Result<ArchiveInfo, EngineError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(EngineError::ArchiveNotFound(path.to_path_buf()))
        }
        Err(err) => return Err(EngineError::Io(err)),
    };
    let invalid = |reason: &str| EngineError::InvalidArchive {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !meta.is_file() {
        return Err(invalid("not a regular file"));
    }
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
    if !has_extension {
        return Err(invalid("wrong extension"));
    }
    if meta.len() == 0 {
        return Err(invalid("file is empty"));
    }

    let info = ArchiveInfo {
        path: path.to_path_buf(),
        size: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    };
    engine_info!("Archive {} probed: {} bytes", path.display(), info.size);
    Ok(info)
}
