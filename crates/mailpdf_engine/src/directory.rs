use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use tempfile::NamedTempFile;

use crate::DirectoryError;

pub const MAX_DIRECTORY_PATH_LEN: usize = 250;

const RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks that `dir` can receive output documents: plausible path, existing
/// directory, and a successful write probe. Nothing is created.
pub fn validate_output_directory(dir: &Path) -> Result<PathBuf, DirectoryError> {
    let text = dir.to_string_lossy();
    if text.trim().is_empty() {
        return Err(DirectoryError::Empty);
    }
    if text.contains('\0') {
        return Err(DirectoryError::NulByte);
    }
    let len = text.chars().count();
    if len > MAX_DIRECTORY_PATH_LEN {
        return Err(DirectoryError::TooLong {
            len,
            max: MAX_DIRECTORY_PATH_LEN,
        });
    }
    if let Some(name) = dir
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .find(|name| is_reserved_windows_name(name))
    {
        return Err(DirectoryError::ReservedName(name.to_string()));
    }

    let meta = fs::metadata(dir).map_err(|_| DirectoryError::NotFound(dir.to_path_buf()))?;
    if !meta.is_dir() {
        return Err(DirectoryError::NotADirectory(dir.to_path_buf()));
    }

    // The probe file is removed when it drops.
    NamedTempFile::new_in(dir).map_err(|source| DirectoryError::NotWritable {
        path: dir.to_path_buf(),
        source,
    })?;
    engine_debug!("Output directory {} is writable", dir.display());
    Ok(dir.to_path_buf())
}

fn is_reserved_windows_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_ignore_case_and_extension() {
        assert!(is_reserved_windows_name("con"));
        assert!(is_reserved_windows_name("LPT1.txt"));
        assert!(!is_reserved_windows_name("console"));
        assert!(!is_reserved_windows_name("COM10"));
    }
}
