use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Display strings keep the phrases the front-end classifier keys on
/// ("file not found", "permission denied", "directory not found", ...).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("file not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),
    #[error("invalid PST file {}: {reason}", path.display())]
    InvalidArchive { path: PathBuf, reason: String },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("permission denied writing {}: {source}", path.display())]
    PermissionDenied { path: PathBuf, source: io::Error },
    #[error("insufficient space writing {}", .0.display())]
    InsufficientSpace(PathBuf),
    #[error("PDF generation failed: {0}")]
    Generation(String),
    #[error("backend runtime could not start: {0}")]
    Runtime(io::Error),
    #[error("backend worker is not running")]
    Unavailable,
    #[error("backend busy: a conversion is already running")]
    Busy,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory not found: no output directory given")]
    Empty,
    #[error("invalid directory path: contains a NUL byte")]
    NulByte,
    #[error("invalid directory path: {len} characters exceed the limit of {max}")]
    TooLong { len: usize, max: usize },
    #[error("invalid directory path: reserved device name '{0}'")]
    ReservedName(String),
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("directory not found: {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("permission denied: cannot write to {}: {source}", path.display())]
    NotWritable { path: PathBuf, source: io::Error },
}
