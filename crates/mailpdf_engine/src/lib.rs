//! mailpdf engine: archive checks, output naming and the conversion worker.
mod archive;
mod convert;
mod directory;
mod engine;
mod error;
mod filename;
mod job;
mod persist;
mod types;

pub use archive::{probe_archive, ArchiveInfo};
pub use convert::{ChannelProgressSink, Converter, PlaceholderConverter, ProgressSink};
pub use directory::{validate_output_directory, MAX_DIRECTORY_PATH_LEN};
pub use engine::EngineHandle;
pub use error::{DirectoryError, EngineError};
pub use filename::{output_document_name, OutputPlan};
pub use job::{run_conversion, JobOutcome};
pub use persist::write_document;
pub use tokio_util::sync::CancellationToken;
pub use types::{ConversionRequest, ConversionSummary, EngineEvent, ProgressSnapshot, Stage};
