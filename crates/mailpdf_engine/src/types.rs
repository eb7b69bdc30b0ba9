use std::path::PathBuf;

/// Everything a run needs, already validated by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub archive_path: PathBuf,
    pub messages_per_document: u32,
    pub base_name: String,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Checking,
    Counting,
    Writing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub stage: Stage,
    pub total_items: usize,
    pub processed_items: usize,
    /// 1-based; 0 until the first document is started.
    pub current_document: u32,
}

impl ProgressSnapshot {
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            stage,
            total_items: 0,
            processed_items: 0,
            current_document: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub total_items: usize,
    pub processed_items: usize,
    pub documents: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(ProgressSnapshot),
    Finished(ConversionSummary),
    /// Cooperative stop acknowledged; documents already written stay on disk.
    Cancelled(ProgressSnapshot),
    /// Terminal failure, as display text.
    Failed(String),
}
