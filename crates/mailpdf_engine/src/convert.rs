use std::ops::Range;
use std::sync::mpsc;

use engine_logging::engine_warn;

use crate::{ArchiveInfo, EngineError, EngineEvent};

/// Reads messages out of an archive and renders them. The engine owns
/// batching, naming, writing and cancellation.
#[async_trait::async_trait]
pub trait Converter: Send + Sync {
    async fn count_messages(&self, archive: &ArchiveInfo) -> Result<usize, EngineError>;

    /// Renders the messages in `messages` into one document.
    async fn render_document(
        &self,
        archive: &ArchiveInfo,
        messages: Range<usize>,
    ) -> Result<Vec<u8>, EngineError>;
}

/// Stands in until a real archive reader exists: finds no messages, so a run
/// completes immediately without writing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderConverter;

#[async_trait::async_trait]
impl Converter for PlaceholderConverter {
    async fn count_messages(&self, archive: &ArchiveInfo) -> Result<usize, EngineError> {
        engine_warn!(
            "Archive reading is not implemented; treating {} as empty",
            archive.path.display()
        );
        Ok(0)
    }

    async fn render_document(
        &self,
        _archive: &ArchiveInfo,
        messages: Range<usize>,
    ) -> Result<Vec<u8>, EngineError> {
        Err(EngineError::Generation(format!(
            "no renderer available for messages {}..{}",
            messages.start, messages.end
        )))
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
