use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use mailpdf_core::{Bundle, Effect, Msg, ProcessingConfig, ProcessingProgress};
use mailpdf_engine::{
    ConversionRequest, ConversionSummary, EngineError, EngineEvent, EngineHandle,
    PlaceholderConverter, ProgressSnapshot, Stage,
};

use super::app::Inbound;

/// Executes backend effects and feeds engine events back as messages.
/// Directory picking is interactive and stays with the console loop.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
    inbound: mpsc::Sender<Inbound>,
}

impl EffectRunner {
    pub fn new(bundle: Arc<Bundle>, inbound: mpsc::Sender<Inbound>) -> Result<Self, EngineError> {
        let engine = Arc::new(EngineHandle::new(Arc::new(PlaceholderConverter))?);
        let runner = Self { engine, inbound };
        runner.spawn_event_loop(bundle);
        Ok(runner)
    }

    pub fn run(&self, effect: Effect) {
        let result = match effect {
            Effect::StartProcessing(config) => {
                engine_info!(
                    "StartProcessing file={} per_document={} base={} dir={}",
                    config.file_path,
                    config.messages_per_document,
                    config.base_name,
                    config.output_directory
                );
                self.engine.start(to_request(&config))
            }
            Effect::CancelProcessing => {
                engine_info!("CancelProcessing");
                self.engine.cancel()
            }
            Effect::PickOutputDirectory => {
                engine_warn!("PickOutputDirectory reached the effect runner; ignored");
                Ok(())
            }
        };
        if let Err(err) = result {
            engine_warn!("Engine command failed: {}", err);
            let _ = self
                .inbound
                .send(Inbound::Msg(Msg::ProcessingFailed(err.to_string())));
        }
    }

    fn spawn_event_loop(&self, bundle: Arc<Bundle>) {
        let engine = Arc::clone(&self.engine);
        let inbound = self.inbound.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if let Some(msg) = map_event(&bundle, event) {
                    if inbound.send(Inbound::Msg(msg)).is_err() {
                        break;
                    }
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn to_request(config: &ProcessingConfig) -> ConversionRequest {
    ConversionRequest {
        archive_path: PathBuf::from(&config.file_path),
        messages_per_document: config.messages_per_document,
        base_name: config.base_name.clone(),
        output_directory: PathBuf::from(&config.output_directory),
    }
}

fn map_event(bundle: &Bundle, event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress(snapshot) => {
            Some(Msg::ProgressReported(progress_from(bundle, &snapshot)))
        }
        EngineEvent::Finished(summary) => {
            Some(Msg::ProgressReported(finished_from(bundle, &summary)))
        }
        EngineEvent::Cancelled(snapshot) => {
            engine_info!(
                "Engine stopped after {}/{} messages",
                snapshot.processed_items,
                snapshot.total_items
            );
            None
        }
        EngineEvent::Failed(text) => Some(Msg::ProcessingFailed(text)),
    }
}

fn progress_from(bundle: &Bundle, snapshot: &ProgressSnapshot) -> ProcessingProgress {
    let status = match snapshot.stage {
        Stage::Checking | Stage::Counting => bundle.lookup("progress.starting", None),
        Stage::Writing | Stage::Done => bundle.text(
            "progress.running",
            &[
                ("processed", snapshot.processed_items.to_string()),
                ("total", snapshot.total_items.to_string()),
            ],
        ),
    };
    ProcessingProgress {
        total_items: snapshot.total_items,
        processed_items: snapshot.processed_items,
        current_document: snapshot.current_document,
        status,
        ..ProcessingProgress::default()
    }
}

fn finished_from(bundle: &Bundle, summary: &ConversionSummary) -> ProcessingProgress {
    ProcessingProgress {
        total_items: summary.total_items,
        processed_items: summary.processed_items,
        current_document: u32::try_from(summary.documents.len()).unwrap_or(u32::MAX),
        status: bundle.lookup("progress.complete", None),
        is_complete: true,
        ..ProcessingProgress::default()
    }
}
