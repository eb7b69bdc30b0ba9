use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use engine_logging::{engine_info, engine_warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::job::{run_conversion, JobOutcome};
use crate::{ChannelProgressSink, ConversionRequest, Converter, EngineError, EngineEvent};

enum EngineCommand {
    Start(ConversionRequest),
    Cancel,
}

struct ActiveJob {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    /// Spawns the worker thread that owns the runtime and at most one job.
    pub fn new(converter: Arc<dyn Converter>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .build()
            .map_err(EngineError::Runtime)?;

        thread::Builder::new()
            .name("mailpdf-engine".to_string())
            .spawn(move || {
                let mut active: Option<ActiveJob> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Start(request) => {
                            if let Some(job) = active.take() {
                                if !job.task.is_finished() {
                                    if !job.cancel.is_cancelled() {
                                        engine_warn!("Start refused: a conversion is already running");
                                        let _ = event_tx.send(EngineEvent::Failed(
                                            EngineError::Busy.to_string(),
                                        ));
                                        active = Some(job);
                                        continue;
                                    }
                                    engine_info!("Waiting for the cancelled conversion to stop");
                                    if let Err(err) = runtime.block_on(job.task) {
                                        engine_warn!("Cancelled conversion ended abnormally: {}", err);
                                    }
                                }
                            }
                            let cancel = CancellationToken::new();
                            let task = runtime.spawn(handle_start(
                                converter.clone(),
                                request,
                                event_tx.clone(),
                                cancel.clone(),
                            ));
                            active = Some(ActiveJob { cancel, task });
                        }
                        EngineCommand::Cancel => match &active {
                            Some(job) if !job.task.is_finished() => job.cancel.cancel(),
                            _ => engine_info!("Cancel ignored: nothing is running"),
                        },
                    }
                }
                engine_info!("Engine command channel closed; worker exiting");
            })
            .map_err(EngineError::Runtime)?;

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    pub fn start(&self, request: ConversionRequest) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Start(request))
            .map_err(|_| EngineError::Unavailable)
    }

    /// Best effort. Documents already written are kept.
    pub fn cancel(&self) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Cancel)
            .map_err(|_| EngineError::Unavailable)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_start(
    converter: Arc<dyn Converter>,
    request: ConversionRequest,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    engine_info!("Conversion started for {}", request.archive_path.display());
    let sink = ChannelProgressSink::new(event_tx.clone());
    let event = match run_conversion(converter.as_ref(), &request, &sink, &cancel).await {
        Ok(JobOutcome::Completed(summary)) => EngineEvent::Finished(summary),
        Ok(JobOutcome::Cancelled(snapshot)) => EngineEvent::Cancelled(snapshot),
        Err(err) => {
            engine_warn!("Conversion failed: {}", err);
            EngineEvent::Failed(err.to_string())
        }
    };
    let _ = event_tx.send(event);
}
