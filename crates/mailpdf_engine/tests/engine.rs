use std::fs;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mailpdf_engine::{
    ArchiveInfo, ConversionRequest, Converter, EngineError, EngineEvent, EngineHandle,
    PlaceholderConverter,
};
use tempfile::TempDir;

/// Slow enough per document that a cancel lands mid-run.
struct SlowConverter;

#[async_trait::async_trait]
impl Converter for SlowConverter {
    async fn count_messages(&self, _archive: &ArchiveInfo) -> Result<usize, EngineError> {
        Ok(100)
    }

    async fn render_document(
        &self,
        _archive: &ArchiveInfo,
        messages: Range<usize>,
    ) -> Result<Vec<u8>, EngineError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(format!("{messages:?}").into_bytes())
    }
}

fn wait_for_terminal(engine: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        match engine.try_recv() {
            Some(EngineEvent::Progress(_)) => continue,
            Some(event) => return event,
            None => std::thread::sleep(Duration::from_millis(5)),
        }
    }
    panic!("engine produced no terminal event");
}

fn request(temp: &TempDir) -> ConversionRequest {
    let archive = temp.path().join("archive.pst");
    fs::write(&archive, vec![7u8; 4096]).unwrap();
    ConversionRequest {
        archive_path: archive,
        messages_per_document: 5,
        base_name: "run".to_string(),
        output_directory: temp.path().to_path_buf(),
    }
}

#[test]
fn placeholder_run_finishes() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(Arc::new(PlaceholderConverter)).unwrap();

    engine.start(request(&temp)).unwrap();

    match wait_for_terminal(&engine) {
        EngineEvent::Finished(summary) => assert_eq!(summary.total_items, 0),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn failure_is_reported_as_text() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(Arc::new(PlaceholderConverter)).unwrap();
    let mut req = request(&temp);
    req.archive_path = temp.path().join("gone.pst");

    engine.start(req).unwrap();

    match wait_for_terminal(&engine) {
        EngineEvent::Failed(text) => assert!(text.contains("file not found"), "{text}"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn cancel_stops_between_documents() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(Arc::new(SlowConverter)).unwrap();

    engine.start(request(&temp)).unwrap();
    std::thread::sleep(Duration::from_millis(120));
    engine.cancel().unwrap();

    match wait_for_terminal(&engine) {
        EngineEvent::Cancelled(snapshot) => {
            assert!(snapshot.processed_items < snapshot.total_items);
            let written = fs::read_dir(temp.path())
                .unwrap()
                .filter(|entry| {
                    entry
                        .as_ref()
                        .is_ok_and(|e| e.file_name().to_string_lossy().ends_with(".pdf"))
                })
                .count();
            assert_eq!(written * 5, snapshot.processed_items);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn cancel_without_run_is_harmless() {
    engine_logging::initialize_for_tests();
    let engine = EngineHandle::new(Arc::new(PlaceholderConverter)).unwrap();
    engine.cancel().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert!(engine.try_recv().is_none());
}

#[test]
fn start_after_cancel_waits_for_the_old_job() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(Arc::new(SlowConverter)).unwrap();

    engine.start(request(&temp)).unwrap();
    std::thread::sleep(Duration::from_millis(80));
    engine.cancel().unwrap();
    engine.start(request(&temp)).unwrap();

    match wait_for_terminal(&engine) {
        EngineEvent::Cancelled(_) => {}
        other => panic!("expected the first job to stop, got {other:?}"),
    }
    engine.cancel().unwrap();
    match wait_for_terminal(&engine) {
        EngineEvent::Cancelled(_) => {}
        other => panic!("expected the second job to run, got {other:?}"),
    }
}

#[test]
fn start_while_running_is_refused_with_an_event() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(Arc::new(SlowConverter)).unwrap();

    engine.start(request(&temp)).unwrap();
    std::thread::sleep(Duration::from_millis(30));
    engine.start(request(&temp)).unwrap();

    match wait_for_terminal(&engine) {
        EngineEvent::Failed(text) => assert!(text.contains("backend busy"), "{text}"),
        other => panic!("unexpected event {other:?}"),
    }
    engine.cancel().unwrap();
    assert!(matches!(wait_for_terminal(&engine), EngineEvent::Cancelled(_)));
}
