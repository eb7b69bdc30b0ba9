use chrono::Local;
use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::{
    probe_archive, validate_output_directory, write_document, ConversionRequest,
    ConversionSummary, Converter, EngineError, EngineEvent, OutputPlan, ProgressSink,
    ProgressSnapshot, Stage,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(ConversionSummary),
    Cancelled(ProgressSnapshot),
}

/// One conversion run. Cancellation is checked between documents; a document
/// that has started is finished and kept.
pub async fn run_conversion(
    converter: &dyn Converter,
    request: &ConversionRequest,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<JobOutcome, EngineError> {
    let mut snapshot = ProgressSnapshot::new(Stage::Checking);
    sink.emit(EngineEvent::Progress(snapshot.clone()));

    let output_dir = validate_output_directory(&request.output_directory)?;
    let archive = probe_archive(&request.archive_path)?;
    if cancel.is_cancelled() {
        return Ok(JobOutcome::Cancelled(snapshot));
    }

    snapshot.stage = Stage::Counting;
    sink.emit(EngineEvent::Progress(snapshot.clone()));
    let total = converter.count_messages(&archive).await?;
    let plan = OutputPlan::new(
        Local::now(),
        request.base_name.as_str(),
        request.messages_per_document,
        total,
    );
    engine_info!(
        "Converting {} messages into {} document(s) in {}",
        total,
        plan.document_count(),
        output_dir.display()
    );

    snapshot.stage = Stage::Writing;
    snapshot.total_items = total;
    let document_count = u32::try_from(plan.document_count()).map_err(|_| {
        EngineError::Generation(format!(
            "{} documents exceed the supported sequence range",
            plan.document_count()
        ))
    })?;
    let mut documents = Vec::new();
    for sequence in 1..=document_count {
        if cancel.is_cancelled() {
            engine_info!(
                "Cancelled before document {}; {} document(s) kept",
                sequence,
                documents.len()
            );
            return Ok(JobOutcome::Cancelled(snapshot));
        }
        snapshot.current_document = sequence;
        sink.emit(EngineEvent::Progress(snapshot.clone()));

        let items = plan.items_for(sequence);
        let content = converter.render_document(&archive, items.clone()).await?;
        let path = write_document(&output_dir, &plan.name_for(sequence), &content)?;
        engine_debug!("Wrote {} ({} bytes)", path.display(), content.len());
        documents.push(path);

        snapshot.processed_items = items.end;
        sink.emit(EngineEvent::Progress(snapshot.clone()));
    }

    snapshot.stage = Stage::Done;
    sink.emit(EngineEvent::Progress(snapshot.clone()));
    Ok(JobOutcome::Completed(ConversionSummary {
        total_items: total,
        processed_items: snapshot.processed_items,
        documents,
    }))
}
