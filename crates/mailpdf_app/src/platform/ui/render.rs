use mailpdf_core::{
    pluralize, AppViewModel, Bundle, CapturedFailure, Field, LocalizedError, WizardStep,
};

use super::constants::PROGRESS_BAR_WIDTH;

const STEPS: [WizardStep; 4] = [
    WizardStep::FileSelection,
    WizardStep::Configuration,
    WizardStep::ProcessControl,
    WizardStep::Progress,
];

const FIELDS: [Field; 4] = [
    Field::FilePath,
    Field::MessagesPerDocument,
    Field::BaseName,
    Field::OutputDirectory,
];

pub fn render(bundle: &Bundle, view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", bundle.lookup("app.title", None))];
    lines.push(
        STEPS
            .iter()
            .map(|step| {
                let label = bundle.lookup(step.label_key(), None);
                if *step == view.step {
                    format!("[{label}]")
                } else {
                    label
                }
            })
            .collect::<Vec<_>>()
            .join("  "),
    );

    match &view.selected_file {
        Some(path) => lines.push(bundle.text("fileSelection.selected", &[("name", path.clone())])),
        None => lines.push(bundle.lookup("fileSelection.prompt", None)),
    }
    if let Some(error) = &view.file_error {
        push_error(bundle, &mut lines, error);
    }

    if let Some(draft) = &view.draft {
        let count = draft
            .messages_per_document
            .map(|n| n.to_string())
            .unwrap_or_default();
        let values = [
            (Field::MessagesPerDocument, count),
            (Field::BaseName, draft.base_name.clone()),
            (Field::OutputDirectory, draft.output_directory.clone()),
        ];
        for (field, value) in values {
            lines.push(format!("  {}: {}", field_label(bundle, field), value));
        }
        if view.directory_pick_pending {
            lines.push(format!("  {}", bundle.lookup("directory.picking", None)));
        }
        for field in FIELDS {
            for error in view.field_errors.get(&field).into_iter().flatten() {
                lines.push(format!(
                    "  {} {}: {}",
                    error.severity().badge(),
                    field_label(bundle, field),
                    error.user_message()
                ));
            }
        }
    }

    if matches!(view.step, WizardStep::ProcessControl | WizardStep::Progress) || view.running {
        push_progress(bundle, &mut lines, view);
    }

    if view.cancel_prompt_open {
        lines.push(bundle.lookup("cancel.title", None));
        lines.push(format!("  {}", bundle.lookup("cancel.message", None)));
        lines.push(format!(
            "  confirm: {}   keep: {}",
            bundle.lookup("cancel.confirm", None),
            bundle.lookup("cancel.keep", None)
        ));
    }

    if let Some(error) = &view.global_error {
        push_error(bundle, &mut lines, error);
    } else if let Some(notice) = &view.run_notice {
        push_error(bundle, &mut lines, notice);
    }
    for (index, action) in view.recovery.iter().enumerate() {
        let marker = if action.is_primary { " *" } else { "" };
        lines.push(format!("  {}) {}{}", index + 1, action.label, marker));
    }
    if view.blocked {
        lines.push(format!("  -> reset: {}", bundle.lookup("recovery.reset", None)));
    }

    lines
}

pub fn render_failure(bundle: &Bundle, failure: &CapturedFailure) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", bundle.lookup("boundary.title", None))];
    push_error(bundle, &mut lines, &failure.error);
    lines.push(bundle.text("boundary.errorId", &[("id", failure.id.clone())]));
    if let Some(location) = &failure.location {
        lines.push(format!("  at {location}"));
    }
    lines.push(format!(
        "  retry: {}   reload: {}   report: {}",
        bundle.lookup("boundary.retry", None),
        bundle.lookup("boundary.reload", None),
        bundle.lookup("boundary.report", None)
    ));
    lines
}

/// A classified error on its own, outside the wizard screen.
pub fn render_error(bundle: &Bundle, error: &LocalizedError) -> Vec<String> {
    let mut lines = Vec::new();
    push_error(bundle, &mut lines, error);
    lines
}

fn push_progress(bundle: &Bundle, lines: &mut Vec<String>, view: &AppViewModel) {
    let progress = &view.progress;
    lines.push(progress.status.clone());
    let filled = (view.percent as usize * PROGRESS_BAR_WIDTH) / 100;
    lines.push(format!(
        "  [{}{}] {:>3}%  {}/{}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        view.percent,
        progress.processed_items,
        progress.total_items
    ));
    if progress.current_document > 0 {
        let singular = bundle.lookup("progress.document", None);
        let plural = bundle.lookup("progress.documents", None);
        lines.push(format!(
            "  {} {}",
            progress.current_document,
            pluralize(i64::from(progress.current_document), &singular, &plural)
        ));
    }
}

fn push_error(bundle: &Bundle, lines: &mut Vec<String>, error: &LocalizedError) {
    lines.push(format!(
        "{} {}: {}",
        error.severity().badge(),
        bundle.lookup(error.severity().label_key(), None),
        error.user_message()
    ));
    for suggestion in error.suggestions() {
        lines.push(format!("    - {suggestion}"));
    }
}

fn field_label(bundle: &Bundle, field: Field) -> String {
    bundle.lookup(&format!("validation.fields.{}", field.as_str()), Some(field.as_str()))
}
