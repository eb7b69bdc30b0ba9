use std::sync::{Arc, Once};

use mailpdf_core::{
    update, AppState, Bundle, ConfigChange, Effect, ErrorCode, FileCandidate, Locale, Msg,
    ProcessingConfig, ProcessingProgress, Rect, RecoveryCommand, WizardSettings, WizardStep,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn english_state() -> AppState {
    AppState::with_settings(
        Arc::new(Bundle::for_locale(Locale::En)),
        WizardSettings::default(),
    )
}

fn send(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    msgs.into_iter().fold((state, Vec::new()), |(state, mut all), msg| {
        let (next, effects) = update(state, msg);
        all.extend(effects);
        (next, all)
    })
}

fn archive() -> FileCandidate {
    FileCandidate::new("/mail/archive.pst", 5000)
}

fn configured() -> AppState {
    let (state, _) = send(
        english_state(),
        vec![
            Msg::FileChosen(archive()),
            Msg::ConfigChanged(ConfigChange::MessagesPerDocument(Some(10))),
            Msg::ConfigChanged(ConfigChange::BaseName("emails_archiv".to_string())),
            Msg::ConfigChanged(ConfigChange::OutputDirectory("/out".to_string())),
        ],
    );
    state
}

fn running() -> AppState {
    let (state, _) = update(configured(), Msg::StartClicked);
    state
}

fn expected_config() -> ProcessingConfig {
    ProcessingConfig {
        file_path: "/mail/archive.pst".to_string(),
        messages_per_document: 10,
        base_name: "emails_archiv".to_string(),
        output_directory: "/out".to_string(),
    }
}

fn complete(processed: usize, total: usize) -> ProcessingProgress {
    ProcessingProgress {
        total_items: total,
        processed_items: processed,
        current_document: 1,
        status: "done".to_string(),
        is_complete: true,
        ..ProcessingProgress::default()
    }
}

#[test]
fn happy_path_reaches_process_control_and_completes() {
    init_logging();
    let (state, _) = update(english_state(), Msg::FileChosen(archive()));
    assert_eq!(state.step(), WizardStep::Configuration);
    assert_eq!(state.view().selected_file.as_deref(), Some("/mail/archive.pst"));

    let (state, _) = update(
        state,
        Msg::ConfigChanged(ConfigChange::MessagesPerDocument(Some(30))),
    );
    let view = state.view();
    assert_eq!(view.step, WizardStep::Configuration);
    assert!(view.config.is_none());
    let count_errors = &view.field_errors[&mailpdf_core::Field::MessagesPerDocument];
    assert_eq!(count_errors[0].code(), ErrorCode::TooBig);

    let state = configured();
    assert_eq!(state.step(), WizardStep::ProcessControl);
    assert_eq!(state.config(), Some(&expected_config()));

    let (state, effects) = update(state, Msg::StartClicked);
    assert_eq!(effects, vec![Effect::StartProcessing(expected_config())]);
    assert!(state.is_running());
    assert_eq!(state.step(), WizardStep::Progress);
    assert_eq!(state.progress().status, "Starting processing...");
    assert!(state.progress().started_at.is_some());

    let (state, effects) = update(state, Msg::ProgressReported(complete(40, 40)));
    assert!(effects.is_empty());
    assert!(!state.is_running());
    assert!(state.global_error().is_none());
    assert_eq!(state.view().percent, 100);
    assert!(state.progress().completed_at.is_some());
}

#[test]
fn start_without_config_is_noop() {
    init_logging();
    let (state, _) = update(english_state(), Msg::FileChosen(archive()));
    let (next, effects) = update(state.clone(), Msg::StartClicked);

    assert!(effects.is_empty());
    assert!(!next.is_running());
    assert_eq!(next.step(), WizardStep::Configuration);
}

#[test]
fn second_start_while_running_is_ignored() {
    init_logging();
    let (state, effects) = update(running(), Msg::StartClicked);
    assert!(effects.is_empty());
    assert!(state.is_running());
}

#[test]
fn invalid_edit_withdraws_committed_config() {
    init_logging();
    let (state, _) = update(
        configured(),
        Msg::ConfigChanged(ConfigChange::BaseName("bad name".to_string())),
    );
    assert_eq!(state.step(), WizardStep::Configuration);
    assert!(state.config().is_none());

    let (state, effects) = update(state, Msg::StartClicked);
    assert!(effects.is_empty());
    assert!(!state.is_running());
}

#[test]
fn unparsable_count_text_is_invalid_type() {
    init_logging();
    let (state, _) = update(
        configured(),
        Msg::ConfigChanged(ConfigChange::MessagesPerDocumentText("ten".to_string())),
    );
    let view = state.view();
    assert!(view.config.is_none());
    assert_eq!(
        view.field_errors[&mailpdf_core::Field::MessagesPerDocument][0].code(),
        ErrorCode::InvalidType
    );

    let (state, _) = update(
        state,
        Msg::ConfigChanged(ConfigChange::MessagesPerDocumentText(" 12 ".to_string())),
    );
    assert_eq!(state.config().map(|c| c.messages_per_document), Some(12));
}

#[test]
fn clearing_the_file_returns_to_selection_from_every_step() {
    init_logging();
    let (after_file, _) = update(english_state(), Msg::FileChosen(archive()));
    for state in [after_file, configured(), running()] {
        let was_running = state.is_running();
        let (cleared, effects) = update(state, Msg::FileCleared);
        if was_running {
            assert_eq!(effects, vec![Effect::CancelProcessing]);
        } else {
            assert!(effects.is_empty());
        }
        assert!(!cleared.is_running());
        assert_eq!(cleared.step(), WizardStep::FileSelection);
        assert!(cleared.form().is_none());
        assert!(cleared.config().is_none());
        assert!(cleared.view().selected_file.is_none());
    }
}

#[test]
fn cancel_needs_confirmation() {
    init_logging();
    let before = running();
    let (state, effects) = update(before.clone(), Msg::CancelClicked);
    assert!(effects.is_empty());
    assert!(state.cancel_prompt_open());
    assert!(state.is_running());
    assert_eq!(state.progress(), before.progress());

    let (state, effects) = update(state, Msg::CancelDismissed);
    assert!(effects.is_empty());
    assert!(!state.cancel_prompt_open());
    assert!(state.is_running());

    let (state, effects) = send(state, vec![Msg::CancelClicked, Msg::CancelConfirmed]);
    assert_eq!(effects, vec![Effect::CancelProcessing]);
    assert!(!state.is_running());
    assert_eq!(state.step(), WizardStep::ProcessControl);
    assert!(state.progress().is_cancelled);
    assert_eq!(
        state.progress().error.as_deref(),
        Some("Processing cancelled. PDF files created so far are kept.")
    );
    assert_eq!(state.run_notice().map(|e| e.code()), Some(ErrorCode::Cancelled));
    assert!(state.global_error().is_none());

    let (state, effects) = update(state, Msg::CancelConfirmed);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::ProgressReported(complete(3, 3)));
    assert!(state.progress().is_cancelled);
    assert!(!state.is_running());
}

#[test]
fn cancel_click_when_idle_does_nothing() {
    init_logging();
    let state = configured();
    let (next, effects) = update(state.clone(), Msg::CancelClicked);
    assert!(effects.is_empty());
    assert!(!next.cancel_prompt_open());
}

#[test]
fn cancelled_run_offers_retry() {
    init_logging();
    let (state, _) = send(running(), vec![Msg::CancelClicked, Msg::CancelConfirmed]);
    let view = state.view();
    let commands: Vec<(RecoveryCommand, bool)> = view
        .recovery
        .iter()
        .map(|action| (action.invoke, action.is_primary))
        .collect();
    assert_eq!(
        commands,
        vec![(RecoveryCommand::Retry, true), (RecoveryCommand::Reset, false)]
    );

    let (state, effects) = update(state, Msg::RecoveryInvoked(RecoveryCommand::Retry));
    assert_eq!(effects, vec![Effect::StartProcessing(expected_config())]);
    assert!(state.is_running());
    assert!(state.run_notice().is_none());
    assert!(!state.progress().is_cancelled);
}

#[test]
fn backend_failure_is_classified_and_stops_run() {
    init_logging();
    let (state, _) = update(
        running(),
        Msg::ProcessingFailed("file not found: /mail/archive.pst".to_string()),
    );
    assert!(!state.is_running());
    let error = state.global_error().expect("global error");
    assert_eq!(error.code(), ErrorCode::FileNotFound);

    let commands: Vec<RecoveryCommand> =
        state.view().recovery.iter().map(|a| a.invoke).collect();
    assert_eq!(
        commands,
        vec![RecoveryCommand::SelectNewFile, RecoveryCommand::Reset]
    );

    let (state, _) = update(state, Msg::RecoveryInvoked(RecoveryCommand::SelectNewFile));
    assert_eq!(state.step(), WizardStep::FileSelection);
    assert!(state.global_error().is_none());
}

#[test]
fn progress_error_ends_run() {
    init_logging();
    let failed = ProcessingProgress {
        total_items: 10,
        processed_items: 4,
        error: Some("PDF generation failed for item 5".to_string()),
        ..ProcessingProgress::default()
    };
    let (state, _) = update(running(), Msg::ProgressReported(failed));
    assert!(!state.is_running());
    assert_eq!(
        state.global_error().map(|e| e.code()),
        Some(ErrorCode::GenerationFailed)
    );
    assert_eq!(state.view().percent, 40);
}

#[test]
fn unknown_failure_blocks_until_reset() {
    init_logging();
    let (state, _) = update(running(), Msg::ProcessingFailed("kaboom".to_string()));
    assert!(state.is_blocked());
    assert!(state.view().blocked);
    assert!(state.view().recovery.is_empty());

    let (state, effects) = send(
        state,
        vec![
            Msg::FileChosen(FileCandidate::new("/other.pst", 9000)),
            Msg::StartClicked,
            Msg::ErrorDismissed,
            Msg::RecoveryInvoked(RecoveryCommand::Retry),
        ],
    );
    assert!(effects.is_empty());
    assert!(state.is_blocked());
    assert_eq!(state.view().selected_file.as_deref(), Some("/mail/archive.pst"));

    let (state, _) = update(state, Msg::ResetClicked);
    assert!(!state.is_blocked());
    assert_eq!(state.step(), WizardStep::FileSelection);
    assert!(state.config().is_none());
}

#[test]
fn out_of_range_progress_is_caught_by_handler_boundary() {
    init_logging();
    let bogus = ProcessingProgress {
        total_items: 2,
        processed_items: 5,
        ..ProcessingProgress::default()
    };
    let (state, effects) = update(running(), Msg::ProgressReported(bogus));
    assert!(effects.is_empty());
    assert!(state.is_running());
    let error = state.global_error().expect("handler failure surfaced");
    assert_eq!(error.code(), ErrorCode::Unknown);
    assert!(error.message().contains("progress out of range"));
}

#[test]
fn out_of_range_final_progress_still_ends_the_run() {
    init_logging();
    let (state, _) = update(running(), Msg::CancelClicked);
    let (state, effects) = update(state, Msg::ProgressReported(complete(5, 2)));
    assert!(effects.is_empty());
    assert!(!state.is_running());
    assert!(!state.cancel_prompt_open());
    assert_eq!(state.global_error().map(|e| e.code()), Some(ErrorCode::Unknown));
}

#[test]
fn reset_during_a_run_cancels_the_backend_job() {
    init_logging();
    let (state, effects) = update(running(), Msg::ResetClicked);
    assert_eq!(effects, vec![Effect::CancelProcessing]);
    assert!(!state.is_running());
    assert_eq!(state.step(), WizardStep::FileSelection);

    // The old job's last snapshots must not leak into the fresh wizard.
    let (state, _) = update(state, Msg::ProgressReported(complete(4, 10)));
    assert_eq!(state.progress().processed_items, 0);
    assert!(state.global_error().is_none());

    let (state, effects) = update(state, Msg::ResetClicked);
    assert!(effects.is_empty());
    assert!(!state.is_running());
}

#[test]
fn recovery_reset_during_a_run_cancels_too() {
    init_logging();
    let (state, effects) = update(running(), Msg::RecoveryInvoked(RecoveryCommand::Reset));
    assert_eq!(effects, vec![Effect::CancelProcessing]);
    assert!(!state.is_running());
}

#[test]
fn dropping_nothing_or_many_is_rejected() {
    init_logging();
    let (state, _) = update(english_state(), Msg::FilesDropped(Vec::new()));
    let view = state.view();
    assert_eq!(view.step, WizardStep::FileSelection);
    let error = view.file_error.expect("file error");
    assert_eq!(error.code(), ErrorCode::NoFileDropped);
    assert_eq!(error.user_message(), "No file detected.");

    let (state, _) = update(
        state,
        Msg::FilesDropped(vec![archive(), FileCandidate::new("/b.pst", 8000)]),
    );
    let error = state.view().file_error.expect("file error");
    assert_eq!(error.code(), ErrorCode::MultipleFilesDropped);
    assert_eq!(
        error.context().and_then(|ctx| ctx.get("count")).map(String::as_str),
        Some("2")
    );

    let (state, _) = update(state, Msg::FilesDropped(vec![archive()]));
    assert_eq!(state.step(), WizardStep::Configuration);
    assert!(state.view().file_error.is_none());
}

#[test]
fn rejected_files_keep_the_wizard_on_selection() {
    init_logging();
    let cases = [
        (FileCandidate::new("/mail/notes.txt", 5000), ErrorCode::InvalidFormat),
        (FileCandidate::new("/mail/empty.pst", 0), ErrorCode::FileEmpty),
        (FileCandidate::new("/mail/tiny.PST", 100), ErrorCode::FileTooSmall),
    ];
    for (candidate, code) in cases {
        let (state, _) = update(english_state(), Msg::FileChosen(candidate));
        assert_eq!(state.step(), WizardStep::FileSelection);
        assert_eq!(state.view().file_error.map(|e| e.code()), Some(code));
    }
}

#[test]
fn drag_leave_into_child_keeps_hover() {
    init_logging();
    let (state, _) = send(
        english_state(),
        vec![
            Msg::DragEntered(Rect::new(0, 0, 200, 100)),
            Msg::DragLeft { x: 50, y: 50 },
        ],
    );
    assert!(state.view().drag_hover);

    let (state, _) = update(state, Msg::DragLeft { x: 250, y: 50 });
    assert!(!state.view().drag_hover);

    let (state, _) = send(
        state,
        vec![Msg::DragOver, Msg::FilesDropped(vec![archive()])],
    );
    assert!(!state.view().drag_hover);
}

#[test]
fn directory_pick_is_not_reentrant() {
    init_logging();
    let (state, _) = update(english_state(), Msg::FileChosen(archive()));
    let (state, effects) = update(state, Msg::BrowseOutputDirectory);
    assert_eq!(effects, vec![Effect::PickOutputDirectory]);
    assert!(state.view().directory_pick_pending);

    let (state, effects) = update(state, Msg::BrowseOutputDirectory);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::OutputDirectoryPicked(Ok(Some("/picked".to_string()))),
    );
    let view = state.view();
    assert!(!view.directory_pick_pending);
    assert_eq!(view.draft.map(|d| d.output_directory), Some("/picked".to_string()));
}

#[test]
fn directory_picker_failure_becomes_global_error() {
    init_logging();
    let (state, _) = send(
        english_state(),
        vec![Msg::FileChosen(archive()), Msg::BrowseOutputDirectory],
    );
    let (state, _) = update(
        state,
        Msg::OutputDirectoryPicked(Err("Permission denied by portal".to_string())),
    );
    assert_eq!(
        state.global_error().map(|e| e.code()),
        Some(ErrorCode::PermissionDenied)
    );
    assert!(!state.view().directory_pick_pending);

    let (state, _) = update(state, Msg::ErrorDismissed);
    assert!(state.global_error().is_none());
}

#[test]
fn dismissed_picker_changes_nothing_else() {
    init_logging();
    let (state, _) = send(
        configured(),
        vec![Msg::BrowseOutputDirectory, Msg::OutputDirectoryPicked(Ok(None))],
    );
    assert_eq!(state.config(), Some(&expected_config()));
    assert_eq!(state.step(), WizardStep::ProcessControl);
}

#[test]
fn new_file_resets_configuration_and_progress() {
    init_logging();
    let (state, _) = update(running(), Msg::ProgressReported(complete(7, 7)));
    let (state, _) = update(
        state,
        Msg::FileChosen(FileCandidate::new("/mail/second.pst", 4096)),
    );
    assert_eq!(state.step(), WizardStep::Configuration);
    assert!(state.config().is_none());
    assert_eq!(state.progress().processed_items, 0);
    assert_eq!(
        state.form().map(|f| f.draft().file_path.clone()),
        Some("/mail/second.pst".to_string())
    );
}

#[test]
fn dirty_flag_coalesces_renders() {
    init_logging();
    let (mut state, _) = update(english_state(), Msg::FileChosen(archive()));
    assert!(state.view().dirty);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());

    let (mut state, _) = update(state, Msg::DragOver);
    assert!(state.consume_dirty());
    let (mut state, _) = update(state, Msg::DragOver);
    assert!(!state.consume_dirty());
}
