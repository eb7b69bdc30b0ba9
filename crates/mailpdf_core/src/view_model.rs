use crate::errors::{recovery_actions_for, LocalizedError, RecoveryAction, RecoveryHandlers};
use crate::validation::{ConfigDraft, FieldErrors, ProcessingConfig};
use crate::{AppState, ProcessingProgress, RecoveryCommand, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub step: WizardStep,
    pub running: bool,
    pub selected_file: Option<String>,
    pub drag_hover: bool,
    pub file_error: Option<LocalizedError>,
    pub draft: Option<ConfigDraft>,
    pub field_errors: FieldErrors,
    pub config: Option<ProcessingConfig>,
    pub directory_pick_pending: bool,
    pub progress: ProcessingProgress,
    /// Whole percent, 0..=100.
    pub percent: u32,
    pub cancel_prompt_open: bool,
    pub global_error: Option<LocalizedError>,
    /// Informational outcome of the last run (cancellation).
    pub run_notice: Option<LocalizedError>,
    /// Actions for `global_error`, or for `run_notice` when no error is shown.
    pub recovery: Vec<RecoveryAction<RecoveryCommand>>,
    /// Forward controls are disabled until reset.
    pub blocked: bool,
    pub dirty: bool,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let blocked = state.is_blocked();
    let form = state.form();
    let progress = state.progress().clone();
    let percent = progress.percentage().clamp(0.0, 100.0) as u32;

    let recovery = state
        .global_error()
        .or(state.run_notice())
        .map(|error| recovery_actions_for(state.bundle(), error, &handlers_for(state, blocked)))
        .unwrap_or_default();

    AppViewModel {
        step: state.step(),
        running: state.is_running(),
        selected_file: state.file_selection().accepted().map(str::to_owned),
        drag_hover: state.file_selection().drag_hover(),
        file_error: state.file_selection().error().cloned(),
        draft: form.map(|f| f.draft().clone()),
        field_errors: form.map(|f| f.field_errors().clone()).unwrap_or_default(),
        config: state.config().cloned(),
        directory_pick_pending: form.is_some_and(|f| f.directory_pick_pending()),
        progress,
        percent,
        cancel_prompt_open: state.cancel_prompt_open(),
        global_error: state.global_error().cloned(),
        run_notice: state.run_notice().cloned(),
        recovery,
        blocked,
        dirty: state.is_dirty(),
    }
}

/// Offers only what can act in the current state. While blocked, reset is the
/// only way forward and the view shows it on its own.
fn handlers_for(state: &AppState, blocked: bool) -> RecoveryHandlers<RecoveryCommand> {
    if blocked {
        return RecoveryHandlers::default();
    }
    let idle = !state.is_running();
    RecoveryHandlers {
        select_new_file: idle.then_some(RecoveryCommand::SelectNewFile),
        select_new_directory: (idle && state.form().is_some())
            .then_some(RecoveryCommand::SelectNewDirectory),
        retry: (idle && state.config().is_some()).then_some(RecoveryCommand::Retry),
        reset: Some(RecoveryCommand::Reset),
    }
}
