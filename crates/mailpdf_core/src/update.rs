use engine_logging::{engine_debug, engine_error, engine_info};

use crate::errors::classify_backend_error;
use crate::{AppState, Effect, Msg, RecoveryCommand};

/// Failures raised inside a handler. They never leave `update`: each one is
/// classified and shown as the global error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("committed configuration is incomplete (base name '{0}')")]
    IncompleteConfig(String),
    #[error("progress out of range: processed {processed} of {total}")]
    ProgressOutOfRange { processed: usize, total: usize },
    #[error("{0}")]
    DirectoryPicker(String),
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let starts_run = matches!(
        msg,
        Msg::StartClicked | Msg::RecoveryInvoked(RecoveryCommand::Retry)
    );
    let effects = match handle(&mut state, msg) {
        Ok(effects) => effects,
        Err(err) => {
            engine_error!("Handler failed: {}", err);
            let classified = classify_backend_error(state.bundle(), &err.to_string());
            state.record_failure(classified, starts_run);
            Vec::new()
        }
    };

    (state, effects)
}

fn handle(state: &mut AppState, msg: Msg) -> Result<Vec<Effect>, HandlerError> {
    if state.is_blocked() && msg.is_forward() {
        engine_debug!("Blocked by unrecoverable error, ignoring {:?}", msg);
        return Ok(Vec::new());
    }

    let effects = match msg {
        Msg::FileChosen(candidate) => {
            state.choose_file(&candidate);
            Vec::new()
        }
        Msg::FilesDropped(files) => {
            state.drop_files(&files);
            Vec::new()
        }
        Msg::DragEntered(bounds) => {
            state.drag_entered(bounds);
            Vec::new()
        }
        Msg::DragOver => {
            state.drag_over();
            Vec::new()
        }
        Msg::DragLeft { x, y } => {
            state.drag_left(x, y);
            Vec::new()
        }
        Msg::FileCleared => abandon_run(state.clear_file()),
        Msg::ConfigChanged(change) => {
            state.apply_config_change(change);
            Vec::new()
        }
        Msg::BrowseOutputDirectory => browse(state),
        Msg::OutputDirectoryPicked(result) => {
            state.finish_directory_pick(result)?;
            Vec::new()
        }
        Msg::StartClicked => start(state)?,
        Msg::CancelClicked => {
            state.open_cancel_prompt();
            Vec::new()
        }
        Msg::CancelDismissed => {
            state.close_cancel_prompt();
            Vec::new()
        }
        Msg::CancelConfirmed => {
            if state.confirm_cancel() {
                vec![Effect::CancelProcessing]
            } else {
                Vec::new()
            }
        }
        Msg::ProgressReported(progress) => {
            state.apply_progress(progress)?;
            Vec::new()
        }
        Msg::ProcessingFailed(raw) => {
            state.fail(&raw);
            Vec::new()
        }
        Msg::ErrorDismissed => {
            state.dismiss_error();
            Vec::new()
        }
        Msg::ResetClicked => abandon_run(state.reset()),
        Msg::RecoveryInvoked(command) => recover(state, command)?,
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    Ok(effects)
}

/// A run left behind by a reset or a cleared file still has to be stopped.
fn abandon_run(was_running: bool) -> Vec<Effect> {
    if was_running {
        engine_info!("Run abandoned; cancelling backend job");
        vec![Effect::CancelProcessing]
    } else {
        Vec::new()
    }
}

fn browse(state: &mut AppState) -> Vec<Effect> {
    if state.begin_directory_pick() {
        vec![Effect::PickOutputDirectory]
    } else {
        engine_debug!("Directory selection already pending or unavailable");
        Vec::new()
    }
}

fn start(state: &mut AppState) -> Result<Vec<Effect>, HandlerError> {
    Ok(state
        .start()?
        .map(|config| vec![Effect::StartProcessing(config)])
        .unwrap_or_default())
}

fn recover(state: &mut AppState, command: RecoveryCommand) -> Result<Vec<Effect>, HandlerError> {
    if state.is_blocked() && command != RecoveryCommand::Reset {
        engine_debug!("Blocked by unrecoverable error, ignoring {:?}", command);
        return Ok(Vec::new());
    }
    state.dismiss_error();
    match command {
        RecoveryCommand::SelectNewFile => Ok(abandon_run(state.clear_file())),
        RecoveryCommand::SelectNewDirectory => Ok(browse(state)),
        RecoveryCommand::Retry => start(state),
        RecoveryCommand::Reset => Ok(abandon_run(state.reset())),
    }
}
