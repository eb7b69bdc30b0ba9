use crate::configuration::ConfigChange;
use crate::file_selection::{FileCandidate, Rect};
use crate::progress::ProcessingProgress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file through the file dialog.
    FileChosen(FileCandidate),
    /// Files released over the drop area.
    FilesDropped(Vec<FileCandidate>),
    /// Pointer dragging files entered the drop area.
    DragEntered(Rect),
    DragOver,
    DragLeft { x: i32, y: i32 },
    /// Selected file removed, from any step.
    FileCleared,
    /// User edited one configuration field.
    ConfigChanged(ConfigChange),
    /// User asked for the host directory chooser.
    BrowseOutputDirectory,
    /// Directory chooser resolved: a path, `None` if dismissed, or a failure text.
    OutputDirectoryPicked(Result<Option<String>, String>),
    StartClicked,
    /// Opens the cancel confirmation; nothing else changes.
    CancelClicked,
    CancelConfirmed,
    CancelDismissed,
    /// Backend progress snapshot.
    ProgressReported(ProcessingProgress),
    /// Backend terminal failure text.
    ProcessingFailed(String),
    ErrorDismissed,
    ResetClicked,
    /// User picked an entry from a recovery menu.
    RecoveryInvoked(RecoveryCommand),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

impl Msg {
    /// Messages that move the wizard forward; refused while an
    /// unrecoverable error is shown.
    pub(crate) fn is_forward(&self) -> bool {
        matches!(
            self,
            Msg::FileChosen(_)
                | Msg::FilesDropped(_)
                | Msg::ConfigChanged(_)
                | Msg::BrowseOutputDirectory
                | Msg::StartClicked
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCommand {
    SelectNewFile,
    SelectNewDirectory,
    Retry,
    Reset,
}
