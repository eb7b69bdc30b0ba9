//! mailpdf core: pure wizard state machine, validation, error classification
//! and view-model helpers.
mod boundary;
mod bundle;
mod configuration;
mod effect;
mod errors;
mod file_selection;
mod msg;
mod progress;
mod settings;
mod state;
mod update;
mod validation;
mod view_model;

pub use boundary::{
    install_panic_hook, BoundaryAction, CapturedFailure, EnvironmentInfo, ErrorBoundary,
    ReportError,
};
pub use bundle::{interpolate, pluralize, Bundle, BundleError, Locale};
pub use configuration::{ConfigChange, ConfigurationForm};
pub use effect::Effect;
pub use errors::{
    classify_backend_error, classify_unhandled_failure, classify_validation_errors,
    recovery_actions_for, ErrorCode, LocalizedError, RecoveryAction, RecoveryHandlers, Severity,
};
pub use file_selection::{FileCandidate, FileSelection, Rect, SelectionOutcome};
pub use msg::{Msg, RecoveryCommand};
pub use progress::ProcessingProgress;
pub use settings::WizardSettings;
pub use state::{AppState, WizardStep};
pub use update::{update, HandlerError};
pub use validation::{
    check_base_name, has_required_extension, structural_issues, validate_config, ConfigDraft,
    Field, FieldErrors, IssueKind, ProcessingConfig, ValidationIssue, MAX_MESSAGES_PER_DOCUMENT,
    MIN_MESSAGES_PER_DOCUMENT,
};
pub use view_model::AppViewModel;
