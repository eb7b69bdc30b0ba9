//! Error classification: turns raw backend text, validation issues and
//! unhandled failures into `LocalizedError` values with recovery hints.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bundle::Bundle;
use crate::validation::{Field, FieldErrors, IssueKind, ValidationIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    FileNotFound,
    InvalidFormat,
    PermissionDenied,
    GenerationFailed,
    InsufficientSpace,
    DirectoryNotFound,
    Cancelled,
    ConnectionFailed,
    Unknown,
    FileEmpty,
    FileTooSmall,
    NoFileDropped,
    MultipleFilesDropped,
    InvalidType,
    TooSmall,
    TooBig,
    InvalidString,
    RequiredField,
    Custom,
    UnhandledFailure,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "file-not-found",
            ErrorCode::InvalidFormat => "invalid-format",
            ErrorCode::PermissionDenied => "permission-denied",
            ErrorCode::GenerationFailed => "generation-failed",
            ErrorCode::InsufficientSpace => "insufficient-space",
            ErrorCode::DirectoryNotFound => "directory-not-found",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::ConnectionFailed => "connection-failed",
            ErrorCode::Unknown => "unknown",
            ErrorCode::FileEmpty => "file-empty",
            ErrorCode::FileTooSmall => "file-too-small",
            ErrorCode::NoFileDropped => "no-file-dropped",
            ErrorCode::MultipleFilesDropped => "multiple-files-dropped",
            ErrorCode::InvalidType => "invalid-type",
            ErrorCode::TooSmall => "too-small",
            ErrorCode::TooBig => "too-big",
            ErrorCode::InvalidString => "invalid-string",
            ErrorCode::RequiredField => "required-field",
            ErrorCode::Custom => "custom",
            ErrorCode::UnhandledFailure => "unhandled-failure",
        }
    }

    /// Node under `errors.` holding the message and suggestions, for codes the
    /// backend classifier produces.
    fn bundle_node(self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "fileNotFound",
            ErrorCode::InvalidFormat => "invalidFormat",
            ErrorCode::PermissionDenied => "permissionDenied",
            ErrorCode::GenerationFailed => "generationFailed",
            ErrorCode::InsufficientSpace => "insufficientSpace",
            ErrorCode::DirectoryNotFound => "directoryNotFound",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::ConnectionFailed => "connectionFailed",
            ErrorCode::UnhandledFailure => "unhandled",
            _ => "unknown",
        }
    }
}

/// Presentation weight. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn badge(self) -> &'static str {
        match self {
            Severity::Info => "[i]",
            Severity::Warning => "[!]",
            Severity::Error => "[x]",
            Severity::Critical => "[!!]",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Severity::Info => "severity.info",
            Severity::Warning => "severity.warning",
            Severity::Error => "severity.error",
            Severity::Critical => "severity.critical",
        }
    }
}

/// A classified failure. Built once at the point of failure, read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedError {
    code: ErrorCode,
    message: String,
    user_message: String,
    severity: Severity,
    recoverable: bool,
    suggestions: Vec<String>,
    context: Option<BTreeMap<String, String>>,
    cause: Option<String>,
    timestamp: DateTime<Utc>,
}

impl LocalizedError {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        user_message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            user_message: user_message.into(),
            severity,
            recoverable: true,
            suggestions: Vec::new(),
            context: None,
            cause: None,
            timestamp: Utc::now(),
        }
    }

    pub fn recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The "processing cancelled" classification used by the lifecycle.
    pub fn cancelled(bundle: &Bundle) -> Self {
        classified(bundle, &CANCELLED, "processing cancelled by user")
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn context(&self) -> Option<&BTreeMap<String, String>> {
        self.context.as_ref()
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

struct Fingerprint {
    needles: &'static [&'static str],
    code: ErrorCode,
    severity: Severity,
    suggestions: &'static [&'static str],
}

const CANCELLED: Fingerprint = Fingerprint {
    needles: &["cancelled", "canceled"],
    code: ErrorCode::Cancelled,
    severity: Severity::Info,
    suggestions: &["restart"],
};

// Checked top to bottom; the first entry with a matching needle wins.
const FINGERPRINTS: &[Fingerprint] = &[
    Fingerprint {
        needles: &["file not found"],
        code: ErrorCode::FileNotFound,
        severity: Severity::Error,
        suggestions: &["checkPath", "selectOther"],
    },
    Fingerprint {
        needles: &["permission denied"],
        code: ErrorCode::PermissionDenied,
        severity: Severity::Error,
        suggestions: &["checkRights", "otherDirectory"],
    },
    Fingerprint {
        needles: &["disk space", "insufficient space"],
        code: ErrorCode::InsufficientSpace,
        severity: Severity::Error,
        suggestions: &["freeSpace", "otherDirectory"],
    },
    Fingerprint {
        needles: &["directory not found", "directory does not exist"],
        code: ErrorCode::DirectoryNotFound,
        severity: Severity::Error,
        suggestions: &["checkPath", "selectOther"],
    },
    Fingerprint {
        needles: &["invalid pst", "invalid format", "corrupted"],
        code: ErrorCode::InvalidFormat,
        severity: Severity::Error,
        suggestions: &["checkFile", "selectOther"],
    },
    Fingerprint {
        needles: &["pdf generation", "generation failed"],
        code: ErrorCode::GenerationFailed,
        severity: Severity::Error,
        suggestions: &["retry", "checkDirectory"],
    },
    CANCELLED,
    Fingerprint {
        needles: &["connection", "backend"],
        code: ErrorCode::ConnectionFailed,
        severity: Severity::Critical,
        suggestions: &["retry", "restartApp"],
    },
];

fn classified(bundle: &Bundle, fingerprint: &Fingerprint, raw: &str) -> LocalizedError {
    let node = fingerprint.code.bundle_node();
    LocalizedError::new(
        fingerprint.code,
        raw,
        bundle.lookup(&format!("errors.{node}.message"), None),
        fingerprint.severity,
    )
    .with_suggestions(suggestions(bundle, node, fingerprint.suggestions))
    .with_cause(raw)
}

fn suggestions(bundle: &Bundle, node: &str, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .map(|key| bundle.lookup(&format!("errors.{node}.suggestions.{key}"), None))
        .collect()
}

/// Maps raw backend text onto the known failure classes by case-insensitive
/// substring match. Unmatched text becomes a non-recoverable `Unknown`.
pub fn classify_backend_error(bundle: &Bundle, raw: &str) -> LocalizedError {
    let lowered = raw.to_lowercase();
    let hit = FINGERPRINTS
        .iter()
        .find(|fp| fp.needles.iter().any(|needle| lowered.contains(needle)));
    match hit {
        Some(fingerprint) => classified(bundle, fingerprint, raw),
        None => LocalizedError::new(
            ErrorCode::Unknown,
            raw,
            bundle.lookup("errors.unknown.message", None),
            Severity::Error,
        )
        .recoverable(false)
        .with_suggestions(suggestions(bundle, "unknown", &["restartApp"]))
        .with_cause(raw),
    }
}

/// Groups issues by field, keeping their order within each field.
pub fn classify_validation_errors(bundle: &Bundle, issues: &[ValidationIssue]) -> FieldErrors {
    let mut grouped: FieldErrors = BTreeMap::new();
    for issue in issues {
        grouped
            .entry(issue.field)
            .or_default()
            .push(classify_issue(bundle, issue));
    }
    grouped
}

fn classify_issue(bundle: &Bundle, issue: &ValidationIssue) -> LocalizedError {
    let field = issue.field;
    let (code, user_message, detail) = match &issue.kind {
        IssueKind::InvalidType => (
            ErrorCode::InvalidType,
            bundle.text("validation.invalidType", &[]),
            "expected an integer".to_string(),
        ),
        IssueKind::TooSmall { minimum } => (
            ErrorCode::TooSmall,
            bundle.text("validation.tooSmall", &[("minimum", minimum.to_string())]),
            format!("must be at least {minimum}"),
        ),
        IssueKind::TooBig { maximum } => (
            ErrorCode::TooBig,
            bundle.text("validation.tooBig", &[("maximum", maximum.to_string())]),
            format!("must be at most {maximum}"),
        ),
        IssueKind::InvalidString => (
            ErrorCode::InvalidString,
            bundle.text("validation.invalidString", &[]),
            "must match [A-Za-z0-9_-]+".to_string(),
        ),
        IssueKind::Required => (
            ErrorCode::RequiredField,
            bundle.text("validation.required", &[]),
            "is required".to_string(),
        ),
        IssueKind::Custom { rule, values } => {
            let values: Vec<(&str, String)> =
                values.iter().map(|(k, v)| (*k, v.clone())).collect();
            (
                ErrorCode::Custom,
                bundle.text(&format!("validation.custom.{rule}"), &values),
                format!("failed rule '{rule}'"),
            )
        }
    };
    LocalizedError::new(
        code,
        format!("{}: {}", field.as_str(), detail),
        user_message,
        Severity::Warning,
    )
    .with_context("field", field_label(bundle, field))
}

fn field_label(bundle: &Bundle, field: Field) -> String {
    bundle.lookup(&format!("validation.fields.{}", field.as_str()), Some(field.as_str()))
}

/// Invocations the caller can offer for recovery. Any slot may be empty.
#[derive(Debug, Clone)]
pub struct RecoveryHandlers<T> {
    pub select_new_file: Option<T>,
    pub select_new_directory: Option<T>,
    pub retry: Option<T>,
    pub reset: Option<T>,
}

impl<T> Default for RecoveryHandlers<T> {
    fn default() -> Self {
        Self {
            select_new_file: None,
            select_new_directory: None,
            retry: None,
            reset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryAction<T> {
    pub label: String,
    pub invoke: T,
    pub is_primary: bool,
}

/// Recovery menu for `error`. At most one code-specific primary action, a
/// generic retry when no specific action applied, then reset for recoverable
/// errors. The list may be empty.
pub fn recovery_actions_for<T: Clone>(
    bundle: &Bundle,
    error: &LocalizedError,
    handlers: &RecoveryHandlers<T>,
) -> Vec<RecoveryAction<T>> {
    let mut actions = Vec::new();

    let specific = match error.code() {
        ErrorCode::FileNotFound | ErrorCode::InvalidFormat => handlers
            .select_new_file
            .as_ref()
            .map(|invoke| ("recovery.selectNewFile", invoke)),
        ErrorCode::DirectoryNotFound => handlers
            .select_new_directory
            .as_ref()
            .map(|invoke| ("recovery.selectNewDirectory", invoke)),
        ErrorCode::Cancelled => handlers
            .retry
            .as_ref()
            .map(|invoke| ("recovery.retry", invoke)),
        _ => None,
    };

    match specific {
        Some((key, invoke)) => actions.push(RecoveryAction {
            label: bundle.lookup(key, None),
            invoke: invoke.clone(),
            is_primary: true,
        }),
        None => {
            if let Some(retry) = &handlers.retry {
                actions.push(RecoveryAction {
                    label: bundle.lookup("recovery.retry", None),
                    invoke: retry.clone(),
                    is_primary: false,
                });
            }
        }
    }

    if error.is_recoverable() {
        if let Some(reset) = &handlers.reset {
            actions.push(RecoveryAction {
                label: bundle.lookup("recovery.reset", None),
                invoke: reset.clone(),
                is_primary: false,
            });
        }
    }

    actions
}

/// Classification for failures caught by the top-level boundary.
pub fn classify_unhandled_failure(
    bundle: &Bundle,
    cause: &str,
    origin: Option<&str>,
) -> LocalizedError {
    let error = LocalizedError::new(
        ErrorCode::UnhandledFailure,
        cause,
        bundle.lookup("errors.unhandled.message", None),
        Severity::Critical,
    )
    .with_suggestions(suggestions(bundle, "unhandled", &["retry", "report"]))
    .with_cause(cause);
    match origin {
        Some(origin) => error.with_context("origin", origin),
        None => error,
    }
}
