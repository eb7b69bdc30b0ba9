//! Per-field predicates over the processing configuration draft.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::errors::{classify_validation_errors, LocalizedError};
use crate::settings::WizardSettings;

pub const MIN_MESSAGES_PER_DOCUMENT: i64 = 1;
pub const MAX_MESSAGES_PER_DOCUMENT: i64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FilePath,
    MessagesPerDocument,
    BaseName,
    OutputDirectory,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::FilePath => "filePath",
            Field::MessagesPerDocument => "messagesPerDocument",
            Field::BaseName => "baseName",
            Field::OutputDirectory => "outputDirectory",
        }
    }
}

pub type FieldErrors = BTreeMap<Field, Vec<LocalizedError>>;

/// The in-progress configuration as typed by the user.
/// `messages_per_document` of `None` means "use the default".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigDraft {
    pub file_path: String,
    pub messages_per_document: Option<i64>,
    pub base_name: String,
    pub output_directory: String,
}

impl ConfigDraft {
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub file_path: String,
    pub messages_per_document: u32,
    pub base_name: String,
    pub output_directory: String,
}

impl ProcessingConfig {
    /// Stricter than schema validity: every field the run depends on is set.
    pub fn is_complete(&self) -> bool {
        !self.base_name.is_empty()
            && !self.output_directory.trim().is_empty()
            && self.messages_per_document > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    InvalidType,
    TooSmall { minimum: i64 },
    TooBig { maximum: i64 },
    InvalidString,
    Required,
    Custom {
        rule: &'static str,
        values: Vec<(&'static str, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: Field,
    pub kind: IssueKind,
}

impl ValidationIssue {
    pub fn new(field: Field, kind: IssueKind) -> Self {
        Self { field, kind }
    }
}

pub fn check_base_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn has_required_extension(path: &str, extension: &str) -> bool {
    path.to_lowercase().ends_with(&extension.to_lowercase())
}

fn resolved_count(rules: &WizardSettings, draft: &ConfigDraft) -> i64 {
    draft
        .messages_per_document
        .unwrap_or(i64::from(rules.default_messages_per_document))
}

/// Runs every field predicate independently and returns all violations.
pub fn structural_issues(rules: &WizardSettings, draft: &ConfigDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if draft.file_path.is_empty() {
        issues.push(ValidationIssue::new(Field::FilePath, IssueKind::Required));
    } else if !has_required_extension(&draft.file_path, &rules.required_extension) {
        issues.push(ValidationIssue::new(
            Field::FilePath,
            IssueKind::Custom {
                rule: "wrongExtension",
                values: vec![("extension", rules.required_extension.clone())],
            },
        ));
    }

    let count = resolved_count(rules, draft);
    if count < MIN_MESSAGES_PER_DOCUMENT {
        issues.push(ValidationIssue::new(
            Field::MessagesPerDocument,
            IssueKind::TooSmall {
                minimum: MIN_MESSAGES_PER_DOCUMENT,
            },
        ));
    } else if count > MAX_MESSAGES_PER_DOCUMENT {
        issues.push(ValidationIssue::new(
            Field::MessagesPerDocument,
            IssueKind::TooBig {
                maximum: MAX_MESSAGES_PER_DOCUMENT,
            },
        ));
    }

    if draft.base_name.is_empty() {
        issues.push(ValidationIssue::new(Field::BaseName, IssueKind::Required));
    } else if !check_base_name(&draft.base_name) {
        issues.push(ValidationIssue::new(Field::BaseName, IssueKind::InvalidString));
    }

    if draft.output_directory.trim().is_empty() {
        issues.push(ValidationIssue::new(
            Field::OutputDirectory,
            IssueKind::Required,
        ));
    }

    issues
}

/// Validates the draft. Failures come back as classified errors keyed by field.
pub fn validate_config(
    bundle: &Bundle,
    rules: &WizardSettings,
    draft: &ConfigDraft,
) -> Result<ProcessingConfig, FieldErrors> {
    let issues = structural_issues(rules, draft);
    if !issues.is_empty() {
        return Err(classify_validation_errors(bundle, &issues));
    }
    let count = u32::try_from(resolved_count(rules, draft)).map_err(|_| {
        classify_validation_errors(
            bundle,
            &[ValidationIssue::new(
                Field::MessagesPerDocument,
                IssueKind::InvalidType,
            )],
        )
    })?;
    Ok(ProcessingConfig {
        file_path: draft.file_path.clone(),
        messages_per_document: count,
        base_name: draft.base_name.clone(),
        output_directory: draft.output_directory.clone(),
    })
}
