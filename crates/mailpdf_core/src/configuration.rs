use engine_logging::engine_debug;

use crate::bundle::Bundle;
use crate::errors::classify_validation_errors;
use crate::settings::WizardSettings;
use crate::validation::{
    structural_issues, validate_config, ConfigDraft, Field, FieldErrors, IssueKind,
    ProcessingConfig, ValidationIssue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    MessagesPerDocument(Option<i64>),
    /// Raw text from the count input; blank means "use the default".
    MessagesPerDocumentText(String),
    BaseName(String),
    OutputDirectory(String),
}

/// Draft plus its live per-field feedback. Re-validated on every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationForm {
    draft: ConfigDraft,
    unparsed_count: Option<String>,
    field_errors: FieldErrors,
    directory_pick_pending: bool,
}

impl ConfigurationForm {
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            draft: ConfigDraft::for_file(file_path),
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &ConfigDraft {
        &self.draft
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn directory_pick_pending(&self) -> bool {
        self.directory_pick_pending
    }

    /// Applies one change and returns the configuration iff every field passes.
    pub fn apply(
        &mut self,
        bundle: &Bundle,
        rules: &WizardSettings,
        change: ConfigChange,
    ) -> Option<ProcessingConfig> {
        match change {
            ConfigChange::MessagesPerDocument(count) => {
                self.unparsed_count = None;
                self.draft.messages_per_document = count;
            }
            ConfigChange::MessagesPerDocumentText(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    self.unparsed_count = None;
                    self.draft.messages_per_document = None;
                } else {
                    match trimmed.parse::<i64>() {
                        Ok(count) => {
                            self.unparsed_count = None;
                            self.draft.messages_per_document = Some(count);
                        }
                        Err(_) => self.unparsed_count = Some(text),
                    }
                }
            }
            ConfigChange::BaseName(name) => self.draft.base_name = name,
            ConfigChange::OutputDirectory(dir) => self.draft.output_directory = dir,
        }
        self.revalidate(bundle, rules)
    }

    pub fn revalidate(&mut self, bundle: &Bundle, rules: &WizardSettings) -> Option<ProcessingConfig> {
        if let Some(raw) = &self.unparsed_count {
            engine_debug!("Count input {:?} is not a number", raw);
            let mut issues: Vec<ValidationIssue> = structural_issues(rules, &self.draft)
                .into_iter()
                .filter(|issue| issue.field != Field::MessagesPerDocument)
                .collect();
            issues.push(ValidationIssue::new(
                Field::MessagesPerDocument,
                IssueKind::InvalidType,
            ));
            self.field_errors = classify_validation_errors(bundle, &issues);
            return None;
        }

        match validate_config(bundle, rules, &self.draft) {
            Ok(config) => {
                self.field_errors.clear();
                Some(config)
            }
            Err(errors) => {
                engine_debug!(
                    "Draft invalid in {} field(s): {:?}",
                    errors.len(),
                    errors.keys().collect::<Vec<_>>()
                );
                self.field_errors = errors;
                None
            }
        }
    }

    /// Marks a directory request as in flight. A second request while one is
    /// pending is refused.
    pub fn begin_directory_pick(&mut self) -> bool {
        if self.directory_pick_pending {
            return false;
        }
        self.directory_pick_pending = true;
        true
    }

    pub fn finish_directory_pick(&mut self) {
        self.directory_pick_pending = false;
    }
}
