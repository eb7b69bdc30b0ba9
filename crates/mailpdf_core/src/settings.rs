use serde::{Deserialize, Serialize};

/// Rules the wizard applies to file selection and the configuration draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardSettings {
    /// Suffix the archive path must end with, compared case-insensitively.
    pub required_extension: String,
    /// Files below this size are rejected as implausible archives.
    pub min_file_size: u64,
    pub default_messages_per_document: u32,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            required_extension: ".pst".to_string(),
            min_file_size: 1024,
            default_messages_per_document: 10,
        }
    }
}
