use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::errors::{ErrorCode, LocalizedError, Severity};
use crate::settings::WizardSettings;
use crate::validation::has_required_extension;

/// A file offered by the picker or a drop, before any checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    pub path: String,
    pub size: u64,
}

impl FileCandidate {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Last path component, accepting both separator styles.
    pub fn display_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.path)
    }
}

/// Bounding box of the drop area in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Strictly inside; a pointer on the edge has left the area.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x > self.left && x < self.right && y > self.top && y < self.bottom
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Committed(String),
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSelection {
    accepted: Option<String>,
    error: Option<LocalizedError>,
    drag_hover: bool,
    bounds: Option<Rect>,
}

impl FileSelection {
    pub fn accepted(&self) -> Option<&str> {
        self.accepted.as_deref()
    }

    pub fn error(&self) -> Option<&LocalizedError> {
        self.error.as_ref()
    }

    pub fn drag_hover(&self) -> bool {
        self.drag_hover
    }

    /// Checks extension, emptiness and plausible size. Only a passing file
    /// replaces the accepted one.
    pub fn select_candidate(
        &mut self,
        bundle: &Bundle,
        rules: &WizardSettings,
        candidate: &FileCandidate,
    ) -> SelectionOutcome {
        match check_candidate(bundle, rules, candidate) {
            Ok(()) => {
                engine_info!(
                    "Accepted archive {} ({} bytes)",
                    candidate.path,
                    candidate.size
                );
                self.error = None;
                self.accepted = Some(candidate.path.clone());
                SelectionOutcome::Committed(candidate.path.clone())
            }
            Err(error) => self.reject(error),
        }
    }

    pub fn handle_drop(
        &mut self,
        bundle: &Bundle,
        rules: &WizardSettings,
        files: &[FileCandidate],
    ) -> SelectionOutcome {
        self.drag_hover = false;
        match files {
            [] => self.reject(
                LocalizedError::new(
                    ErrorCode::NoFileDropped,
                    "drop contained no files",
                    bundle.text("fileSelection.noFile", &[]),
                    Severity::Warning,
                )
                .with_suggestions(vec![bundle.lookup("fileSelection.suggestions.dropSingle", None)]),
            ),
            [single] => self.select_candidate(bundle, rules, single),
            many => self.reject(
                LocalizedError::new(
                    ErrorCode::MultipleFilesDropped,
                    format!("drop contained {} files", many.len()),
                    bundle.text(
                        "fileSelection.multipleFiles",
                        &[("count", many.len().to_string())],
                    ),
                    Severity::Warning,
                )
                .with_suggestions(vec![bundle.lookup("fileSelection.suggestions.dropSingle", None)])
                .with_context("count", many.len().to_string()),
            ),
        }
    }

    pub fn drag_enter(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.drag_hover = true;
    }

    pub fn drag_over(&mut self) {
        self.drag_hover = true;
    }

    /// Leave events also fire when the pointer crosses into a child element;
    /// only a pointer outside the bounds clears the hover.
    pub fn drag_leave(&mut self, x: i32, y: i32) {
        let still_inside = self.bounds.is_some_and(|bounds| bounds.contains(x, y));
        if !still_inside {
            self.drag_hover = false;
        }
    }

    pub fn clear(&mut self) {
        self.accepted = None;
        self.error = None;
        self.drag_hover = false;
    }

    fn reject(&mut self, error: LocalizedError) -> SelectionOutcome {
        engine_warn!(
            "File selection rejected [{}]: {}",
            error.code().as_str(),
            error.message()
        );
        self.error = Some(error);
        SelectionOutcome::Rejected
    }
}

fn check_candidate(
    bundle: &Bundle,
    rules: &WizardSettings,
    candidate: &FileCandidate,
) -> Result<(), LocalizedError> {
    let name = candidate.display_name().to_string();
    let select_pst = || vec![bundle.lookup("fileSelection.suggestions.selectPst", None)];

    if !has_required_extension(&candidate.path, &rules.required_extension) {
        return Err(LocalizedError::new(
            ErrorCode::InvalidFormat,
            format!("{} does not end with {}", candidate.path, rules.required_extension),
            bundle.text(
                "fileSelection.invalidFormat",
                &[("name", name), ("extension", rules.required_extension.clone())],
            ),
            Severity::Error,
        )
        .with_suggestions(select_pst()));
    }

    if candidate.size == 0 {
        return Err(LocalizedError::new(
            ErrorCode::FileEmpty,
            format!("{} is empty", candidate.path),
            bundle.text("fileSelection.empty", &[("name", name)]),
            Severity::Error,
        )
        .with_suggestions(select_pst()));
    }

    if candidate.size < rules.min_file_size {
        return Err(LocalizedError::new(
            ErrorCode::FileTooSmall,
            format!(
                "{} has {} bytes, below the {} byte minimum",
                candidate.path, candidate.size, rules.min_file_size
            ),
            bundle.text(
                "fileSelection.tooSmall",
                &[
                    ("name", name),
                    ("size", candidate.size.to_string()),
                    ("minimum", rules.min_file_size.to_string()),
                ],
            ),
            Severity::Warning,
        )
        .with_suggestions(select_pst())
        .with_context("size", candidate.size.to_string()));
    }

    Ok(())
}
