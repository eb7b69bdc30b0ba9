use std::sync::Arc;

use chrono::Utc;
use engine_logging::{engine_debug, engine_info, engine_warn};
use serde::Serialize;

use crate::bundle::Bundle;
use crate::configuration::{ConfigChange, ConfigurationForm};
use crate::errors::{classify_backend_error, LocalizedError};
use crate::file_selection::{FileCandidate, FileSelection, Rect, SelectionOutcome};
use crate::progress::ProcessingProgress;
use crate::settings::WizardSettings;
use crate::update::HandlerError;
use crate::validation::ProcessingConfig;
use crate::view_model::{self, AppViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    #[default]
    FileSelection,
    Configuration,
    ProcessControl,
    Progress,
}

impl WizardStep {
    pub fn label_key(self) -> &'static str {
        match self {
            WizardStep::FileSelection => "steps.fileSelection",
            WizardStep::Configuration => "steps.configuration",
            WizardStep::ProcessControl => "steps.processControl",
            WizardStep::Progress => "steps.progress",
        }
    }
}

/// Everything the wizard owns. Child controllers live inside and hand their
/// committed values back through return values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    bundle: Arc<Bundle>,
    rules: WizardSettings,
    step: WizardStep,
    file_selection: FileSelection,
    form: Option<ConfigurationForm>,
    config: Option<ProcessingConfig>,
    progress: ProcessingProgress,
    running: bool,
    global_error: Option<LocalizedError>,
    run_notice: Option<LocalizedError>,
    cancel_prompt_open: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(Arc::new(Bundle::default()), WizardSettings::default())
    }

    pub fn with_settings(bundle: Arc<Bundle>, rules: WizardSettings) -> Self {
        let progress = ProcessingProgress::ready(&bundle);
        Self {
            bundle,
            rules,
            step: WizardStep::FileSelection,
            file_selection: FileSelection::default(),
            form: None,
            config: None,
            progress,
            running: false,
            global_error: None,
            run_notice: None,
            cancel_prompt_open: false,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    pub fn rules(&self) -> &WizardSettings {
        &self.rules
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn file_selection(&self) -> &FileSelection {
        &self.file_selection
    }

    pub fn form(&self) -> Option<&ConfigurationForm> {
        self.form.as_ref()
    }

    pub fn config(&self) -> Option<&ProcessingConfig> {
        self.config.as_ref()
    }

    pub fn progress(&self) -> &ProcessingProgress {
        &self.progress
    }

    pub fn global_error(&self) -> Option<&LocalizedError> {
        self.global_error.as_ref()
    }

    pub fn run_notice(&self) -> Option<&LocalizedError> {
        self.run_notice.as_ref()
    }

    pub fn cancel_prompt_open(&self) -> bool {
        self.cancel_prompt_open
    }

    /// An unrecoverable error is showing; only reset moves on from here.
    pub fn is_blocked(&self) -> bool {
        self.global_error
            .as_ref()
            .is_some_and(|error| !error.is_recoverable())
    }

    pub(crate) fn choose_file(&mut self, candidate: &FileCandidate) {
        if self.running {
            engine_debug!("Ignoring file selection while a run is in flight");
            return;
        }
        self.dirty = true;
        let outcome = self
            .file_selection
            .select_candidate(&self.bundle, &self.rules, candidate);
        if let SelectionOutcome::Committed(path) = outcome {
            self.accept_file(path);
        }
    }

    pub(crate) fn drop_files(&mut self, files: &[FileCandidate]) {
        if self.running {
            engine_debug!("Ignoring drop while a run is in flight");
            return;
        }
        self.dirty = true;
        let outcome = self
            .file_selection
            .handle_drop(&self.bundle, &self.rules, files);
        if let SelectionOutcome::Committed(path) = outcome {
            self.accept_file(path);
        }
    }

    pub(crate) fn drag_entered(&mut self, bounds: Rect) {
        self.file_selection.drag_enter(bounds);
        self.dirty = true;
    }

    pub(crate) fn drag_over(&mut self) {
        if !self.file_selection.drag_hover() {
            self.file_selection.drag_over();
            self.dirty = true;
        }
    }

    pub(crate) fn drag_left(&mut self, x: i32, y: i32) {
        let before = self.file_selection.drag_hover();
        self.file_selection.drag_leave(x, y);
        if before != self.file_selection.drag_hover() {
            self.dirty = true;
        }
    }

    fn accept_file(&mut self, path: String) {
        engine_info!("Step -> Configuration for {}", path);
        self.step = WizardStep::Configuration;
        self.form = Some(ConfigurationForm::for_file(path));
        self.config = None;
        self.progress = ProcessingProgress::ready(&self.bundle);
        self.global_error = None;
        self.run_notice = None;
        self.cancel_prompt_open = false;
    }

    /// Forgets the file and its configuration, whatever step is active.
    /// Returns true when a run was in flight; the caller must cancel it.
    pub(crate) fn clear_file(&mut self) -> bool {
        engine_info!("File cleared; step {:?} -> FileSelection", self.step);
        let was_running = self.running;
        self.file_selection.clear();
        self.form = None;
        self.config = None;
        self.step = WizardStep::FileSelection;
        self.stop_run();
        was_running
    }

    pub(crate) fn apply_config_change(&mut self, change: ConfigChange) {
        if self.running {
            engine_debug!("Ignoring configuration change while a run is in flight");
            return;
        }
        let Some(form) = self.form.as_mut() else {
            engine_debug!("Ignoring configuration change without a selected file");
            return;
        };
        self.dirty = true;
        match form.apply(&self.bundle, &self.rules, change) {
            Some(config) if config.is_complete() => {
                engine_info!(
                    "Configuration committed: {} per document, base '{}', dir '{}'",
                    config.messages_per_document,
                    config.base_name,
                    config.output_directory
                );
                self.config = Some(config);
                self.step = WizardStep::ProcessControl;
            }
            _ => {
                if self.config.take().is_some() {
                    engine_debug!("Configuration withdrawn after an invalid edit");
                }
                self.step = WizardStep::Configuration;
            }
        }
    }

    /// Returns false when there is nothing to pick for, or a pick is already pending.
    pub(crate) fn begin_directory_pick(&mut self) -> bool {
        if self.running {
            return false;
        }
        let started = self
            .form
            .as_mut()
            .is_some_and(ConfigurationForm::begin_directory_pick);
        if started {
            self.dirty = true;
        }
        started
    }

    pub(crate) fn finish_directory_pick(
        &mut self,
        result: Result<Option<String>, String>,
    ) -> Result<(), HandlerError> {
        let Some(form) = self.form.as_mut() else {
            engine_debug!("Directory pick resolved after the file was cleared");
            return Ok(());
        };
        form.finish_directory_pick();
        self.dirty = true;
        match result {
            Ok(Some(dir)) => {
                self.apply_config_change(ConfigChange::OutputDirectory(dir));
                Ok(())
            }
            Ok(None) => {
                engine_debug!("Directory selection dismissed");
                Ok(())
            }
            Err(raw) => Err(HandlerError::DirectoryPicker(raw)),
        }
    }

    /// Puts the wizard into the running state and hands back the config to run.
    /// `Ok(None)` when there is nothing to start.
    pub(crate) fn start(&mut self) -> Result<Option<ProcessingConfig>, HandlerError> {
        let Some(config) = self.config.clone() else {
            engine_debug!("Start ignored: no committed configuration");
            return Ok(None);
        };
        if self.running {
            engine_debug!("Start ignored: already running");
            return Ok(None);
        }
        if !config.is_complete() {
            return Err(HandlerError::IncompleteConfig(config.base_name));
        }

        self.running = true;
        self.step = WizardStep::Progress;
        self.global_error = None;
        self.run_notice = None;
        self.cancel_prompt_open = false;
        self.progress
            .mark_starting(self.bundle.lookup("progress.starting", None), Utc::now());
        self.dirty = true;
        engine_info!("Run started for {}", config.file_path);
        Ok(Some(config))
    }

    pub(crate) fn open_cancel_prompt(&mut self) {
        if self.running && !self.cancel_prompt_open {
            self.cancel_prompt_open = true;
            self.dirty = true;
        }
    }

    pub(crate) fn close_cancel_prompt(&mut self) {
        if self.cancel_prompt_open {
            self.cancel_prompt_open = false;
            self.dirty = true;
        }
    }

    /// Applies a confirmed cancel. Returns false when no prompt was open.
    pub(crate) fn confirm_cancel(&mut self) -> bool {
        if !self.cancel_prompt_open {
            return false;
        }
        self.cancel_prompt_open = false;
        self.running = false;
        self.step = WizardStep::ProcessControl;
        self.progress
            .mark_cancelled(self.bundle.lookup("progress.cancelled", None), Utc::now());
        self.run_notice = Some(LocalizedError::cancelled(&self.bundle));
        self.dirty = true;
        engine_info!("Run cancelled by user; produced documents are kept");
        true
    }

    /// Takes a backend snapshot. A finished snapshot always ends the run.
    pub(crate) fn apply_progress(
        &mut self,
        progress: ProcessingProgress,
    ) -> Result<(), HandlerError> {
        if !self.running {
            engine_debug!("Dropping progress outside a run: {}", progress.status);
            return Ok(());
        }
        if progress.processed_items > progress.total_items {
            if progress.is_finished() {
                self.stop_run();
            }
            return Err(HandlerError::ProgressOutOfRange {
                processed: progress.processed_items,
                total: progress.total_items,
            });
        }

        let started_at = self.progress.started_at;
        self.progress = progress;
        if self.progress.started_at.is_none() {
            self.progress.started_at = started_at;
        }
        self.dirty = true;

        if self.progress.is_finished() {
            self.stop_run();
            if self.progress.completed_at.is_none() {
                self.progress.completed_at = Some(Utc::now());
            }
            if let Some(raw) = self.progress.error.as_deref().filter(|e| !e.is_empty()) {
                engine_warn!("Run reported an error: {}", raw);
                self.global_error = Some(classify_backend_error(&self.bundle, raw));
            } else {
                engine_info!(
                    "Run finished: {}/{} items, {} document(s)",
                    self.progress.processed_items,
                    self.progress.total_items,
                    self.progress.current_document
                );
            }
        }
        Ok(())
    }

    fn stop_run(&mut self) {
        self.running = false;
        self.cancel_prompt_open = false;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, raw: &str) {
        engine_warn!("Backend failure: {}", raw);
        self.running = false;
        self.cancel_prompt_open = false;
        self.progress.error = Some(raw.to_string());
        self.progress.status = self.bundle.lookup("progress.failed", None);
        self.progress.completed_at = Some(Utc::now());
        self.global_error = Some(classify_backend_error(&self.bundle, raw));
        self.dirty = true;
    }

    pub(crate) fn record_failure(&mut self, error: LocalizedError, stop_run: bool) {
        if stop_run {
            self.running = false;
        }
        self.global_error = Some(error);
        self.dirty = true;
    }

    /// Only recoverable errors can be dismissed.
    pub(crate) fn dismiss_error(&mut self) {
        if self
            .global_error
            .as_ref()
            .is_some_and(LocalizedError::is_recoverable)
        {
            self.global_error = None;
            self.dirty = true;
        }
        if self.run_notice.take().is_some() {
            self.dirty = true;
        }
    }

    /// Returns true when a run was in flight; the caller must cancel it.
    pub(crate) fn reset(&mut self) -> bool {
        engine_info!("Wizard reset from {:?}", self.step);
        let was_running = self.running;
        *self = Self::with_settings(Arc::clone(&self.bundle), self.rules.clone());
        self.dirty = true;
        was_running
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
