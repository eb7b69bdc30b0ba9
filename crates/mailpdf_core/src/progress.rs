use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;

/// Snapshot of a conversion run as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingProgress {
    pub total_items: usize,
    pub processed_items: usize,
    /// 1-based index of the output document being written; 0 before the first.
    pub current_document: u32,
    pub status: String,
    pub is_complete: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessingProgress {
    pub fn ready(bundle: &Bundle) -> Self {
        Self {
            status: bundle.lookup("progress.ready", None),
            ..Self::default()
        }
    }

    /// A run is over once it completed or reported a non-empty error.
    pub fn is_finished(&self) -> bool {
        self.is_complete || self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn percentage(&self) -> f64 {
        if self.total_items == 0 {
            0.0
        } else {
            (self.processed_items as f64 / self.total_items as f64) * 100.0
        }
    }

    pub fn duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.started_at
            .map(|start| self.completed_at.unwrap_or(now) - start)
    }

    /// Counters survive a restart; the error and terminal flags do not.
    pub(crate) fn mark_starting(&mut self, status: String, now: DateTime<Utc>) {
        self.status = status;
        self.error = None;
        self.is_complete = false;
        self.is_cancelled = false;
        self.started_at = Some(now);
        self.completed_at = None;
    }

    pub(crate) fn mark_cancelled(&mut self, message: String, now: DateTime<Utc>) {
        self.status = message.clone();
        self.error = Some(message);
        self.is_cancelled = true;
        self.completed_at = Some(now);
    }
}
