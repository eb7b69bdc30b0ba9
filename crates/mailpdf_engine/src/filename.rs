use std::ops::Range;

use chrono::{DateTime, Local};

/// `YYYY-MM-DDTHH-MM-SS_{base}_{seq}.pdf`. The timestamp is the session start,
/// shared by every document of one run.
pub fn output_document_name(session: &DateTime<Local>, base_name: &str, sequence: u32) -> String {
    format!(
        "{}_{}_{}.pdf",
        session.format("%Y-%m-%dT%H-%M-%S"),
        base_name,
        sequence
    )
}

/// How a run splits its messages over output documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    session: DateTime<Local>,
    base_name: String,
    per_document: usize,
    total_items: usize,
}

impl OutputPlan {
    pub fn new(
        session: DateTime<Local>,
        base_name: impl Into<String>,
        messages_per_document: u32,
        total_items: usize,
    ) -> Self {
        Self {
            session,
            base_name: base_name.into(),
            per_document: (messages_per_document as usize).max(1),
            total_items,
        }
    }

    pub fn document_count(&self) -> usize {
        self.total_items.div_ceil(self.per_document)
    }

    /// Message index range of the 1-based document `sequence`.
    pub fn items_for(&self, sequence: u32) -> Range<usize> {
        let start = (sequence.saturating_sub(1) as usize) * self.per_document;
        let start = start.min(self.total_items);
        start..(start + self.per_document).min(self.total_items)
    }

    pub fn name_for(&self, sequence: u32) -> String {
        output_document_name(&self.session, &self.base_name, sequence)
    }

    pub fn names(&self) -> Vec<String> {
        (1..=self.document_count())
            .map_while(|seq| u32::try_from(seq).ok())
            .map(|seq| self.name_for(seq))
            .collect()
    }
}
