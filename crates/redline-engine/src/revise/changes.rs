//! Listing and summarizing pending markers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::doc::{Document, Inline, Marker, RevisionId, RunContent, TrackKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insertion,
    Deletion,
    FormatChange,
    ParagraphChange,
    SectionChange,
}

/// One pending marker, flattened for listing and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub id: RevisionId,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub author: String,
    pub date: DateTime<Utc>,
    pub text: String,
}

impl ChangeRecord {
    fn new(marker: &Marker, kind: ChangeKind, text: String) -> Self {
        Self {
            id: marker.id,
            kind,
            author: marker.author.clone(),
            date: marker.date,
            text,
        }
    }
}

/// Collect every pending marker in document order.
///
/// Insertions and deletions with no text are skipped; format changes with
/// no surrounding text are reported as formatting-only.
pub fn collect_changes(doc: &Document) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();
    for para in doc.paragraphs() {
        if let Some(change) = &para.property_change {
            changes.push(ChangeRecord::new(
                &change.marker,
                ChangeKind::ParagraphChange,
                "(paragraph formatting change)".into(),
            ));
        }
        if let Some(marker) = &para.mark_deletion {
            changes.push(ChangeRecord::new(
                marker,
                ChangeKind::Deletion,
                "(paragraph mark)".into(),
            ));
        }
        for child in &para.children {
            match child {
                Inline::Run(run) => {
                    if let Some(change) = &run.format_change {
                        let text = run.live_text().unwrap_or("(formatting only)");
                        changes.push(ChangeRecord::new(
                            &change.marker,
                            ChangeKind::FormatChange,
                            text.into(),
                        ));
                    }
                }
                Inline::Tracked(tracked) => {
                    let mut text = String::new();
                    for run in &tracked.runs {
                        match &run.content {
                            RunContent::Text(t) | RunContent::DelText(t) => text.push_str(t),
                            _ => {}
                        }
                        if let Some(change) = &run.format_change {
                            changes.push(ChangeRecord::new(
                                &change.marker,
                                ChangeKind::FormatChange,
                                run.live_text().unwrap_or("(formatting only)").into(),
                            ));
                        }
                    }
                    if !text.is_empty() {
                        let kind = match tracked.kind {
                            TrackKind::Insertion => ChangeKind::Insertion,
                            TrackKind::Deletion => ChangeKind::Deletion,
                        };
                        changes.push(ChangeRecord::new(&tracked.marker, kind, text));
                    }
                }
                _ => {}
            }
        }
    }
    if let Some(change) = doc.section_change() {
        changes.push(ChangeRecord::new(
            &change.marker,
            ChangeKind::SectionChange,
            "(section formatting change)".into(),
        ));
    }
    changes
}

/// Pending changes of one author, grouped for the summary view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorChanges {
    pub insertions: Vec<String>,
    pub deletions: Vec<String>,
    pub formatting: Vec<String>,
}

impl AuthorChanges {
    pub fn total(&self) -> usize {
        self.insertions.len() + self.deletions.len() + self.formatting.len()
    }
}

/// Document-wide summary of pending changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSummary {
    pub total: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub format_changes: usize,
    pub paragraph_changes: usize,
    pub section_changes: usize,
    /// Per-author breakdown, sorted by author name.
    pub by_author: BTreeMap<String, AuthorChanges>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

pub fn summarize(doc: &Document) -> ChangeSummary {
    let changes = collect_changes(doc);
    let mut summary = ChangeSummary {
        total: changes.len(),
        ..Default::default()
    };
    for change in changes {
        match change.kind {
            ChangeKind::Insertion => summary.insertions += 1,
            ChangeKind::Deletion => summary.deletions += 1,
            ChangeKind::FormatChange => summary.format_changes += 1,
            ChangeKind::ParagraphChange => summary.paragraph_changes += 1,
            ChangeKind::SectionChange => summary.section_changes += 1,
        }
        summary.earliest = Some(match summary.earliest {
            Some(e) => e.min(change.date),
            None => change.date,
        });
        summary.latest = Some(match summary.latest {
            Some(l) => l.max(change.date),
            None => change.date,
        });
        let author = summary.by_author.entry(change.author).or_default();
        match change.kind {
            ChangeKind::Insertion => author.insertions.push(change.text),
            ChangeKind::Deletion => author.deletions.push(change.text),
            _ => author.formatting.push(change.text),
        }
    }
    summary
}
