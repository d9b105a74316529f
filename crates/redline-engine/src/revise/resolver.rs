//! Accept/reject resolution of pending revision markers.

use crate::comment::CommentSelector;
use crate::doc::{
    CommentId, Document, Inline, Marker, Paragraph, Run, RunContent, TrackKind, TrackedRuns,
};

/// Terminal transition applied to every matching marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep the new state: unwrap insertions, drop deletions, keep current
    /// formatting.
    Accept,
    /// Restore the old state: drop insertions, revive deletions, restore
    /// snapshot formatting.
    Reject,
}

/// Resolve every pending marker in document order, exactly once each.
///
/// Markers whose author does not match `author_filter` (when set) are left
/// pending and not counted. Returns the number of markers resolved; a
/// document with no matching markers comes back structurally unchanged with
/// a zero count, so the operation is idempotent.
///
/// Malformed marker content never raises: a Deletion wrapper without
/// deleted-text runs is treated as a zero-content deletion, because both
/// "accepting preserves all live text" and "rejecting preserves all
/// original text" must hold even for degenerate input. Removing revision
/// content that carries a comment reference also removes the comment record
/// and its anchors, so no orphaned reference survives.
pub fn resolve(doc: &mut Document, action: Action, author_filter: Option<&str>) -> usize {
    let mut resolved = 0;
    let mut dropped_comments: Vec<CommentId> = Vec::new();

    for para in doc.paragraphs_mut() {
        resolved += resolve_paragraph(para, action, author_filter, &mut dropped_comments);
    }

    if let Some(change) = doc.section_change()
        && author_matches(&change.marker, author_filter)
    {
        let previous = change.previous.clone();
        if action == Action::Reject {
            doc.set_section(previous);
        }
        doc.set_section_change(None);
        resolved += 1;
    }

    for id in dropped_comments {
        // The record may already be gone if two removed runs referenced it.
        let _ = doc.remove_comments(CommentSelector::Id(id));
    }

    log::debug!(
        "resolved {resolved} marker(s) with {action:?}{}",
        author_filter
            .map(|a| format!(" for author {a}"))
            .unwrap_or_default()
    );
    resolved
}

fn resolve_paragraph(
    para: &mut Paragraph,
    action: Action,
    author_filter: Option<&str>,
    dropped_comments: &mut Vec<CommentId>,
) -> usize {
    let mut resolved = 0;

    // Pass 1: insertion/deletion wrappers.
    let children = std::mem::take(&mut para.children);
    let mut kept = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Inline::Tracked(tracked) if author_matches(&tracked.marker, author_filter) => {
                resolved += 1;
                resolve_tracked(tracked, action, &mut kept, dropped_comments);
            }
            other => kept.push(other),
        }
    }
    para.children = kept;

    // Pass 2: run-format changes, including runs inside wrappers that were
    // left pending.
    for child in &mut para.children {
        match child {
            Inline::Run(run) => resolved += resolve_format_change(run, action, author_filter),
            Inline::Tracked(tracked) => {
                for run in &mut tracked.runs {
                    resolved += resolve_format_change(run, action, author_filter);
                }
            }
            _ => {}
        }
    }

    if let Some(change) = &para.property_change
        && author_matches(&change.marker, author_filter)
    {
        if action == Action::Reject {
            para.style = change.previous_style.clone();
            para.format = change.previous_format.clone();
        }
        para.property_change = None;
        resolved += 1;
    }

    // Paragraph-mark deletions only ever drop the marker; the paragraph
    // boundary itself stays.
    if let Some(marker) = &para.mark_deletion
        && author_matches(marker, author_filter)
    {
        para.mark_deletion = None;
        resolved += 1;
    }

    resolved
}

fn resolve_tracked(
    tracked: TrackedRuns,
    action: Action,
    kept: &mut Vec<Inline>,
    dropped_comments: &mut Vec<CommentId>,
) {
    match (tracked.kind, action) {
        // Unwrap: the contained runs survive as plain content.
        (TrackKind::Insertion, Action::Accept) => {
            kept.extend(tracked.runs.into_iter().map(Inline::Run));
        }
        // Discard wrapper and contents entirely.
        (TrackKind::Insertion, Action::Reject) | (TrackKind::Deletion, Action::Accept) => {
            for run in &tracked.runs {
                if let RunContent::CommentReference(id) = &run.content {
                    dropped_comments.push(*id);
                }
            }
        }
        // Unwrap, converting deleted text back to live text.
        (TrackKind::Deletion, Action::Reject) => {
            for mut run in tracked.runs {
                if let RunContent::DelText(text) = run.content {
                    run.content = RunContent::Text(text);
                }
                kept.push(Inline::Run(run));
            }
        }
    }
}

fn resolve_format_change(run: &mut Run, action: Action, author_filter: Option<&str>) -> usize {
    let Some(change) = &run.format_change else {
        return 0;
    };
    if !author_matches(&change.marker, author_filter) {
        return 0;
    }
    if action == Action::Reject {
        run.format = change.previous.clone();
    }
    run.format_change = None;
    1
}

fn author_matches(marker: &Marker, author_filter: Option<&str>) -> bool {
    author_filter.is_none_or(|author| marker.author == author)
}
