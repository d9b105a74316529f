//! Redline generation: turn a diff op-stream into a tracked-changes
//! document.

use chrono::{DateTime, Utc};

use crate::diff::{DiffOp, WordOp};
use crate::doc::{Document, Inline, Marker, Paragraph, Run, TrackedRuns};
use crate::error::Result;

/// Build a redline document from a diff op-stream.
///
/// Equal ops become plain paragraphs; Inserted ops are wrapped in an
/// Insertion marker; Deleted ops in a Deletion marker holding deleted text;
/// Modified ops become a single paragraph of alternating live, Insertion
/// and Deletion runs derived from the nested word ops. Each marker gets a
/// fresh ID from a counter seeded past the highest ID already present in
/// `base`. Section properties are carried over from `base`.
///
/// The result is validated before being returned; a structurally invalid
/// document is a construction defect, not a recoverable condition.
pub fn build_redline(
    base: &Document,
    ops: &[DiffOp],
    author: &str,
    timestamp: DateTime<Utc>,
) -> Result<Document> {
    let mut doc = Document::new();
    doc.set_section(base.section().clone());
    doc.revision_ids.seed(base.max_revision_id());

    for op in ops {
        let para = match op {
            DiffOp::Equal { text, style } => Paragraph::with_text(style.clone(), text.clone()),
            DiffOp::Inserted { text, style } => {
                let marker = next_marker(&mut doc, author, timestamp);
                let mut para = Paragraph::new(style.clone());
                para.children.push(Inline::Tracked(TrackedRuns::insertion(
                    marker,
                    vec![Run::text(text.clone())],
                )));
                para
            }
            DiffOp::Deleted { text, style } => {
                let marker = next_marker(&mut doc, author, timestamp);
                let mut para = Paragraph::new(style.clone());
                para.children.push(Inline::Tracked(TrackedRuns::deletion(
                    marker,
                    vec![Run::deleted(text.clone())],
                )));
                para
            }
            DiffOp::Modified {
                style, word_diffs, ..
            } => build_modified_paragraph(&mut doc, style, word_diffs, author, timestamp),
        };
        doc.push_block(crate::doc::Block::Paragraph(para));
    }

    doc.validate()?;
    Ok(doc)
}

/// One paragraph of alternating live/Insertion/Deletion runs. Every run
/// after the first carries a single leading space so both the accepted and
/// the rejected reading stay word-separated.
fn build_modified_paragraph(
    doc: &mut Document,
    style: &str,
    word_diffs: &[WordOp],
    author: &str,
    timestamp: DateTime<Utc>,
) -> Paragraph {
    let mut para = Paragraph::new(style);
    let mut first = true;
    for word_op in word_diffs {
        let spaced = |text: &str| {
            if first {
                text.to_string()
            } else {
                format!(" {text}")
            }
        };
        match word_op {
            WordOp::Equal { text } => {
                para.children.push(Inline::Run(Run::text(spaced(text))));
            }
            WordOp::Deleted { text } => {
                let marker = next_marker(doc, author, timestamp);
                para.children.push(Inline::Tracked(TrackedRuns::deletion(
                    marker,
                    vec![Run::deleted(spaced(text))],
                )));
            }
            WordOp::Inserted { text } => {
                let marker = next_marker(doc, author, timestamp);
                para.children.push(Inline::Tracked(TrackedRuns::insertion(
                    marker,
                    vec![Run::text(spaced(text))],
                )));
            }
        }
        first = false;
    }
    para
}

fn next_marker(doc: &mut Document, author: &str, timestamp: DateTime<Utc>) -> Marker {
    Marker::new(doc.allocate_revision_id(), author, timestamp)
}
