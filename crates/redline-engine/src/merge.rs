//! Concatenating documents into one, with ID remapping.

use std::collections::HashMap;

use crate::comment::Comment;
use crate::doc::{Block, CommentId, Document, Inline, Paragraph, RevisionId, Run, RunContent};
use crate::error::{Error, Result};

/// Merge documents in order into a single document.
///
/// The first document contributes its section properties; later documents
/// contribute blocks only. Revision markers and comments keep their content
/// but get fresh IDs in the merged document, so markers from different
/// sources never collide. With `page_breaks` set, a page-break paragraph is
/// placed between consecutive documents.
pub fn merge_documents(docs: &[Document], page_breaks: bool) -> Result<Document> {
    let Some((first, rest)) = docs.split_first() else {
        return Err(Error::InvalidDocument(
            "merge requires at least one document".into(),
        ));
    };

    let mut merged = first.clone();
    merged.reseed_counters();

    for doc in rest {
        if page_breaks {
            let mut para = Paragraph::new("Normal");
            para.children.push(Inline::Run(Run::page_break()));
            merged.push_block(Block::Paragraph(para));
        }
        append(&mut merged, doc.clone());
    }

    merged.validate()?;
    log::debug!(
        "merged {} documents into {} blocks",
        docs.len(),
        merged.blocks().len()
    );
    Ok(merged)
}

fn append(merged: &mut Document, mut doc: Document) {
    let revision_map = remap_revisions(merged, &doc);
    let comment_map = remap_comments(merged, &doc);

    for para in doc.paragraphs_mut() {
        if let Some(change) = &mut para.property_change {
            apply(&mut change.marker.id, &revision_map);
        }
        if let Some(marker) = &mut para.mark_deletion {
            apply(&mut marker.id, &revision_map);
        }
        for child in &mut para.children {
            match child {
                Inline::Run(run) => remap_run(run, &revision_map, &comment_map),
                Inline::Tracked(tracked) => {
                    apply(&mut tracked.marker.id, &revision_map);
                    for run in &mut tracked.runs {
                        remap_run(run, &revision_map, &comment_map);
                    }
                }
                Inline::CommentStart(id) | Inline::CommentEnd(id) => apply(id, &comment_map),
            }
        }
    }

    for block in std::mem::take(&mut doc.blocks) {
        merged.push_block(block);
    }
}

/// Fresh IDs for every revision marker of `doc`, allocated from `merged`.
fn remap_revisions(
    merged: &mut Document,
    doc: &Document,
) -> HashMap<RevisionId, RevisionId> {
    let mut seen = Vec::new();
    doc.visit_revision_ids(|id| {
        if !seen.contains(&id) {
            seen.push(id);
        }
    });
    seen.into_iter()
        .map(|old| (old, merged.allocate_revision_id()))
        .collect()
}

/// Fresh IDs for every comment of `doc`; the remapped records go straight
/// into the merged side table.
fn remap_comments(merged: &mut Document, doc: &Document) -> HashMap<CommentId, CommentId> {
    let mut map = HashMap::new();
    for comment in doc.comments().iter() {
        let new_id = merged.allocate_comment_id();
        map.insert(comment.id, new_id);
        merged.comments.insert(Comment {
            id: new_id,
            ..comment.clone()
        });
    }
    map
}

fn remap_run(
    run: &mut Run,
    revisions: &HashMap<RevisionId, RevisionId>,
    comments: &HashMap<CommentId, CommentId>,
) {
    if let Some(change) = &mut run.format_change {
        apply(&mut change.marker.id, revisions);
    }
    if let RunContent::CommentReference(id) = &mut run.content {
        apply(id, comments);
    }
}

fn apply(id: &mut u32, map: &HashMap<u32, u32>) {
    if let Some(new_id) = map.get(id) {
        *id = *new_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Marker, TextView, TrackedRuns};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn plain(texts: &[&str]) -> Document {
        Document::from_paragraphs(texts.iter().map(|t| Paragraph::with_text("Normal", *t)).collect())
    }

    fn with_insertion(text: &str, id: RevisionId) -> Document {
        let mut para = Paragraph::new("Normal");
        para.children.push(Inline::Tracked(TrackedRuns::insertion(
            Marker::new(id, "Reviewer", Utc::now()),
            vec![Run::text(text)],
        )));
        Document::from_paragraphs(vec![para])
    }

    #[test]
    fn no_documents_is_an_error() {
        assert!(matches!(
            merge_documents(&[], false),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn single_document_merges_to_itself() {
        let doc = plain(&["only"]);
        let merged = merge_documents(&[doc.clone()], true).unwrap();
        assert_eq!(merged, doc);
    }

    #[test]
    fn blocks_concatenate_in_order() {
        let merged = merge_documents(&[plain(&["a"]), plain(&["b", "c"])], false).unwrap();
        assert_eq!(
            merged.paragraph_texts(TextView::Current),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn page_breaks_separate_documents() {
        let merged = merge_documents(&[plain(&["a"]), plain(&["b"])], true).unwrap();
        assert_eq!(merged.blocks().len(), 3);
        let Block::Paragraph(separator) = &merged.blocks()[1] else {
            panic!("separator must be a paragraph");
        };
        assert!(matches!(
            separator.children[0],
            Inline::Run(Run {
                content: RunContent::PageBreak,
                ..
            })
        ));
    }

    #[test]
    fn colliding_revision_ids_are_remapped() {
        let merged = merge_documents(
            &[with_insertion("one", 0), with_insertion("two", 0)],
            false,
        )
        .unwrap();
        merged.validate().unwrap();
        assert_eq!(merged.max_revision_id(), Some(1));
    }

    #[test]
    fn comments_keep_their_text_under_new_ids() {
        let mut a = plain(&["alpha"]);
        a.add_comment("alpha", "first", "Jane", Utc::now()).unwrap();
        let mut b = plain(&["beta"]);
        b.add_comment("beta", "second", "Joe", Utc::now()).unwrap();

        let merged = merge_documents(&[a, b], false).unwrap();
        merged.validate().unwrap();
        let exports = merged.export_comments();
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].text, "first");
        assert_eq!(exports[1].text, "second");
        assert_eq!((exports[0].id, exports[1].id), (0, 1));
    }

    #[test]
    fn first_documents_section_wins() {
        let mut a = plain(&["a"]);
        let mut section = crate::doc::SectionFormat::default();
        section.page_width = Some(12240);
        a.set_section(section.clone());
        let mut b = plain(&["b"]);
        b.set_section(crate::doc::SectionFormat::default());

        let merged = merge_documents(&[a, b], false).unwrap();
        assert_eq!(merged.section(), &section);
    }
}
