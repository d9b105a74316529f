//! Comments: the record side table and the anchor operations on the tree.
//!
//! A comment is a record in the [`CommentStore`] plus three things in the
//! tree, all carrying the same ID: a start anchor, an end anchor in the same
//! paragraph, and a reference run placed right after the end anchor. The
//! operations here keep the two sides consistent; [`Document::validate`]
//! rejects trees where they have drifted apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::doc::{CommentId, Document, Inline, Paragraph, Run, RunContent, TextView};
use crate::error::{Error, Result};

/// One comment record. Anchoring lives in the document tree, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub initials: String,
    pub date: DateTime<Utc>,
    pub body: String,
}

/// Side table of comment records, ordered by insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentStore {
    records: Vec<Comment>,
}

impl CommentStore {
    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.records.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.records.iter()
    }

    pub fn insert(&mut self, comment: Comment) {
        self.records.push(comment);
    }

    pub fn remove(&mut self, id: CommentId) -> Option<Comment> {
        let pos = self.records.iter().position(|c| c.id == id)?;
        Some(self.records.remove(pos))
    }

    pub fn max_id(&self) -> Option<CommentId> {
        self.records.iter().map(|c| c.id).max()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Which comments an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSelector {
    Id(CommentId),
    All,
}

/// One comment flattened for export, with the text its anchors span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentExport {
    pub id: CommentId,
    pub author: String,
    pub initials: String,
    pub date: DateTime<Utc>,
    pub text: String,
    pub commented_text: String,
}

impl Document {
    /// Anchor a new comment on the first live-text occurrence of
    /// `search_text`, in document order. Returns the new comment's ID, or
    /// [`Error::TextNotFound`] when no paragraph contains the text.
    pub fn add_comment(
        &mut self,
        search_text: &str,
        body: &str,
        author: &str,
        date: DateTime<Utc>,
    ) -> Result<CommentId> {
        let hit = self.paragraphs().iter().enumerate().find_map(|(i, para)| {
            if search_text.is_empty() {
                return None;
            }
            crate::doc::paragraph_text(para, TextView::Current)
                .find(search_text)
                .map(|offset| (i, offset))
        });
        let Some((para_index, offset)) = hit else {
            return Err(Error::TextNotFound(search_text.to_string()));
        };

        let id = self.allocate_comment_id();
        let initials = initials_of(author);
        {
            let mut paras = self.paragraphs_mut();
            let para = &mut paras[para_index];
            anchor(para, id, offset, offset + search_text.len());
        }
        self.comments.insert(Comment {
            id,
            author: author.to_string(),
            initials,
            date,
            body: body.to_string(),
        });
        Ok(id)
    }

    /// Remove the selected comments: their records, anchors and reference
    /// runs. `All` on a comment-free document removes nothing and succeeds;
    /// an unknown ID is [`Error::CommentNotFound`]. Returns the number of
    /// comments removed.
    pub fn remove_comments(&mut self, selector: CommentSelector) -> Result<usize> {
        let ids: Vec<CommentId> = match selector {
            CommentSelector::Id(id) => {
                if self.comments.get(id).is_none() {
                    return Err(Error::CommentNotFound(id));
                }
                vec![id]
            }
            CommentSelector::All => self.comments.iter().map(|c| c.id).collect(),
        };
        for id in &ids {
            self.comments.remove(*id);
        }
        for para in self.paragraphs_mut() {
            strip_anchors(para, &ids);
        }
        Ok(ids.len())
    }

    /// All comments in ID order, each paired with the live text its anchors
    /// span.
    pub fn export_comments(&self) -> Vec<CommentExport> {
        let mut exports: Vec<CommentExport> = self
            .comments
            .iter()
            .map(|comment| CommentExport {
                id: comment.id,
                author: comment.author.clone(),
                initials: comment.initials.clone(),
                date: comment.date,
                text: comment.body.clone(),
                commented_text: self.anchored_text(comment.id),
            })
            .collect();
        exports.sort_by_key(|e| e.id);
        exports
    }

    fn anchored_text(&self, id: CommentId) -> String {
        let mut out = String::new();
        for para in self.paragraphs() {
            let mut inside = false;
            for child in &para.children {
                match child {
                    Inline::CommentStart(anchor) if *anchor == id => inside = true,
                    Inline::CommentEnd(anchor) if *anchor == id => return out,
                    Inline::Run(run) if inside => push_live(&mut out, run),
                    Inline::Tracked(tracked) if inside => {
                        for run in &tracked.runs {
                            push_live(&mut out, run);
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }
}

fn push_live(out: &mut String, run: &Run) {
    if let RunContent::Text(text) = &run.content {
        out.push_str(text);
    }
}

/// Uppercased first letter of each word of the author name.
fn initials_of(author: &str) -> String {
    author
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Insert the anchor pair and the reference run around the live-text byte
/// range `start..end` of `para`. The end-side inlines go in first so the
/// start index stays valid.
fn anchor(para: &mut Paragraph, id: CommentId, start: usize, end: usize) {
    let mut cursor = 0usize;
    let mut start_index = None;
    let mut end_index = None;
    for (i, child) in para.children.iter().enumerate() {
        let len = live_len(child);
        if len == 0 {
            continue;
        }
        let span_end = cursor + len;
        if start_index.is_none() && start < span_end {
            start_index = Some(i);
        }
        if cursor < end {
            end_index = Some(i);
        }
        cursor = span_end;
    }
    // The caller matched against the same live text, so both bounds resolve.
    let (Some(start_index), Some(end_index)) = (start_index, end_index) else {
        return;
    };
    para.children.insert(end_index + 1, Inline::CommentEnd(id));
    para.children
        .insert(end_index + 2, Inline::Run(Run::reference(id)));
    para.children.insert(start_index, Inline::CommentStart(id));
}

/// Live-text length contributed by one inline, matching the Current view.
fn live_len(child: &Inline) -> usize {
    match child {
        Inline::Run(run) => run_live_len(run),
        Inline::Tracked(tracked) => tracked.runs.iter().map(run_live_len).sum(),
        Inline::CommentStart(_) | Inline::CommentEnd(_) => 0,
    }
}

fn run_live_len(run: &Run) -> usize {
    match &run.content {
        RunContent::Text(text) => text.len(),
        _ => 0,
    }
}

fn strip_anchors(para: &mut Paragraph, ids: &[CommentId]) {
    para.children.retain_mut(|child| match child {
        Inline::CommentStart(id) | Inline::CommentEnd(id) => !ids.contains(id),
        Inline::Run(run) => match &run.content {
            RunContent::CommentReference(id) => !ids.contains(id),
            _ => true,
        },
        Inline::Tracked(tracked) => {
            tracked.runs.retain(|run| match &run.content {
                RunContent::CommentReference(id) => !ids.contains(id),
                _ => true,
            });
            // The wrapper stays even when emptied; its marker is still a
            // pending change for the resolver.
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Marker, TrackedRuns};
    use pretty_assertions::assert_eq;

    fn doc_with(texts: &[&str]) -> Document {
        Document::from_paragraphs(texts.iter().map(|t| Paragraph::with_text("Normal", *t)).collect())
    }

    #[test]
    fn add_comment_anchors_first_match_and_records_it() {
        let mut doc = doc_with(&["Hello world", "world again"]);
        let id = doc
            .add_comment("world", "please define", "Jane Doe", Utc::now())
            .unwrap();
        assert_eq!(id, 0);
        doc.validate().unwrap();

        let comment = doc.comments().get(id).unwrap();
        assert_eq!(comment.body, "please define");
        assert_eq!(comment.initials, "JD");

        // Anchors land in the first paragraph only.
        let paras = doc.paragraphs();
        assert!(paras[0]
            .children
            .iter()
            .any(|c| matches!(c, Inline::CommentStart(0))));
        assert!(!paras[1]
            .children
            .iter()
            .any(|c| matches!(c, Inline::CommentStart(_))));
    }

    #[test]
    fn add_comment_misses_with_text_not_found() {
        let mut doc = doc_with(&["Hello world"]);
        let err = doc
            .add_comment("absent", "x", "Jane", Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::TextNotFound(t) if t == "absent"));
        assert!(doc.comments().is_empty());
    }

    #[test]
    fn search_skips_deleted_text() {
        let mut para = Paragraph::with_text("Normal", "kept ");
        para.children.push(Inline::Tracked(TrackedRuns::deletion(
            Marker::new(0, "Reviewer", Utc::now()),
            vec![Run::deleted("gone")],
        )));
        let mut doc = Document::from_paragraphs(vec![para]);
        assert!(doc.add_comment("gone", "x", "Jane", Utc::now()).is_err());
        assert!(doc.add_comment("kept", "x", "Jane", Utc::now()).is_ok());
    }

    #[test]
    fn comment_ids_count_up_from_zero() {
        let mut doc = doc_with(&["alpha beta gamma"]);
        let a = doc.add_comment("alpha", "one", "J", Utc::now()).unwrap();
        let b = doc.add_comment("beta", "two", "J", Utc::now()).unwrap();
        assert_eq!((a, b), (0, 1));
        doc.validate().unwrap();
    }

    #[test]
    fn remove_by_id_strips_record_and_anchors() {
        let mut doc = doc_with(&["Hello world"]);
        let id = doc.add_comment("world", "x", "Jane", Utc::now()).unwrap();
        let removed = doc.remove_comments(CommentSelector::Id(id)).unwrap();
        assert_eq!(removed, 1);
        assert!(doc.comments().is_empty());
        doc.validate().unwrap();
        assert!(!doc.paragraphs()[0]
            .children
            .iter()
            .any(|c| matches!(c, Inline::CommentStart(_) | Inline::CommentEnd(_))));
    }

    #[test]
    fn remove_unknown_id_is_an_error() {
        let mut doc = doc_with(&["Hello"]);
        let err = doc.remove_comments(CommentSelector::Id(42)).unwrap_err();
        assert!(matches!(err, Error::CommentNotFound(42)));
    }

    #[test]
    fn remove_all_on_empty_store_removes_nothing() {
        let mut doc = doc_with(&["Hello"]);
        assert_eq!(doc.remove_comments(CommentSelector::All).unwrap(), 0);
    }

    #[test]
    fn remove_all_clears_every_comment() {
        let mut doc = doc_with(&["alpha beta"]);
        doc.add_comment("alpha", "one", "J", Utc::now()).unwrap();
        doc.add_comment("beta", "two", "J", Utc::now()).unwrap();
        assert_eq!(doc.remove_comments(CommentSelector::All).unwrap(), 2);
        assert!(doc.comments().is_empty());
        doc.validate().unwrap();
    }

    #[test]
    fn export_pairs_body_with_anchored_text() {
        // Anchors wrap whole inlines, so the anchored text is the full run
        // containing the match.
        let mut doc = doc_with(&["The quick brown fox"]);
        doc.add_comment("quick brown", "too fast", "Jane Doe", Utc::now())
            .unwrap();
        let exports = doc.export_comments();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].text, "too fast");
        assert_eq!(exports[0].commented_text, "The quick brown fox");
        assert_eq!(exports[0].initials, "JD");
    }

    #[test]
    fn export_orders_by_id() {
        let mut doc = doc_with(&["alpha beta gamma"]);
        doc.add_comment("gamma", "late", "J", Utc::now()).unwrap();
        doc.add_comment("alpha", "early", "J", Utc::now()).unwrap();
        let exports = doc.export_comments();
        assert_eq!(exports[0].id, 0);
        assert_eq!(exports[1].id, 1);
    }
}
