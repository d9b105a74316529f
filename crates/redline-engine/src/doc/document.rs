use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::comment::CommentStore;
use crate::doc::format::SectionFormat;
use crate::doc::node::{
    Block, CommentId, Inline, Paragraph, RevisionId, Run, RunContent, SectionChange, TrackKind,
};
use crate::error::{Error, Result};

/// Which of the two texts a marked-up paragraph encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextView {
    /// The revised text: insertions included, deleted text excluded.
    Current,
    /// The pre-change text: deleted text included, insertions excluded.
    Original,
}

/// Explicit max-plus-one ID counter owned by the document.
///
/// Reseeded from the maximum ID present in the tree on every load, so no
/// process-wide state is involved. IDs are never reused after removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Position the counter just past the highest ID seen, or at zero.
    pub fn seed(&mut self, max_seen: Option<u32>) {
        self.next = max_seen.map_or(0, |max| max + 1);
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// In-memory document tree: ordered blocks, section properties and a comment
/// side table. Every component of the engine operates through this type;
/// each top-level command loads a snapshot, mutates it in place and saves it
/// atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub(crate) blocks: Vec<Block>,
    #[serde(default)]
    pub(crate) section: SectionFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) section_change: Option<SectionChange>,
    #[serde(default)]
    pub(crate) comments: CommentStore,
    #[serde(skip)]
    pub(crate) revision_ids: IdAllocator,
    #[serde(skip)]
    pub(crate) comment_ids: IdAllocator,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        let mut doc = Self::new();
        doc.blocks = paragraphs.into_iter().map(Block::Paragraph).collect();
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn section(&self) -> &SectionFormat {
        &self.section
    }

    pub fn set_section(&mut self, section: SectionFormat) {
        self.section = section;
    }

    pub fn section_change(&self) -> Option<&SectionChange> {
        self.section_change.as_ref()
    }

    pub fn set_section_change(&mut self, change: Option<SectionChange>) {
        self.section_change = change;
    }

    pub fn comments(&self) -> &CommentStore {
        &self.comments
    }

    /// All paragraphs in document order, including table cell paragraphs.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(para) => out.push(para),
                Block::Table(table) => {
                    for row in &table.rows {
                        for cell in &row.cells {
                            out.extend(cell.paragraphs.iter());
                        }
                    }
                }
            }
        }
        out
    }

    pub fn paragraphs_mut(&mut self) -> Vec<&mut Paragraph> {
        let mut out = Vec::new();
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(para) => out.push(para),
                Block::Table(table) => {
                    for row in &mut table.rows {
                        for cell in &mut row.cells {
                            out.extend(cell.paragraphs.iter_mut());
                        }
                    }
                }
            }
        }
        out
    }

    pub fn allocate_revision_id(&mut self) -> RevisionId {
        self.revision_ids.allocate()
    }

    pub fn allocate_comment_id(&mut self) -> CommentId {
        self.comment_ids.allocate()
    }

    /// Highest revision-marker ID present in the tree, if any.
    pub fn max_revision_id(&self) -> Option<RevisionId> {
        let mut max: Option<RevisionId> = None;
        self.visit_revision_ids(|id| max = Some(max.map_or(id, |m| m.max(id))));
        max
    }

    /// Highest comment ID present in the side table or the tree, if any.
    pub fn max_comment_id(&self) -> Option<CommentId> {
        let mut max = self.comments.max_id();
        let mut note = |id: CommentId| max = Some(max.map_or(id, |m| m.max(id)));
        for para in self.paragraphs() {
            for child in &para.children {
                match child {
                    Inline::CommentStart(id) | Inline::CommentEnd(id) => note(*id),
                    Inline::Run(run) => {
                        if let RunContent::CommentReference(id) = &run.content {
                            note(*id);
                        }
                    }
                    Inline::Tracked(tracked) => {
                        for run in &tracked.runs {
                            if let RunContent::CommentReference(id) = &run.content {
                                note(*id);
                            }
                        }
                    }
                }
            }
        }
        max
    }

    /// Recompute both ID counters from the tree. Called after every load so
    /// freshly allocated IDs never collide with existing ones.
    pub fn reseed_counters(&mut self) {
        let max_revision = self.max_revision_id();
        let max_comment = self.max_comment_id();
        self.revision_ids.seed(max_revision);
        self.comment_ids.seed(max_comment);
    }

    /// Per-paragraph text in the requested view, top-level paragraphs only.
    /// Tables are opaque blocks here and are skipped.
    pub fn paragraph_texts(&self, view: TextView) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(para) => Some(paragraph_text(para, view)),
                Block::Table(_) => None,
            })
            .collect()
    }

    pub(crate) fn visit_revision_ids(&self, mut f: impl FnMut(RevisionId)) {
        for para in self.paragraphs() {
            if let Some(change) = &para.property_change {
                f(change.marker.id);
            }
            if let Some(marker) = &para.mark_deletion {
                f(marker.id);
            }
            for child in &para.children {
                match child {
                    Inline::Run(run) => {
                        if let Some(change) = &run.format_change {
                            f(change.marker.id);
                        }
                    }
                    Inline::Tracked(tracked) => {
                        f(tracked.marker.id);
                        for run in &tracked.runs {
                            if let Some(change) = &run.format_change {
                                f(change.marker.id);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        if let Some(change) = &self.section_change {
            f(change.marker.id);
        }
    }

    /// Check the structural invariants every document handed to a resolver or
    /// a store must satisfy:
    ///
    /// - revision and comment IDs are pairwise distinct,
    /// - deleted text lives only inside Deletion wrappers,
    /// - every comment anchor pair is complete, start before end, within one
    ///   paragraph, and backed by a comment record,
    /// - every comment record has its anchor pair in the tree.
    pub fn validate(&self) -> Result<()> {
        let mut revision_ids = HashSet::new();
        let mut duplicate = None;
        self.visit_revision_ids(|id| {
            if !revision_ids.insert(id) {
                duplicate = Some(id);
            }
        });
        if let Some(id) = duplicate {
            return Err(Error::InvalidDocument(format!(
                "duplicate revision marker id {id}"
            )));
        }

        let mut starts_seen: HashSet<CommentId> = HashSet::new();
        let mut ends_seen: HashSet<CommentId> = HashSet::new();
        let mut references: HashSet<CommentId> = HashSet::new();
        for para in self.paragraphs() {
            if para.style.is_empty() {
                return Err(Error::InvalidDocument(
                    "paragraph with empty style name".into(),
                ));
            }
            let mut open: HashSet<CommentId> = HashSet::new();
            for child in &para.children {
                match child {
                    Inline::CommentStart(id) => {
                        if !starts_seen.insert(*id) {
                            return Err(Error::InvalidDocument(format!(
                                "duplicate comment start anchor for id {id}"
                            )));
                        }
                        open.insert(*id);
                    }
                    Inline::CommentEnd(id) => {
                        if !open.remove(id) {
                            return Err(Error::InvalidDocument(format!(
                                "comment end anchor for id {id} precedes its start"
                            )));
                        }
                        ends_seen.insert(*id);
                    }
                    Inline::Run(run) => {
                        if matches!(run.content, RunContent::DelText(_)) {
                            return Err(Error::InvalidDocument(
                                "deleted text outside a deletion wrapper".into(),
                            ));
                        }
                        if let RunContent::CommentReference(id) = &run.content {
                            references.insert(*id);
                        }
                    }
                    Inline::Tracked(tracked) => {
                        for run in &tracked.runs {
                            if tracked.kind == TrackKind::Insertion
                                && matches!(run.content, RunContent::DelText(_))
                            {
                                return Err(Error::InvalidDocument(
                                    "deleted text inside an insertion wrapper".into(),
                                ));
                            }
                            if let RunContent::CommentReference(id) = &run.content {
                                references.insert(*id);
                            }
                        }
                    }
                }
            }
            if let Some(id) = open.iter().next() {
                return Err(Error::InvalidDocument(format!(
                    "comment start anchor for id {id} has no end anchor in its paragraph"
                )));
            }
        }

        for id in starts_seen.iter().chain(&references) {
            if self.comments.get(*id).is_none() {
                return Err(Error::OrphanReference(format!(
                    "comment anchor {id} has no comment record"
                )));
            }
        }
        for comment in self.comments.iter() {
            if !starts_seen.contains(&comment.id) || !ends_seen.contains(&comment.id) {
                return Err(Error::OrphanReference(format!(
                    "comment record {} has no anchor pair in the tree",
                    comment.id
                )));
            }
        }
        Ok(())
    }
}

/// Text of one paragraph in the given view.
pub fn paragraph_text(para: &Paragraph, view: TextView) -> String {
    let mut out = String::new();
    for child in &para.children {
        match child {
            Inline::Run(run) => push_run_text(&mut out, run, view),
            Inline::Tracked(tracked) => match (tracked.kind, view) {
                (TrackKind::Insertion, TextView::Original) => {}
                _ => {
                    for run in &tracked.runs {
                        push_run_text(&mut out, run, view);
                    }
                }
            },
            Inline::CommentStart(_) | Inline::CommentEnd(_) => {}
        }
    }
    out
}

fn push_run_text(out: &mut String, run: &Run, view: TextView) {
    match (&run.content, view) {
        (RunContent::Text(text), _) => out.push_str(text),
        (RunContent::DelText(text), TextView::Original) => out.push_str(text),
        _ => {}
    }
}
