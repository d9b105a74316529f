use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::doc::format::{ParagraphFormat, RunFormat};

/// Identifier of a revision marker. Unique within a document, allocated
/// max-plus-one, never reused.
pub type RevisionId = u32;

/// Identifier of a comment. Same allocation rule as [`RevisionId`], in its
/// own namespace.
pub type CommentId = u32;

/// Attribution shared by every revision marker kind: who made the change,
/// when, and the marker's document-unique id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: RevisionId,
    pub author: String,
    pub date: DateTime<Utc>,
}

impl Marker {
    pub fn new(id: RevisionId, author: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id,
            author: author.into(),
            date,
        }
    }
}

/// Whether a tracked-run wrapper records an insertion or a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Insertion,
    Deletion,
}

/// Content of a run. Closed set: a run carries exactly one kind of content,
/// so a comment-reference run can never also hold live text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunContent {
    /// Live text, part of the document's rendered content.
    Text(String),
    /// Deleted text inside a Deletion wrapper. Never counted as live text.
    DelText(String),
    /// Reference glyph pointing at a comment record.
    CommentReference(CommentId),
    /// Explicit page break (emitted between merged documents).
    PageBreak,
}

/// The atomic unit revisions attach to: one content item plus its formatting
/// set, with an optional pending format change recording the previous set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub content: RunContent,
    #[serde(default)]
    pub format: RunFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_change: Option<FormatChange>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            format: RunFormat::default(),
            format_change: None,
        }
    }

    pub fn deleted(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::DelText(text.into()),
            format: RunFormat::default(),
            format_change: None,
        }
    }

    pub fn reference(comment: CommentId) -> Self {
        Self {
            content: RunContent::CommentReference(comment),
            format: RunFormat::default(),
            format_change: None,
        }
    }

    pub fn page_break() -> Self {
        Self {
            content: RunContent::PageBreak,
            format: RunFormat::default(),
            format_change: None,
        }
    }

    /// Live text of this run, if any.
    pub fn live_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A pending run-format change. The snapshot holds the *previous* formatting
/// so rejection can restore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatChange {
    pub marker: Marker,
    pub previous: RunFormat,
}

/// An Insertion or Deletion wrapper around one or more runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRuns {
    pub marker: Marker,
    pub kind: TrackKind,
    pub runs: Vec<Run>,
}

impl TrackedRuns {
    pub fn insertion(marker: Marker, runs: Vec<Run>) -> Self {
        Self {
            marker,
            kind: TrackKind::Insertion,
            runs,
        }
    }

    pub fn deletion(marker: Marker, runs: Vec<Run>) -> Self {
        Self {
            marker,
            kind: TrackKind::Deletion,
            runs,
        }
    }
}

/// Inline content of a paragraph, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    Run(Run),
    Tracked(TrackedRuns),
    CommentStart(CommentId),
    CommentEnd(CommentId),
}

/// A pending paragraph-property change with the previous style and format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphChange {
    pub marker: Marker,
    pub previous_style: String,
    pub previous_format: ParagraphFormat,
}

/// A pending section-property change with the previous section format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionChange {
    pub marker: Marker,
    pub previous: crate::doc::format::SectionFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Named style, e.g. "Normal", "Heading 1", "List Bullet".
    pub style: String,
    #[serde(default)]
    pub format: ParagraphFormat,
    /// Pending paragraph-property change, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_change: Option<ParagraphChange>,
    /// Pending deletion of the paragraph mark itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_deletion: Option<Marker>,
    #[serde(default)]
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            format: ParagraphFormat::default(),
            property_change: None,
            mark_deletion: None,
            children: Vec::new(),
        }
    }

    /// A plain paragraph holding one live run.
    pub fn with_text(style: impl Into<String>, text: impl Into<String>) -> Self {
        let mut para = Self::new(style);
        para.children.push(Inline::Run(Run::text(text)));
        para
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

/// Top-level content of a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}
