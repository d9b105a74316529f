//! In-memory document tree: blocks, runs, styles and revision wrappers.
//!
//! Every other component of the engine operates exclusively through this
//! model. Revision markers are a closed set: Insertion and Deletion wrap
//! runs; format, paragraph-property and section-property changes carry a
//! snapshot of the previous state so rejection can restore it. Splicing is
//! plain `Vec` insertion/removal on a paragraph's inline children.

pub mod document;
pub mod format;
pub mod node;

pub use document::{Document, IdAllocator, TextView, paragraph_text};
pub use format::{Alignment, ParagraphFormat, RunFormat, SectionFormat};
pub use node::{
    Block, CommentId, FormatChange, Inline, Marker, Paragraph, ParagraphChange, RevisionId, Run,
    RunContent, SectionChange, Table, TableCell, TableRow, TrackKind, TrackedRuns,
};
