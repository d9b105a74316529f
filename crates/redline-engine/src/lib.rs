pub mod comment;
pub mod diff;
pub mod doc;
pub mod error;
pub mod io;
pub mod merge;
pub mod revise;

// Re-export key types for easier usage
pub use comment::{Comment, CommentExport, CommentSelector, CommentStore};
pub use diff::{DiffOp, DiffReport, DiffSummary, Granularity, WordOp, diff_documents};
pub use doc::{Document, Paragraph, TextView};
pub use error::{Error, Result};
pub use io::{load_document, save_document};
pub use merge::merge_documents;
pub use revise::{Action, ChangeRecord, build_redline, collect_changes, resolve, summarize};
