//! Revision markers: building redlines from diffs, resolving pending
//! changes, and listing what is pending.

pub mod builder;
pub mod changes;
pub mod resolver;

pub use builder::build_redline;
pub use changes::{ChangeKind, ChangeRecord, ChangeSummary, collect_changes, summarize};
pub use resolver::{Action, resolve};
