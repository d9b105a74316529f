//! Serializable comparison reports rendered from a diff op-stream.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diff::{DiffOp, WordOp};

/// Per-kind paragraph counts for a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub modified: usize,
}

impl DiffSummary {
    pub fn of(ops: &[DiffOp]) -> Self {
        let mut summary = Self::default();
        for op in ops {
            match op {
                DiffOp::Equal { .. } => summary.unchanged += 1,
                DiffOp::Inserted { .. } => summary.inserted += 1,
                DiffOp::Deleted { .. } => summary.deleted += 1,
                DiffOp::Modified { .. } => summary.modified += 1,
            }
        }
        summary
    }
}

/// Full comparison report, serialized as-is for the JSON output format.
#[derive(Debug, Serialize)]
pub struct DiffReport<'a> {
    pub original: &'a str,
    pub revised: &'a str,
    pub date: DateTime<Utc>,
    pub summary: DiffSummary,
    pub diffs: &'a [DiffOp],
}

impl<'a> DiffReport<'a> {
    pub fn new(
        original: &'a str,
        revised: &'a str,
        date: DateTime<Utc>,
        diffs: &'a [DiffOp],
    ) -> Self {
        Self {
            original,
            revised,
            date,
            summary: DiffSummary::of(diffs),
            diffs,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable Markdown rendering: a summary section followed by one
    /// line per paragraph, `+`/`-`/`~` prefixed, with word-level detail for
    /// modified paragraphs.
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# Document Comparison".to_string());
        lines.push(String::new());
        lines.push(format!("**Original:** {}", self.original));
        lines.push(format!("**Revised:** {}", self.revised));
        lines.push(format!("**Date:** {}", self.date.format("%Y-%m-%d %H:%M")));
        lines.push(String::new());
        lines.push("## Summary".to_string());
        lines.push(String::new());
        lines.push(format!("- Unchanged paragraphs: {}", self.summary.unchanged));
        lines.push(format!("- Inserted paragraphs: {}", self.summary.inserted));
        lines.push(format!("- Deleted paragraphs: {}", self.summary.deleted));
        if self.summary.modified > 0 {
            lines.push(format!("- Modified paragraphs: {}", self.summary.modified));
        }
        lines.push(String::new());
        lines.push("## Changes".to_string());
        lines.push(String::new());

        for op in self.diffs {
            match op {
                DiffOp::Equal { text, .. } => {
                    lines.push(format!("  {}", truncate(text, 80)));
                }
                DiffOp::Inserted { text, .. } => lines.push(format!("+ {text}")),
                DiffOp::Deleted { text, .. } => lines.push(format!("- {text}")),
                DiffOp::Modified {
                    original_text,
                    revised_text,
                    word_diffs,
                    ..
                } => {
                    lines.push(format!("~ Original: {original_text}"));
                    lines.push(format!("~ Revised:  {revised_text}"));
                    let detail: Vec<String> = word_diffs
                        .iter()
                        .map(|wd| match wd {
                            WordOp::Equal { text } => text.clone(),
                            WordOp::Deleted { text } => format!("[-{text}-]"),
                            WordOp::Inserted { text } => format!("[+{text}+]"),
                        })
                        .collect();
                    lines.push(format!("  Detail: {}", detail.join(" ")));
                }
            }
        }
        lines.join("\n")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Granularity, ParagraphText, diff};

    #[test]
    fn summary_counts_each_kind() {
        let a = vec![
            ParagraphText::new("same", "Normal"),
            ParagraphText::new("gone", "Normal"),
        ];
        let b = vec![
            ParagraphText::new("same", "Normal"),
            ParagraphText::new("new", "Normal"),
        ];
        let ops = diff(&a, &b, Granularity::Paragraph);
        let summary = DiffSummary::of(&ops);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.modified, 0);
    }

    #[test]
    fn markdown_report_marks_insertions_and_deletions() {
        let ops = vec![
            DiffOp::Deleted {
                text: "old line".into(),
                style: "Normal".into(),
            },
            DiffOp::Inserted {
                text: "new line".into(),
                style: "Normal".into(),
            },
        ];
        let report = DiffReport::new("a.doc", "b.doc", Utc::now(), &ops);
        let md = report.to_markdown();
        assert!(md.contains("- old line"));
        assert!(md.contains("+ new line"));
        assert!(md.contains("**Original:** a.doc"));
    }

    #[test]
    fn json_report_tags_op_types() {
        let ops = vec![DiffOp::Equal {
            text: "x".into(),
            style: "Normal".into(),
        }];
        let report = DiffReport::new("a", "b", Utc::now(), &ops);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"type\": \"equal\""));
        assert!(json.contains("\"unchanged\": 1"));
    }
}
