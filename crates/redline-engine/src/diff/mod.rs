//! Paragraph- and word-level diffing of two document versions.
//!
//! The diff never errors on well-formed input: identical documents degrade
//! to an all-Equal sequence, fully disjoint ones to delete+insert runs, and
//! no content is ever dropped silently. Concatenating the non-deleted spans
//! of the output reconstructs the revised text; the deleted spans
//! reconstruct the original.

pub mod align;
pub mod report;

use serde::{Deserialize, Serialize};

use crate::doc::{Document, TextView};
use align::{Opcode, Tag};

pub use report::{DiffReport, DiffSummary};

/// Alignment granularity for replaced paragraph ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Paragraph,
    Word,
}

/// One paragraph's text and named style, the diff engine's input unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphText {
    pub text: String,
    pub style: String,
}

impl ParagraphText {
    pub fn new(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
        }
    }
}

/// Word-level operation nested inside a [`DiffOp::Modified`]. The text of a
/// multi-word range is joined with single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WordOp {
    Equal { text: String },
    Deleted { text: String },
    Inserted { text: String },
}

/// Paragraph-level diff operation.
///
/// Styles on `Equal`, `Deleted` and `Modified` come from the original
/// document; the style on `Inserted` comes from the revised one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffOp {
    Equal {
        text: String,
        style: String,
    },
    Deleted {
        text: String,
        style: String,
    },
    Inserted {
        text: String,
        style: String,
    },
    Modified {
        original_text: String,
        revised_text: String,
        style: String,
        word_diffs: Vec<WordOp>,
    },
}

/// Extract the diff input from a document: live text and style of every
/// top-level paragraph.
pub fn extract_paragraphs(doc: &Document) -> Vec<ParagraphText> {
    let texts = doc.paragraph_texts(TextView::Current);
    let styles: Vec<&str> = doc
        .blocks()
        .iter()
        .filter_map(|block| match block {
            crate::doc::Block::Paragraph(para) => Some(para.style.as_str()),
            crate::doc::Block::Table(_) => None,
        })
        .collect();
    texts
        .into_iter()
        .zip(styles)
        .map(|(text, style)| ParagraphText::new(text, style))
        .collect()
}

/// Diff two paragraph sequences.
///
/// At paragraph granularity each original paragraph in a replaced range
/// becomes a `Deleted` op and each revised one an `Inserted` op, with no
/// pairing. At word granularity every (original, revised) combination in
/// the range is word-diffed independently into a `Modified` op; replace
/// ranges are expected to be small, so the quadratic pairing is accepted.
pub fn diff(
    original: &[ParagraphText],
    revised: &[ParagraphText],
    granularity: Granularity,
) -> Vec<DiffOp> {
    let original_texts: Vec<&str> = original.iter().map(|p| p.text.as_str()).collect();
    let revised_texts: Vec<&str> = revised.iter().map(|p| p.text.as_str()).collect();

    let mut ops = Vec::new();
    for opcode in align::opcodes(&original_texts, &revised_texts) {
        match opcode.tag {
            Tag::Equal => {
                for k in opcode.a_start..opcode.a_end {
                    ops.push(DiffOp::Equal {
                        text: original[k].text.clone(),
                        style: original[k].style.clone(),
                    });
                }
            }
            Tag::Replace => match granularity {
                Granularity::Word => {
                    for oi in opcode.a_start..opcode.a_end {
                        for ri in opcode.b_start..opcode.b_end {
                            ops.push(DiffOp::Modified {
                                original_text: original[oi].text.clone(),
                                revised_text: revised[ri].text.clone(),
                                style: original[oi].style.clone(),
                                word_diffs: compare_words(
                                    &original[oi].text,
                                    &revised[ri].text,
                                ),
                            });
                        }
                    }
                }
                Granularity::Paragraph => {
                    push_deleted(&mut ops, original, opcode.a_start..opcode.a_end);
                    push_inserted(&mut ops, revised, opcode.b_start..opcode.b_end);
                }
            },
            Tag::Delete => push_deleted(&mut ops, original, opcode.a_start..opcode.a_end),
            Tag::Insert => push_inserted(&mut ops, revised, opcode.b_start..opcode.b_end),
        }
    }
    ops
}

/// Diff two documents directly.
pub fn diff_documents(
    original: &Document,
    revised: &Document,
    granularity: Granularity,
) -> Vec<DiffOp> {
    diff(
        &extract_paragraphs(original),
        &extract_paragraphs(revised),
        granularity,
    )
}

fn push_deleted(ops: &mut Vec<DiffOp>, paras: &[ParagraphText], range: std::ops::Range<usize>) {
    for k in range {
        ops.push(DiffOp::Deleted {
            text: paras[k].text.clone(),
            style: paras[k].style.clone(),
        });
    }
}

fn push_inserted(ops: &mut Vec<DiffOp>, paras: &[ParagraphText], range: std::ops::Range<usize>) {
    for k in range {
        ops.push(DiffOp::Inserted {
            text: paras[k].text.clone(),
            style: paras[k].style.clone(),
        });
    }
}

/// Word-level comparison of two strings over whitespace-tokenized words.
/// Each opcode range becomes one op with its words re-joined by spaces.
pub fn compare_words(original: &str, revised: &str) -> Vec<WordOp> {
    let original_words: Vec<&str> = original.split_whitespace().collect();
    let revised_words: Vec<&str> = revised.split_whitespace().collect();

    let mut ops = Vec::new();
    for opcode in align::opcodes(&original_words, &revised_words) {
        let Opcode {
            tag,
            a_start,
            a_end,
            b_start,
            b_end,
        } = opcode;
        match tag {
            Tag::Equal => ops.push(WordOp::Equal {
                text: original_words[a_start..a_end].join(" "),
            }),
            Tag::Replace => {
                ops.push(WordOp::Deleted {
                    text: original_words[a_start..a_end].join(" "),
                });
                ops.push(WordOp::Inserted {
                    text: revised_words[b_start..b_end].join(" "),
                });
            }
            Tag::Delete => ops.push(WordOp::Deleted {
                text: original_words[a_start..a_end].join(" "),
            }),
            Tag::Insert => ops.push(WordOp::Inserted {
                text: revised_words[b_start..b_end].join(" "),
            }),
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paras(texts: &[&str]) -> Vec<ParagraphText> {
        texts
            .iter()
            .map(|t| ParagraphText::new(*t, "Normal"))
            .collect()
    }

    #[test]
    fn identical_documents_yield_all_equal() {
        let a = paras(&["Hello world"]);
        let ops = diff(&a, &a, Granularity::Paragraph);
        assert_eq!(
            ops,
            vec![DiffOp::Equal {
                text: "Hello world".into(),
                style: "Normal".into(),
            }]
        );
    }

    #[test]
    fn word_granularity_produces_nested_word_ops() {
        let a = paras(&["The cat sat."]);
        let b = paras(&["The dog sat."]);
        let ops = diff(&a, &b, Granularity::Word);
        assert_eq!(
            ops,
            vec![DiffOp::Modified {
                original_text: "The cat sat.".into(),
                revised_text: "The dog sat.".into(),
                style: "Normal".into(),
                word_diffs: vec![
                    WordOp::Equal {
                        text: "The".into()
                    },
                    WordOp::Deleted {
                        text: "cat".into()
                    },
                    WordOp::Inserted {
                        text: "dog".into()
                    },
                    WordOp::Equal {
                        text: "sat.".into()
                    },
                ],
            }]
        );
    }

    #[test]
    fn trailing_deletion_keeps_earlier_paragraph_equal() {
        let a = paras(&["P1", "P2"]);
        let b = paras(&["P1"]);
        let ops = diff(&a, &b, Granularity::Paragraph);
        assert_eq!(
            ops,
            vec![
                DiffOp::Equal {
                    text: "P1".into(),
                    style: "Normal".into(),
                },
                DiffOp::Deleted {
                    text: "P2".into(),
                    style: "Normal".into(),
                },
            ]
        );
    }

    #[test]
    fn paragraph_granularity_leaves_replacements_unpaired() {
        let a = paras(&["one", "two"]);
        let b = paras(&["uno", "dos"]);
        let ops = diff(&a, &b, Granularity::Paragraph);
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], DiffOp::Deleted { .. }));
        assert!(matches!(ops[1], DiffOp::Deleted { .. }));
        assert!(matches!(ops[2], DiffOp::Inserted { .. }));
        assert!(matches!(ops[3], DiffOp::Inserted { .. }));
    }

    #[test]
    fn inserted_style_comes_from_revised() {
        let a = vec![ParagraphText::new("body", "Normal")];
        let b = vec![
            ParagraphText::new("Title", "Heading 1"),
            ParagraphText::new("body", "Normal"),
        ];
        let ops = diff(&a, &b, Granularity::Paragraph);
        assert_eq!(
            ops[0],
            DiffOp::Inserted {
                text: "Title".into(),
                style: "Heading 1".into(),
            }
        );
    }

    #[test]
    fn empty_against_empty_is_empty() {
        assert!(diff(&[], &[], Granularity::Word).is_empty());
    }

    #[test]
    fn empty_original_inserts_everything() {
        let b = paras(&["a", "b"]);
        let ops = diff(&[], &b, Granularity::Paragraph);
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| matches!(op, DiffOp::Inserted { .. })));
    }

    #[test]
    fn compare_words_joins_ranges_with_spaces() {
        let ops = compare_words("alpha beta gamma delta", "alpha gamma delta epsilon");
        assert_eq!(
            ops,
            vec![
                WordOp::Equal {
                    text: "alpha".into()
                },
                WordOp::Deleted {
                    text: "beta".into()
                },
                WordOp::Equal {
                    text: "gamma delta".into()
                },
                WordOp::Inserted {
                    text: "epsilon".into()
                },
            ]
        );
    }
}
