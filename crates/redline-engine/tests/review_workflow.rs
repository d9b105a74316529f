//! End-to-end workflows: compare, redline, resolve, comment, merge.

use chrono::Utc;
use pretty_assertions::assert_eq;
use redline_engine::doc::{Block, Inline, Marker, Run, TrackedRuns};
use redline_engine::{
    Action, CommentSelector, Document, Granularity, Paragraph, TextView, build_redline,
    collect_changes, diff_documents, load_document, merge_documents, resolve, save_document,
};

fn doc(texts: &[&str]) -> Document {
    Document::from_paragraphs(
        texts
            .iter()
            .map(|t| Paragraph::with_text("Normal", *t))
            .collect(),
    )
}

/// Paragraph texts with runs of whitespace collapsed and empty paragraphs
/// dropped. Resolving a fully inserted or fully deleted paragraph leaves an
/// empty paragraph behind, and word runs carry separator spaces.
fn readable(doc: &Document, view: TextView) -> Vec<String> {
    doc.paragraph_texts(view)
        .iter()
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .collect()
}

fn redline(a: &[&str], b: &[&str], granularity: Granularity) -> Document {
    let original = doc(a);
    let revised = doc(b);
    let ops = diff_documents(&original, &revised, granularity);
    build_redline(&original, &ops, "Reviewer", Utc::now()).unwrap()
}

const ORIGINAL: [&str; 4] = [
    "The cat sat on the mat.",
    "Unchanged paragraph.",
    "Doomed paragraph.",
    "Closing.",
];
const REVISED: [&str; 4] = [
    "The dog sat on the mat.",
    "Unchanged paragraph.",
    "Closing.",
    "Appendix.",
];

#[test]
fn accepting_a_redline_yields_the_revised_text() {
    let mut marked = redline(&ORIGINAL, &REVISED, Granularity::Word);

    resolve(&mut marked, Action::Accept, None);

    marked.validate().unwrap();
    let expected: Vec<String> = REVISED.iter().map(|t| t.to_string()).collect();
    assert_eq!(readable(&marked, TextView::Current), expected);
    assert!(collect_changes(&marked).is_empty());
}

#[test]
fn rejecting_a_redline_yields_the_original_text() {
    let mut marked = redline(&ORIGINAL, &REVISED, Granularity::Word);

    resolve(&mut marked, Action::Reject, None);

    marked.validate().unwrap();
    let expected: Vec<String> = ORIGINAL.iter().map(|t| t.to_string()).collect();
    assert_eq!(readable(&marked, TextView::Current), expected);
    assert!(collect_changes(&marked).is_empty());
}

#[test]
fn paragraph_granularity_redline_resolves_both_ways() {
    let a = ["alpha", "beta"];
    let b = ["alpha", "gamma"];

    let mut accepted = redline(&a, &b, Granularity::Paragraph);
    resolve(&mut accepted, Action::Accept, None);
    assert_eq!(
        readable(&accepted, TextView::Current),
        vec!["alpha".to_string(), "gamma".to_string()]
    );

    let mut rejected = redline(&a, &b, Granularity::Paragraph);
    resolve(&mut rejected, Action::Reject, None);
    assert_eq!(
        readable(&rejected, TextView::Current),
        vec!["alpha".to_string(), "beta".to_string()]
    );
}

#[test]
fn resolving_twice_changes_nothing_more() {
    let mut marked = redline(&["one two three"], &["one 2 three"], Granularity::Word);

    let first = resolve(&mut marked, Action::Accept, None);
    assert!(first > 0);
    let snapshot = marked.clone();

    let second = resolve(&mut marked, Action::Accept, None);
    assert_eq!(second, 0);
    assert_eq!(marked, snapshot);
}

#[test]
fn author_filter_leaves_other_authors_untouched() {
    let base = doc(&["start"]);
    let ops = diff_documents(&base, &doc(&["start", "alice addition"]), Granularity::Paragraph);
    let mut marked = build_redline(&base, &ops, "Alice", Utc::now()).unwrap();

    // Bob appends his own pending insertion on top of Alice's.
    let mut bob_para = Paragraph::new("Normal");
    bob_para.children.push(Inline::Tracked(TrackedRuns::insertion(
        Marker::new(marked.allocate_revision_id(), "Bob", Utc::now()),
        vec![Run::text("bob addition")],
    )));
    marked.push_block(Block::Paragraph(bob_para));
    marked.validate().unwrap();

    resolve(&mut marked, Action::Reject, Some("Alice"));

    let remaining = collect_changes(&marked);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].author, "Bob");
    assert_eq!(
        readable(&marked, TextView::Current),
        vec!["start".to_string(), "bob addition".to_string()]
    );
}

#[test]
fn comment_lifecycle_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");

    let mut original = doc(&["The quick brown fox", "jumps over the lazy dog"]);
    let id = original
        .add_comment("lazy dog", "is it though", "Jane Doe", Utc::now())
        .unwrap();
    save_document(&original, &path).unwrap();

    let mut loaded = load_document(&path).unwrap();
    let exports = loaded.export_comments();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].text, "is it though");
    assert_eq!(exports[0].initials, "JD");

    // A comment added after reload must not reuse the first ID.
    let second = loaded
        .add_comment("quick", "fast", "Joe Bloggs", Utc::now())
        .unwrap();
    assert!(second > id);

    loaded.remove_comments(CommentSelector::All).unwrap();
    assert!(loaded.comments().is_empty());
    loaded.validate().unwrap();
}

#[test]
fn merging_redlines_keeps_every_change_under_unique_ids() {
    let first = redline(&["a"], &["b"], Granularity::Paragraph);
    let second = redline(&["x"], &["y"], Granularity::Paragraph);
    let first_count = collect_changes(&first).len();
    let second_count = collect_changes(&second).len();

    let merged = merge_documents(&[first, second], true).unwrap();

    merged.validate().unwrap();
    assert_eq!(collect_changes(&merged).len(), first_count + second_count);
}

#[test]
fn resolving_a_loaded_redline_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redline.json");

    let marked = redline(
        &["Payment is due in 30 days."],
        &["Payment is due in 45 days."],
        Granularity::Word,
    );
    save_document(&marked, &path).unwrap();

    let mut loaded = load_document(&path).unwrap();
    resolve(&mut loaded, Action::Accept, None);
    save_document(&loaded, &path).unwrap();

    let settled = load_document(&path).unwrap();
    assert_eq!(
        readable(&settled, TextView::Current),
        vec!["Payment is due in 45 days.".to_string()]
    );
    assert!(collect_changes(&settled).is_empty());
}
