//! Property tests for the flat-index buffer invariants.

use parchment::document::{Attribute, MarginSide, Style};
use parchment::editor::TextBuffer;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert { text: String, at: usize },
    Delete { a: usize, b: usize },
    Toggle { a: usize, b: usize, attribute: Attribute },
    Margin { side: MarginSide, value: f64 },
}

fn attribute() -> impl Strategy<Value = Attribute> {
    prop_oneof![
        Just(Attribute::Bold),
        Just(Attribute::Italic),
        Just(Attribute::Subscript),
        Just(Attribute::Superscript),
        Just(Attribute::Style(Style::Title)),
        Just(Attribute::Style(Style::Heading)),
    ]
}

fn side() -> impl Strategy<Value = MarginSide> {
    prop_oneof![
        Just(MarginSide::Left),
        Just(MarginSide::Right),
        Just(MarginSide::Top),
        Just(MarginSide::Bottom),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[a-cé\n]{0,6}", 0..40usize).prop_map(|(text, at)| Op::Insert { text, at }),
        (0..40usize, 0..40usize).prop_map(|(a, b)| Op::Delete { a, b }),
        (0..40usize, 0..40usize, attribute())
            .prop_map(|(a, b, attribute)| Op::Toggle { a, b, attribute }),
        (side(), -5.0..50.0f64).prop_map(|(side, value)| Op::Margin { side, value }),
    ]
}

fn apply(buf: &mut TextBuffer, op: &Op) -> bool {
    match op {
        Op::Insert { text, at } => buf.insert(text, *at).is_ok(),
        Op::Delete { a, b } => buf.delete(*a, *b).is_ok(),
        Op::Toggle { a, b, attribute } => buf.toggle_format(*a, *b, *attribute).is_ok(),
        Op::Margin { side, value } => buf.set_margin(*side, *value).is_ok(),
    }
}

proptest! {
    #[test]
    fn offsets_stay_contiguous(ops in prop::collection::vec(op(), 0..40)) {
        let mut buf = TextBuffer::new();
        for op in &ops {
            apply(&mut buf, op);
            prop_assert!(buf.is_consistent());
            let paras = buf.paragraphs();
            prop_assert_eq!(paras[0].start(), 0);
            for pair in paras.windows(2) {
                prop_assert_eq!(pair[0].end(), pair[1].start());
            }
        }
    }

    #[test]
    fn plain_text_matches_length_and_resolve_is_total(
        ops in prop::collection::vec(op(), 0..30),
    ) {
        let mut buf = TextBuffer::new();
        for op in &ops {
            apply(&mut buf, op);
        }
        prop_assert_eq!(buf.plain_text().chars().count(), buf.len());
        for i in 0..=buf.len() {
            prop_assert!(buf.resolve(i).is_ok());
        }
        prop_assert!(buf.resolve(buf.len() + 1).is_err());
    }

    #[test]
    fn version_counts_successful_mutations(ops in prop::collection::vec(op(), 0..40)) {
        let mut buf = TextBuffer::new();
        for op in &ops {
            let before_version = buf.version();
            let before_text = buf.plain_text();
            let before_html = buf.markup();
            if apply(&mut buf, op) {
                prop_assert_eq!(buf.version(), before_version + 1);
            } else {
                prop_assert_eq!(buf.version(), before_version);
                prop_assert_eq!(buf.plain_text(), before_text);
                prop_assert_eq!(buf.markup(), before_html);
            }
            let after = buf.version();
            let _ = buf.find("a");
            let _ = buf.resolve(0);
            let _ = buf.serialize();
            prop_assert_eq!(buf.version(), after);
        }
    }

    #[test]
    fn insert_then_delete_restores_text(
        ops in prop::collection::vec(op(), 0..20),
        text in "[a-z \n]{1,8}",
        at in 0..60usize,
    ) {
        let mut buf = TextBuffer::new();
        for op in &ops {
            apply(&mut buf, op);
        }
        let at = at.min(buf.len());
        let before = buf.plain_text();
        buf.insert(&text, at).unwrap();

        // Breaks split paragraphs but occupy no index positions.
        let width = text.chars().filter(|&c| c != '\n').count();
        prop_assert_eq!(buf.len(), before.chars().count() + width);
        if width > 0 {
            buf.delete(at, at + width).unwrap();
        }
        prop_assert_eq!(buf.plain_text(), before);
    }

    #[test]
    fn double_toggle_restores_formatting(
        ops in prop::collection::vec(op(), 1..20),
        a in 0..40usize,
        b in 0..40usize,
        attribute in prop_oneof![Just(Attribute::Bold), Just(Attribute::Italic)],
    ) {
        let mut buf = TextBuffer::from_text("seed text for toggling");
        for op in &ops {
            apply(&mut buf, op);
        }
        let (start, end) = (a.min(b), a.max(b).min(buf.len()));
        prop_assume!(start < end);

        let formats_at = |buf: &TextBuffer| -> Vec<_> {
            (0..buf.len()).map(|i| buf.resolve(i).unwrap().0.format()).collect()
        };
        let before = formats_at(&buf);
        buf.toggle_format(start, end, attribute).unwrap();
        buf.toggle_format(start, end, attribute).unwrap();
        prop_assert_eq!(formats_at(&buf), before);
    }

    #[test]
    fn find_results_are_ordered_and_disjoint(
        ops in prop::collection::vec(op(), 0..30),
        term in "[a-c]{1,2}",
    ) {
        let mut buf = TextBuffer::new();
        for op in &ops {
            apply(&mut buf, op);
        }
        let text: Vec<char> = buf.plain_text().chars().collect();
        let term_chars: Vec<char> = term.chars().collect();
        let mut last_end = 0;
        for (start, end) in buf.find(&term) {
            prop_assert!(start >= last_end);
            prop_assert_eq!(&text[start..end], term_chars.as_slice());
            last_end = end;
        }
    }

    #[test]
    fn save_format_round_trips(ops in prop::collection::vec(op(), 0..30)) {
        let mut buf = TextBuffer::new();
        for op in &ops {
            apply(&mut buf, op);
        }
        let restored = TextBuffer::deserialize(&buf.serialize().unwrap()).unwrap();
        prop_assert!(restored.is_consistent());
        prop_assert_eq!(restored.plain_text(), buf.plain_text());
        prop_assert_eq!(restored.markup(), buf.markup());
        prop_assert_eq!(restored.margins(), buf.margins());
    }
}

#[test]
fn test_superscript_after_subscript_clears_it() {
    let mut buf = TextBuffer::from_text("x2");
    buf.toggle_format(1, 2, Attribute::Subscript).unwrap();
    buf.toggle_format(1, 2, Attribute::Superscript).unwrap();
    let (para, _) = buf.resolve(1).unwrap();
    assert!(para.is_superscript());
    assert!(!para.is_subscript());
}
