use super::*;
use crate::document::Document;
use tdoc::Span;

fn plain(paragraphs: &[&str]) -> Document {
    Document::from_paragraphs(
        paragraphs
            .iter()
            .map(|text| vec![Span::new_text(*text)])
            .collect(),
    )
}

fn fragment(paragraph: usize, start: usize, end: usize, text: &str) -> Fragment {
    Fragment {
        paragraph,
        start,
        end,
        text: text.to_string(),
    }
}

#[test]
fn selection_across_two_paragraphs() {
    let document = plain(&["The quick brown fox", "jumps over the lazy dog"]);

    let span = resolve_span(&document, "fox jumps").unwrap();
    assert_eq!(
        span,
        SpanResolution {
            first_paragraph: 0,
            start_offset: 16,
            last_paragraph: 1,
            end_offset: 5,
        }
    );
    assert!(!span.is_single_paragraph());

    assert_eq!(
        fragment_span(&document, &span),
        vec![fragment(0, 16, 19, "fox"), fragment(1, 0, 5, "jumps")]
    );
}

#[test]
fn selection_whitespace_is_normalized() {
    let document = plain(&["The quick brown fox", "jumps over the lazy dog"]);
    let span = resolve_span(&document, " fox\n\n  jumps ").unwrap();
    assert_eq!((span.first_paragraph, span.start_offset), (0, 16));
    assert_eq!((span.last_paragraph, span.end_offset), (1, 5));
}

#[test]
fn blank_or_absent_selection_resolves_to_nothing() {
    let document = plain(&["The quick brown fox"]);
    assert_eq!(resolve_span(&document, " \n\t "), None);
    assert_eq!(resolve_span(&document, "lazy cat"), None);
    assert_eq!(resolve_span(&plain(&[]), "anything"), None);
}

#[test]
fn intervening_paragraphs_are_taken_whole() {
    let document = plain(&["end of one", "middle", "start of three"]);
    let span = resolve_span(&document, "one middle start").unwrap();

    assert_eq!(
        fragment_span(&document, &span),
        vec![
            fragment(0, 7, 10, "one"),
            fragment(1, 0, 6, "middle"),
            fragment(2, 0, 5, "start"),
        ]
    );
}

#[test]
fn empty_paragraphs_add_no_separator() {
    let document = plain(&["alpha", "", "beta"]);
    let span = resolve_span(&document, "alpha beta").unwrap();

    assert_eq!((span.first_paragraph, span.last_paragraph), (0, 2));
    assert_eq!(
        fragment_span(&document, &span),
        vec![fragment(0, 0, 5, "alpha"), fragment(2, 0, 4, "beta")]
    );
}

#[test]
fn collapsed_whitespace_maps_back_to_raw_ranges() {
    let document = plain(&["one  two   three"]);
    let span = resolve_span(&document, "two three").unwrap();

    assert!(span.is_single_paragraph());
    assert_eq!((span.start_offset, span.end_offset), (4, 13));
    assert_eq!(
        fragment_span(&document, &span),
        vec![fragment(0, 5, 16, "two   three")]
    );
}

#[test]
fn leading_whitespace_shifts_raw_offsets() {
    let document = plain(&["  alpha   beta\tgamma", "delta"]);
    let span = resolve_span(&document, "gamma delta").unwrap();

    assert_eq!(
        fragment_span(&document, &span),
        vec![fragment(0, 15, 20, "gamma"), fragment(1, 0, 5, "delta")]
    );
}
