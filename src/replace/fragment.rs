use crate::document::{Document, char_slice};
use crate::normalize::NormalizedText;

use super::resolve::SpanResolution;

/// One paragraph's share of a selection, in raw chars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub paragraph: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Fragment {
    fn new(paragraph: usize, raw: &str, start: usize, end: usize) -> Self {
        let end = end.max(start);
        Self {
            paragraph,
            start,
            end,
            text: char_slice(raw, start, end).to_string(),
        }
    }
}

/// Splits a resolved span into per-paragraph raw ranges. Empty paragraphs
/// strictly between the first and last one are skipped.
pub fn fragment_span(document: &Document, span: &SpanResolution) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    let Some(first_raw) = document.paragraph_text(span.first_paragraph) else {
        return fragments;
    };
    let first_map = NormalizedText::new(&first_raw);

    if span.is_single_paragraph() {
        fragments.push(Fragment::new(
            span.first_paragraph,
            &first_raw,
            first_map.raw_start(span.start_offset),
            first_map.raw_end(span.end_offset),
        ));
        return fragments;
    }

    fragments.push(Fragment::new(
        span.first_paragraph,
        &first_raw,
        first_map.raw_start(span.start_offset),
        first_raw.chars().count(),
    ));

    for paragraph in span.first_paragraph + 1..span.last_paragraph {
        let Some(raw) = document.paragraph_text(paragraph) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        fragments.push(Fragment::new(paragraph, &raw, 0, raw.chars().count()));
    }

    if let Some(last_raw) = document.paragraph_text(span.last_paragraph) {
        let last_map = NormalizedText::new(&last_raw);
        fragments.push(Fragment::new(
            span.last_paragraph,
            &last_raw,
            0,
            last_map.raw_end(span.end_offset),
        ));
    }

    fragments
}
