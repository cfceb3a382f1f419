use crate::document::Document;
use crate::normalize::{FlatText, normalize_whitespace};

/// Where a selection sits in the document, in normalized per-paragraph
/// offsets. `end_offset` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanResolution {
    pub first_paragraph: usize,
    pub start_offset: usize,
    pub last_paragraph: usize,
    pub end_offset: usize,
}

impl SpanResolution {
    pub fn is_single_paragraph(&self) -> bool {
        self.first_paragraph == self.last_paragraph
    }
}

/// Finds the first exact occurrence of the normalized selection in the
/// normalized document text.
pub fn resolve_span(document: &Document, selected: &str) -> Option<SpanResolution> {
    let flat = FlatText::new(document.paragraph_texts());
    resolve_in_flat(&flat, selected)
}

pub(crate) fn resolve_in_flat(flat: &FlatText, selected: &str) -> Option<SpanResolution> {
    let needle = normalize_whitespace(selected);
    if needle.is_empty() {
        return None;
    }
    let (start, end) = flat.find(&needle)?;
    let (first_paragraph, start_offset) = flat.locate(start)?;
    let (last_paragraph, end_offset) = flat.locate(end)?;
    Some(SpanResolution {
        first_paragraph,
        start_offset,
        last_paragraph,
        end_offset,
    })
}
