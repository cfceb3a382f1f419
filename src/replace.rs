use thiserror::Error;

use crate::document::{Document, char_find};
use crate::translate::TranslateError;

mod fragment;
mod memory;
mod resolve;
mod splice;

pub use fragment::{Fragment, fragment_span};
pub use memory::{SEGMENT_KEY_LIMIT, SegmentEntry, SegmentMemory, segment_key};
pub use resolve::{SpanResolution, resolve_span};
pub use splice::{SpliceOutcome, splice_runs};

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("nothing is selected")]
    EmptySelection,
    #[error("could not locate the segment to replace in the translated document")]
    SegmentNotFound,
    #[error("translation failed after {applied_fragments} fragment(s) were replaced")]
    Transform {
        #[source]
        source: TranslateError,
        applied_fragments: usize,
    },
}

impl ReplaceError {
    /// Errors that callers should swallow silently.
    pub fn is_noop(&self) -> bool {
        matches!(self, ReplaceError::EmptySelection)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    SegmentMemory,
    CrossParagraph,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Direct => "direct match",
            Strategy::SegmentMemory => "remembered segment",
            Strategy::CrossParagraph => "cross-paragraph match",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub strategy: Strategy,
    /// Paragraphs that were spliced, in order.
    pub paragraphs: Vec<usize>,
    /// How each of those paragraphs was spliced.
    pub splices: Vec<SpliceOutcome>,
}

#[derive(Debug, Default)]
pub struct Replacer {
    memory: SegmentMemory,
}

impl Replacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &SegmentMemory {
        &self.memory
    }

    /// Forgets every remembered segment. Call when a new document is loaded.
    pub fn reset(&mut self) {
        self.memory.clear();
    }

    /// Replaces `selected` in `document` with what `transform` makes of it.
    ///
    /// On `SegmentNotFound` the document is untouched. A transform failure in
    /// the cross-paragraph strategy leaves the fragments replaced before it.
    pub fn replace<F>(
        &mut self,
        document: &mut Document,
        selected: &str,
        mut transform: F,
    ) -> Result<Replacement, ReplaceError>
    where
        F: FnMut(&str) -> Result<String, TranslateError>,
    {
        let needle = selected.trim();
        if needle.is_empty() {
            return Err(ReplaceError::EmptySelection);
        }
        let key = segment_key(selected);

        if let Some(replacement) = self.replace_direct(document, needle, &key, &mut transform)? {
            return Ok(replacement);
        }
        if let Some(replacement) = self.replace_remembered(document, needle, &key, &mut transform)? {
            return Ok(replacement);
        }
        self.replace_across_paragraphs(document, selected, key, &mut transform)
    }

    fn replace_direct<F>(
        &mut self,
        document: &mut Document,
        needle: &str,
        key: &str,
        transform: &mut F,
    ) -> Result<Option<Replacement>, ReplaceError>
    where
        F: FnMut(&str) -> Result<String, TranslateError>,
    {
        let found = (0..document.len()).find_map(|idx| {
            let text = document.paragraph_text(idx)?;
            char_find(&text, needle).map(|start| (idx, start))
        });
        let Some((paragraph, start)) = found else {
            return Ok(None);
        };

        let new_text = transform(needle).map_err(|source| ReplaceError::Transform {
            source,
            applied_fragments: 0,
        })?;
        let end = start + needle.chars().count();
        let splices = splice_paragraph(document, paragraph, start, end, &new_text)
            .into_iter()
            .collect();
        self.memory.remember(key.to_string(), paragraph, new_text);

        Ok(Some(Replacement {
            strategy: Strategy::Direct,
            paragraphs: vec![paragraph],
            splices,
        }))
    }

    fn replace_remembered<F>(
        &mut self,
        document: &mut Document,
        needle: &str,
        key: &str,
        transform: &mut F,
    ) -> Result<Option<Replacement>, ReplaceError>
    where
        F: FnMut(&str) -> Result<String, TranslateError>,
    {
        let Some(entry) = self.memory.recall(key).cloned() else {
            return Ok(None);
        };
        if entry.last_text.is_empty() {
            return Ok(None);
        }
        let Some(start) = document
            .paragraph_text(entry.paragraph)
            .and_then(|text| char_find(&text, &entry.last_text))
        else {
            return Ok(None);
        };

        let new_text = transform(needle).map_err(|source| ReplaceError::Transform {
            source,
            applied_fragments: 0,
        })?;
        let end = start + entry.last_text.chars().count();
        let splices = splice_paragraph(document, entry.paragraph, start, end, &new_text)
            .into_iter()
            .collect();
        self.memory.remember(key.to_string(), entry.paragraph, new_text);

        Ok(Some(Replacement {
            strategy: Strategy::SegmentMemory,
            paragraphs: vec![entry.paragraph],
            splices,
        }))
    }

    fn replace_across_paragraphs<F>(
        &mut self,
        document: &mut Document,
        selected: &str,
        key: String,
        transform: &mut F,
    ) -> Result<Replacement, ReplaceError>
    where
        F: FnMut(&str) -> Result<String, TranslateError>,
    {
        let span = resolve_span(document, selected).ok_or(ReplaceError::SegmentNotFound)?;
        let fragments = fragment_span(document, &span);
        let Some(first) = fragments.first().map(|fragment| fragment.paragraph) else {
            return Err(ReplaceError::SegmentNotFound);
        };

        let mut paragraphs = Vec::with_capacity(fragments.len());
        let mut splices = Vec::with_capacity(fragments.len());
        for (applied, fragment) in fragments.iter().enumerate() {
            let new_text = if fragment.text.trim().is_empty() {
                fragment.text.clone()
            } else {
                transform(&fragment.text).map_err(|source| ReplaceError::Transform {
                    source,
                    applied_fragments: applied,
                })?
            };
            let outcome = splice_paragraph(
                document,
                fragment.paragraph,
                fragment.start,
                fragment.end,
                &new_text,
            );
            paragraphs.push(fragment.paragraph);
            splices.extend(outcome);
        }
        self.memory.remember(key, first, String::new());

        Ok(Replacement {
            strategy: Strategy::CrossParagraph,
            paragraphs,
            splices,
        })
    }
}

fn splice_paragraph(
    document: &mut Document,
    paragraph: usize,
    start: usize,
    end: usize,
    replacement: &str,
) -> Option<SpliceOutcome> {
    let runs = document.runs_mut(paragraph)?;
    Some(splice_runs(runs, start, end, replacement))
}

#[cfg(test)]
#[path = "replace_tests.rs"]
mod replace_tests;


#[cfg(test)]
#[path = "replace/resolve_tests.rs"]
mod resolve_tests;
