use std::collections::HashMap;

use crate::normalize::normalize_whitespace;

/// Longest key kept for a snippet, in chars.
pub const SEGMENT_KEY_LIMIT: usize = 400;

/// Normalized, truncated snippet text. Two long snippets that share their
/// first 400 normalized chars map to the same key.
pub fn segment_key(snippet: &str) -> String {
    normalize_whitespace(snippet)
        .chars()
        .take(SEGMENT_KEY_LIMIT)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentEntry {
    pub paragraph: usize,
    /// Text inserted by the last replacement; empty when that replacement
    /// spanned several paragraphs.
    pub last_text: String,
}

/// Where earlier replacements landed, keyed by the selection they replaced.
#[derive(Clone, Debug, Default)]
pub struct SegmentMemory {
    entries: HashMap<String, SegmentEntry>,
}

impl SegmentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, key: String, paragraph: usize, last_text: String) {
        self.entries.insert(
            key,
            SegmentEntry {
                paragraph,
                last_text,
            },
        );
    }

    pub fn recall(&self, key: &str) -> Option<&SegmentEntry> {
        self.entries.get(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
