use crate::document::{char_slice, char_to_byte_idx};

/// Collapses whitespace runs (newlines and tabs included) to one space and
/// trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    raw_offsets: Vec<usize>,
    content_end: usize,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let mut text = String::new();
        let mut raw_offsets = Vec::new();
        let mut pending_space = None;
        let mut content_end = 0;

        for (idx, ch) in raw.chars().enumerate() {
            if ch.is_whitespace() {
                if !raw_offsets.is_empty() && pending_space.is_none() {
                    pending_space = Some(idx);
                }
                continue;
            }
            if let Some(space_at) = pending_space.take() {
                text.push(' ');
                raw_offsets.push(space_at);
            }
            text.push(ch);
            raw_offsets.push(idx);
            content_end = idx + 1;
        }

        Self {
            text,
            raw_offsets,
            content_end,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.raw_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_offsets.is_empty()
    }

    /// Raw offset of the normalized char at `offset`.
    pub fn raw_offset(&self, offset: usize) -> Option<usize> {
        self.raw_offsets.get(offset).copied()
    }

    /// Raw position of a range start given in normalized chars.
    pub fn raw_start(&self, offset: usize) -> usize {
        self.raw_offsets
            .get(offset)
            .copied()
            .unwrap_or(self.content_end)
    }

    /// Raw position of an exclusive range end given in normalized chars.
    pub fn raw_end(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        match self.raw_offsets.get(offset - 1) {
            Some(raw) => raw + 1,
            None => self.content_end,
        }
    }
}

/// The normalized text of a whole document: paragraphs joined by one space.
/// Empty paragraphs add no separator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatText {
    text: String,
    starts: Vec<usize>,
    lens: Vec<usize>,
}

impl FlatText {
    pub fn new<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flat = FlatText::default();
        let mut char_len = 0;
        for paragraph in paragraphs {
            let normalized = normalize_whitespace(paragraph.as_ref());
            let len = normalized.chars().count();
            if len > 0 && char_len > 0 {
                flat.text.push(' ');
                char_len += 1;
            }
            flat.starts.push(char_len);
            flat.lens.push(len);
            flat.text.push_str(&normalized);
            char_len += len;
        }
        flat
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        match (self.starts.last(), self.lens.last()) {
            (Some(start), Some(len)) => start + len,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paragraph_count(&self) -> usize {
        self.starts.len()
    }

    /// Flat range `[start, end)` occupied by a paragraph.
    pub fn paragraph_range(&self, paragraph: usize) -> Option<(usize, usize)> {
        let start = *self.starts.get(paragraph)?;
        let len = *self.lens.get(paragraph)?;
        Some((start, start + len))
    }

    /// Char offset range of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> Option<(usize, usize)> {
        if needle.is_empty() {
            return None;
        }
        let byte_idx = self.text.find(needle)?;
        let start = self.text[..byte_idx].chars().count();
        Some((start, start + needle.chars().count()))
    }

    /// Maps a flat offset to `(paragraph, offset)`, picking the first
    /// non-empty paragraph whose end is at or after `flat_offset`.
    pub fn locate(&self, flat_offset: usize) -> Option<(usize, usize)> {
        self.starts
            .iter()
            .zip(&self.lens)
            .enumerate()
            .filter(|(_, (_, len))| **len > 0)
            .find(|(_, (start, len))| flat_offset <= **start + **len)
            .map(|(idx, (start, _))| (idx, flat_offset.saturating_sub(*start)))
    }

    pub fn slice(&self, start: usize, end: usize) -> &str {
        char_slice(&self.text, start, end)
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        let byte_idx = char_to_byte_idx(&self.text, offset);
        self.text[byte_idx..].chars().next()
    }
}
