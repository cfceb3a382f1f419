use std::ops::Range;

use crate::normalize::FlatText;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    ParagraphUp,
    ParagraphDown,
    ParagraphStart,
    ParagraphEnd,
}

/// Cursor and optional anchor in the flat text of the original document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    cursor: usize,
    anchor: Option<usize>,
}

impl Selection {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The selected chars, if anchor and cursor differ.
    pub fn range(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some(anchor.min(self.cursor)..anchor.max(self.cursor))
    }

    pub fn clear(&mut self) {
        self.anchor = None;
    }

    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len);
        self.anchor = self.anchor.map(|anchor| anchor.min(len));
    }

    pub fn apply(&mut self, motion: Motion, flat: &FlatText, extend: bool) {
        let target = match motion {
            Motion::Left => self.cursor.saturating_sub(1),
            Motion::Right => (self.cursor + 1).min(flat.len()),
            Motion::WordLeft => previous_word_boundary(&chars(flat), self.cursor),
            Motion::WordRight => next_word_boundary(&chars(flat), self.cursor),
            Motion::ParagraphUp => vertical_target(flat, self.cursor, -1),
            Motion::ParagraphDown => vertical_target(flat, self.cursor, 1),
            Motion::ParagraphStart => current_range(flat, self.cursor).map_or(0, |(start, _)| start),
            Motion::ParagraphEnd => current_range(flat, self.cursor).map_or(0, |(_, end)| end),
        };
        self.move_to(target, extend);
    }

    fn move_to(&mut self, target: usize, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = target;
    }
}

fn chars(flat: &FlatText) -> Vec<char> {
    flat.as_str().chars().collect()
}

fn current_range(flat: &FlatText, offset: usize) -> Option<(usize, usize)> {
    let (paragraph, _) = flat.locate(offset)?;
    flat.paragraph_range(paragraph)
}

fn vertical_target(flat: &FlatText, offset: usize, delta: i32) -> usize {
    let Some((paragraph, column)) = flat.locate(offset) else {
        return 0;
    };
    let mut candidates = (0..flat.paragraph_count())
        .filter_map(|idx| flat.paragraph_range(idx).map(|range| (idx, range)))
        .filter(|(_, (start, end))| start < end);
    let next = if delta < 0 {
        candidates.filter(|(idx, _)| *idx < paragraph).last()
    } else {
        candidates.find(|(idx, _)| *idx > paragraph)
    };
    match next {
        Some((_, (start, end))) => (start + column).min(end),
        None if delta < 0 => 0,
        None => flat.len(),
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn previous_word_boundary(chars: &[char], offset: usize) -> usize {
    let mut idx = offset.min(chars.len());
    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    if idx == 0 {
        return 0;
    }

    if is_word_char(chars[idx - 1]) {
        while idx > 0 && is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
    } else {
        while idx > 0 && !is_word_char(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
    }
    idx
}

pub fn next_word_boundary(chars: &[char], offset: usize) -> usize {
    let len = chars.len();
    let mut idx = offset.min(len);
    if idx >= len {
        return len;
    }

    if is_word_char(chars[idx]) {
        while idx < len && is_word_char(chars[idx]) {
            idx += 1;
        }
    }
    while idx < len && !chars[idx].is_whitespace() && !is_word_char(chars[idx]) {
        idx += 1;
    }
    while idx < len && chars[idx].is_whitespace() {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> FlatText {
        FlatText::new(["The quick brown fox", "", "jumps over the lazy dog"])
    }

    fn at(cursor: usize) -> Selection {
        Selection {
            cursor,
            anchor: None,
        }
    }

    #[test]
    fn word_motions_skip_whitespace_and_punctuation() {
        let chars: Vec<char> = "Hello, world!  Again".chars().collect();
        assert_eq!(next_word_boundary(&chars, 0), 7);
        assert_eq!(next_word_boundary(&chars, 7), 15);
        assert_eq!(next_word_boundary(&chars, 15), 20);
        assert_eq!(previous_word_boundary(&chars, 20), 15);
        assert_eq!(previous_word_boundary(&chars, 15), 12);
        assert_eq!(previous_word_boundary(&chars, 12), 7);
        assert_eq!(previous_word_boundary(&chars, 7), 5);
        assert_eq!(previous_word_boundary(&chars, 5), 0);
    }

    #[test]
    fn shift_motions_extend_the_selection() {
        let flat = flat();
        let mut selection = at(16);

        selection.apply(Motion::WordRight, &flat, true);
        selection.apply(Motion::WordRight, &flat, true);

        assert_eq!(selection.range(), Some(16..26));
        assert_eq!(flat.slice(16, 26), "fox jumps ");

        selection.apply(Motion::Left, &flat, false);
        assert_eq!(selection.range(), None);
        assert_eq!(selection.cursor(), 25);
    }

    #[test]
    fn selection_can_extend_backwards() {
        let flat = flat();
        let mut selection = at(10);
        selection.apply(Motion::WordLeft, &flat, true);
        assert_eq!(selection.range(), Some(4..10));
    }

    #[test]
    fn paragraph_moves_keep_the_column_and_skip_empty_paragraphs() {
        let flat = flat();
        let mut selection = at(4);

        selection.apply(Motion::ParagraphDown, &flat, false);
        assert_eq!(selection.cursor(), 24);

        selection.apply(Motion::ParagraphDown, &flat, false);
        assert_eq!(selection.cursor(), flat.len());

        selection.apply(Motion::ParagraphUp, &flat, false);
        assert_eq!(selection.cursor(), 19);

        selection.apply(Motion::ParagraphUp, &flat, false);
        assert_eq!(selection.cursor(), 0);
    }

    #[test]
    fn paragraph_start_and_end() {
        let flat = flat();
        let mut selection = at(30);

        selection.apply(Motion::ParagraphEnd, &flat, true);
        assert_eq!(selection.cursor(), 43);
        selection.apply(Motion::ParagraphStart, &flat, true);
        assert_eq!(selection.cursor(), 20);
        assert_eq!(selection.range(), Some(20..30));
    }

    #[test]
    fn horizontal_moves_stop_at_the_ends() {
        let flat = flat();
        let mut selection = at(0);
        selection.apply(Motion::Left, &flat, false);
        assert_eq!(selection.cursor(), 0);

        let mut selection = at(flat.len());
        selection.apply(Motion::Right, &flat, false);
        assert_eq!(selection.cursor(), flat.len());
    }

    #[test]
    fn clamp_pulls_cursor_and_anchor_inside() {
        let mut selection = Selection {
            cursor: 50,
            anchor: Some(40),
        };
        selection.clamp(45);
        assert_eq!(selection.range(), Some(40..45));
        assert_eq!(selection.cursor(), 45);
    }
}
