use tdoc::Span;

/// Text slots of a span sequence in reading order.
///
/// A span contributes a slot when it carries text or has no children; pure
/// container spans (styled wrappers around children) are skipped.
pub fn run_texts(spans: &[Span]) -> Vec<&str> {
    let mut slots = Vec::new();
    collect_run_texts(spans, &mut slots);
    slots
}

pub fn run_texts_mut(spans: &mut [Span]) -> Vec<&mut String> {
    let mut slots = Vec::new();
    collect_run_texts_mut(spans, &mut slots);
    slots
}

pub fn runs_text(spans: &[Span]) -> String {
    run_texts(spans).concat()
}

fn carries_text(span: &Span) -> bool {
    span.children.is_empty() || !span.text.is_empty()
}

fn collect_run_texts<'a>(spans: &'a [Span], slots: &mut Vec<&'a str>) {
    for span in spans {
        if carries_text(span) {
            slots.push(span.text.as_str());
        }
        collect_run_texts(&span.children, slots);
    }
}

fn collect_run_texts_mut<'a>(spans: &'a mut [Span], slots: &mut Vec<&'a mut String>) {
    for span in spans.iter_mut() {
        let keep = carries_text(span);
        let Span { text, children, .. } = span;
        if keep {
            slots.push(text);
        }
        collect_run_texts_mut(children, slots);
    }
}

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

/// Char offset of the first occurrence of `needle` in `haystack`.
pub fn char_find(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| haystack[..byte_idx].chars().count())
}

/// The chars in `[start, end)`, clamped to the text.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = char_to_byte_idx(text, start);
    let end_byte = char_to_byte_idx(text, end.max(start));
    &text[start_byte..end_byte]
}
