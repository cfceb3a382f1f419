use tdoc::Span;

use crate::document::{char_slice, char_to_byte_idx, run_texts, run_texts_mut, runs_text};

/// Which rewrite a splice performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// The range covered the whole paragraph; one fresh run replaced them all.
    WholeParagraph,
    SingleRun,
    MultiRun,
    /// Run boundaries could not be resolved; the paragraph was rebuilt as one
    /// run. The run lengths come from the same slots as the paragraph text, so
    /// `splice_runs` never reports this today.
    Rebuilt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RunRange {
    start_run: usize,
    start_offset: usize,
    end_run: usize,
    end_offset: usize,
}

/// Replaces the chars `[start, end)` of the paragraph formed by `runs`.
///
/// The range is clamped to the paragraph text. Runs entirely before or after
/// the range keep their text and formatting.
pub fn splice_runs(
    runs: &mut Vec<Span>,
    start: usize,
    end: usize,
    replacement: &str,
) -> SpliceOutcome {
    let text = runs_text(runs);
    let len = text.chars().count();
    let end = end.min(len);
    let start = start.min(end);

    if start == 0 && end >= len {
        *runs = vec![Span::new_text(replacement)];
        return SpliceOutcome::WholeParagraph;
    }

    let lengths: Vec<usize> = run_texts(runs)
        .iter()
        .map(|text| text.chars().count())
        .collect();
    let Some(range) = locate_runs(&lengths, start, end) else {
        let rebuilt = format!(
            "{}{}{}",
            char_slice(&text, 0, start),
            replacement,
            char_slice(&text, end, len)
        );
        *runs = vec![Span::new_text(rebuilt.as_str())];
        return SpliceOutcome::Rebuilt;
    };

    let mut slots = run_texts_mut(runs);
    if range.start_run == range.end_run {
        let slot = &mut slots[range.start_run];
        let start_byte = char_to_byte_idx(slot.as_str(), range.start_offset);
        let end_byte = char_to_byte_idx(slot.as_str(), range.end_offset);
        slot.replace_range(start_byte..end_byte, replacement);
        return SpliceOutcome::SingleRun;
    }

    let start_slot = &mut slots[range.start_run];
    let start_byte = char_to_byte_idx(start_slot.as_str(), range.start_offset);
    start_slot.truncate(start_byte);
    start_slot.push_str(replacement);

    for slot in &mut slots[range.start_run + 1..range.end_run] {
        slot.clear();
    }

    let end_slot = &mut slots[range.end_run];
    let end_byte = char_to_byte_idx(end_slot.as_str(), range.end_offset);
    end_slot.drain(..end_byte);

    SpliceOutcome::MultiRun
}

/// Finds the runs holding `start` and `end`. A position on a run boundary
/// belongs to the earlier run.
fn locate_runs(lengths: &[usize], start: usize, end: usize) -> Option<RunRange> {
    let mut consumed = 0;
    let mut start_at = None;
    let mut end_at = None;

    for (idx, len) in lengths.iter().enumerate() {
        let run_end = consumed + len;
        if start_at.is_none() && start <= run_end {
            start_at = Some((idx, start - consumed));
        }
        if end_at.is_none() && end <= run_end {
            end_at = Some((idx, (end - consumed).min(*len)));
        }
        consumed = run_end;
    }

    let (start_run, start_offset) = start_at?;
    let (end_run, end_offset) = end_at?;
    Some(RunRange {
        start_run,
        start_offset,
        end_run,
        end_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_prefers_earlier_run_on_boundaries() {
        let range = locate_runs(&[6, 5], 6, 6).unwrap();
        assert_eq!(
            range,
            RunRange {
                start_run: 0,
                start_offset: 6,
                end_run: 0,
                end_offset: 6,
            }
        );
    }

    #[test]
    fn locate_spans_several_runs() {
        let range = locate_runs(&[3, 4, 5], 2, 9).unwrap();
        assert_eq!(range.start_run, 0);
        assert_eq!(range.start_offset, 2);
        assert_eq!(range.end_run, 2);
        assert_eq!(range.end_offset, 2);
    }

    #[test]
    fn locate_fails_past_the_last_run() {
        assert_eq!(locate_runs(&[2, 2], 1, 7), None);
        assert_eq!(locate_runs(&[], 0, 0), None);
    }
}
