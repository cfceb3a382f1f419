use std::ops::Range;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use tdoc::{InlineStyle, Span as DocSpan};
use unicode_width::UnicodeWidthChar;

use crate::document::{BlockInfo, BlockKind, Document, ListMarker};
use crate::normalize::{FlatText, NormalizedText};
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

/// Selection and cursor to draw, both in flat text offsets.
#[derive(Clone, Debug)]
pub struct Highlight<'a> {
    pub flat: &'a FlatText,
    pub selection: Option<Range<usize>>,
    pub cursor: usize,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub total_lines: usize,
    /// First line of every paragraph.
    pub paragraph_lines: Vec<usize>,
    pub cursor: Option<CursorVisualPosition>,
}

impl RenderResult {
    /// Paragraph drawn at `line`, counting the gap after a paragraph as
    /// part of it.
    pub fn paragraph_at_line(&self, line: usize) -> Option<usize> {
        self.paragraph_lines
            .partition_point(|start| *start <= line)
            .checked_sub(1)
    }

    pub fn paragraph_height(&self, paragraph: usize) -> usize {
        let Some(start) = self.paragraph_lines.get(paragraph) else {
            return 0;
        };
        let end = self
            .paragraph_lines
            .get(paragraph + 1)
            .copied()
            .unwrap_or(self.total_lines);
        end.saturating_sub(*start)
    }
}

pub fn render_document(
    document: &Document,
    width: usize,
    highlight: Option<&Highlight<'_>>,
    theme: &Theme,
) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), theme);
    let mut previous: Option<BlockInfo> = None;
    for idx in 0..document.len() {
        let info = document.info(idx);
        if idx > 0 && needs_gap(previous, info) {
            renderer.push_blank_line();
        }
        renderer.render_paragraph(idx, document.runs(idx).unwrap_or(&[]), info, highlight);
        previous = info;
    }
    renderer.finish()
}

/// Scroll position for `target` that shows the paragraph `source` shows at
/// its top line, at the same line offset where possible.
pub fn synced_scroll(
    source: &RenderResult,
    target: &RenderResult,
    source_scroll: usize,
    viewport_height: usize,
) -> usize {
    let max_scroll = target.total_lines.saturating_sub(viewport_height.max(1));
    let Some(paragraph) = source.paragraph_at_line(source_scroll) else {
        return source_scroll.min(max_scroll);
    };
    let Some(target_start) = target.paragraph_lines.get(paragraph).copied() else {
        return source_scroll.min(max_scroll);
    };
    let offset = source_scroll - source.paragraph_lines[paragraph];
    let height = target.paragraph_height(paragraph).max(1);
    (target_start + offset.min(height - 1)).min(max_scroll)
}

fn needs_gap(previous: Option<BlockInfo>, current: Option<BlockInfo>) -> bool {
    match (previous, current) {
        (Some(previous), Some(current)) => !(previous.list_depth > 0 && current.list_depth > 0),
        _ => true,
    }
}

struct Renderer<'a> {
    wrap_width: usize,
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    paragraph_lines: Vec<usize>,
    cursor: Option<CursorVisualPosition>,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, theme: &'a Theme) -> Self {
        Self {
            wrap_width,
            theme,
            lines: Vec::new(),
            paragraph_lines: Vec::new(),
            cursor: None,
        }
    }

    fn render_paragraph(
        &mut self,
        idx: usize,
        runs: &[DocSpan],
        info: Option<BlockInfo>,
        highlight: Option<&Highlight<'_>>,
    ) {
        let base = info
            .map(|info| block_style(info.kind))
            .unwrap_or_default();
        let mut raw = String::new();
        let mut raw_styles = Vec::new();
        for span in runs {
            collect_chars(span, base, self.theme, &mut raw, &mut raw_styles);
        }

        let normalized = NormalizedText::new(&raw);
        let flat_start = highlight.and_then(|h| h.flat.paragraph_range(idx).map(|(start, _)| start));
        let selection = highlight.and_then(|h| h.selection.clone());
        let cells: Vec<Cell> = normalized
            .as_str()
            .chars()
            .enumerate()
            .map(|(offset, ch)| {
                let mut style = normalized
                    .raw_offset(offset)
                    .and_then(|raw_idx| raw_styles.get(raw_idx))
                    .copied()
                    .unwrap_or(base);
                if let (Some(start), Some(range)) = (flat_start, &selection) {
                    if range.contains(&(start + offset)) {
                        style = style.patch(self.theme.selection_style());
                    }
                }
                Cell {
                    ch,
                    style,
                    width: UnicodeWidthChar::width(ch).unwrap_or(0),
                }
            })
            .collect();

        let (first_prefix, continuation_prefix) = info.map(prefixes).unwrap_or_default();
        let prefix_style = self.theme.marker_style();
        let wrapped = wrap_cells(
            &cells,
            &first_prefix,
            &continuation_prefix,
            prefix_style,
            self.wrap_width,
        );

        let first_line = self.lines.len();
        self.paragraph_lines.push(first_line);

        let cursor_offset = highlight
            .and_then(|h| h.flat.locate(h.cursor))
            .filter(|(paragraph, _)| *paragraph == idx)
            .map(|(_, offset)| offset);
        if let Some(offset) = cursor_offset {
            let (line, column) = wrapped
                .positions
                .get(offset)
                .copied()
                .unwrap_or(wrapped.end);
            self.cursor = Some(CursorVisualPosition {
                line: first_line + line,
                column,
            });
        }

        self.lines.extend(wrapped.lines);
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn finish(self) -> RenderResult {
        RenderResult {
            total_lines: self.lines.len(),
            lines: self.lines,
            paragraph_lines: self.paragraph_lines,
            cursor: self.cursor,
        }
    }
}

fn block_style(kind: BlockKind) -> Style {
    match kind {
        BlockKind::Heading(1) => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        BlockKind::Heading(_) => Style::default().add_modifier(Modifier::BOLD),
        BlockKind::Code => Style::default().add_modifier(Modifier::DIM),
        BlockKind::Text | BlockKind::ChecklistItem => Style::default(),
    }
}

fn prefixes(info: BlockInfo) -> (String, String) {
    let mut base = "│ ".repeat(info.quote_depth);
    base.push_str(&"  ".repeat(info.list_depth.saturating_sub(1)));

    let marker = match info.marker {
        Some(ListMarker::Bullet) => "• ".to_string(),
        Some(ListMarker::Number(number)) => format!("{number}. "),
        Some(ListMarker::Checkbox(true)) => "[x] ".to_string(),
        Some(ListMarker::Checkbox(false)) => "[ ] ".to_string(),
        None if info.list_depth > 0 => "  ".to_string(),
        None => String::new(),
    };
    let continuation = format!("{base}{}", " ".repeat(visible_width(&marker)));
    (format!("{base}{marker}"), continuation)
}

fn collect_chars(
    span: &DocSpan,
    base_style: Style,
    theme: &Theme,
    text: &mut String,
    styles: &mut Vec<Style>,
) {
    let style = merge_style(base_style, span.style, theme);
    for ch in span.text.chars() {
        text.push(ch);
        styles.push(style);
    }
    for child in &span.children {
        collect_chars(child, style, theme, text, styles);
    }
}

fn merge_style(base: Style, inline: InlineStyle, theme: &Theme) -> Style {
    match inline {
        InlineStyle::None => base,
        InlineStyle::Bold => base.add_modifier(Modifier::BOLD),
        InlineStyle::Italic => base.add_modifier(Modifier::ITALIC),
        InlineStyle::Highlight => base.patch(theme.highlight_style()),
        InlineStyle::Underline => base.add_modifier(Modifier::UNDERLINED),
        InlineStyle::Strike => base.add_modifier(Modifier::CROSSED_OUT),
        InlineStyle::Link => base.patch(theme.link_style()),
        InlineStyle::Code => base.add_modifier(Modifier::DIM),
    }
}

#[derive(Clone, Copy)]
struct Cell {
    ch: char,
    style: Style,
    width: usize,
}

struct Token {
    cells: Range<usize>,
    width: usize,
    whitespace: bool,
}

fn tokenize(cells: &[Cell]) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for (idx, cell) in cells.iter().enumerate() {
        let whitespace = cell.ch.is_whitespace();
        match tokens.last_mut() {
            Some(token) if token.whitespace == whitespace => {
                token.cells.end = idx + 1;
                token.width += cell.width;
            }
            _ => tokens.push(Token {
                cells: idx..idx + 1,
                width: cell.width,
                whitespace,
            }),
        }
    }
    tokens
}

#[derive(Default)]
struct WrappedParagraph {
    lines: Vec<Line<'static>>,
    /// Line and column of every cell.
    positions: Vec<(usize, u16)>,
    /// Position just after the last cell.
    end: (usize, u16),
}

struct LineBuilder {
    spans: Vec<Span<'static>>,
    current: Option<(String, Style)>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &str, prefix_style: Style) -> Self {
        let prefix_width = visible_width(prefix);
        let mut spans = Vec::new();
        if !prefix.is_empty() {
            spans.push(Span::styled(prefix.to_string(), prefix_style));
        }
        Self {
            spans,
            current: None,
            width: prefix_width,
            prefix_width,
        }
    }

    fn has_content(&self) -> bool {
        self.width > self.prefix_width
    }

    fn push_cell(&mut self, cell: Cell) {
        match &mut self.current {
            Some((text, style)) if *style == cell.style => text.push(cell.ch),
            _ => {
                self.flush();
                self.current = Some((cell.ch.to_string(), cell.style));
            }
        }
        self.width += cell.width;
    }

    fn flush(&mut self) {
        if let Some((text, style)) = self.current.take() {
            self.spans.push(Span::styled(text, style));
        }
    }

    fn build_line(mut self) -> Line<'static> {
        self.flush();
        Line::from(self.spans)
    }
}

impl WrappedParagraph {
    fn push_cell(&mut self, builder: &mut LineBuilder, cell: Cell) {
        self.positions
            .push((self.lines.len(), builder.width as u16));
        builder.push_cell(cell);
    }

    fn break_line(&mut self, builder: LineBuilder) {
        self.lines.push(builder.build_line());
    }
}

fn wrap_cells(
    cells: &[Cell],
    first_prefix: &str,
    continuation_prefix: &str,
    prefix_style: Style,
    width: usize,
) -> WrappedParagraph {
    let mut wrapped = WrappedParagraph::default();
    let mut builder = LineBuilder::new(first_prefix, prefix_style);
    let mut pending_whitespace: Vec<Token> = Vec::new();

    for token in tokenize(cells) {
        if token.whitespace {
            pending_whitespace.push(token);
            continue;
        }

        let whitespace_width: usize = pending_whitespace.iter().map(|item| item.width).sum();
        let overflows = builder.width + whitespace_width + token.width > width;
        for pending in pending_whitespace.drain(..) {
            for idx in pending.cells {
                wrapped.push_cell(&mut builder, cells[idx]);
            }
        }
        if builder.has_content() && overflows {
            let full = std::mem::replace(
                &mut builder,
                LineBuilder::new(continuation_prefix, prefix_style),
            );
            wrapped.break_line(full);
        }

        for idx in token.cells {
            let cell = cells[idx];
            if builder.has_content() && builder.width + cell.width > width {
                let full = std::mem::replace(
                    &mut builder,
                    LineBuilder::new(continuation_prefix, prefix_style),
                );
                wrapped.break_line(full);
            }
            wrapped.push_cell(&mut builder, cell);
        }
    }

    for pending in pending_whitespace.drain(..) {
        for idx in pending.cells {
            wrapped.push_cell(&mut builder, cells[idx]);
        }
    }
    wrapped.end = (wrapped.lines.len(), builder.width as u16);
    wrapped.break_line(builder);
    wrapped
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
