use std::{
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState,
    },
};
use tracing::{error, info};

use crate::render::{Highlight, RenderResult, render_document, synced_scroll};
use crate::session::Session;
use crate::theme::Theme;

mod menu;
mod selection;

pub use menu::{LanguageMenu, MenuAction, MenuEntry};
pub use selection::{Motion, Selection};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const TICK_RATE: Duration = Duration::from_millis(250);

/// Takes over the terminal and runs the viewer until the user quits.
pub fn run(app: &mut App) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        // The frame above shows the "Translating" status; run the slow call now.
        if app.run_pending() {
            continue;
        }

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
    shown_at: Instant,
}

enum PendingAction {
    Translate(String),
}

pub struct App {
    session: Session,
    output_override: Option<PathBuf>,
    theme: Theme,
    selection: Selection,
    scroll_top: usize,
    last_view_height: usize,
    follow_cursor: bool,
    should_quit: bool,
    quit_armed: bool,
    status: Option<StatusMessage>,
    language_menu: Option<LanguageMenu>,
    pending: Option<PendingAction>,
}

impl App {
    /// `output` overrides where Ctrl-S writes; by default the translation
    /// goes next to the source, named after the target language.
    pub fn new(session: Session, output: Option<PathBuf>) -> Self {
        Self {
            session,
            output_override: output,
            theme: Theme::new(),
            selection: Selection::default(),
            scroll_top: 0,
            last_view_height: 1,
            follow_cursor: true,
            should_quit: false,
            quit_armed: false,
            status: None,
            language_menu: None,
            pending: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_override
            .clone()
            .unwrap_or_else(|| self.session.default_output_path())
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn is_menu_open(&self) -> bool {
        self.language_menu.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let status_height = if area.height > 1 { 2 } else { 1 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(status_height)])
            .split(area);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(vertical[0]);

        let (left_text, left_bar) = self.draw_pane_frame(frame, panes[0], true);
        let (right_text, right_bar) = self.draw_pane_frame(frame, panes[1], false);

        let left = {
            let highlight = Highlight {
                flat: self.session.original_flat(),
                selection: self.selection.range(),
                cursor: self.selection.cursor(),
            };
            render_document(
                self.session.original(),
                left_text.width.max(1) as usize,
                Some(&highlight),
                &self.theme,
            )
        };
        let viewport_height = left_text.height as usize;
        self.last_view_height = viewport_height.max(1);
        self.adjust_scroll(&left, viewport_height);

        let right = render_document(
            self.session.translated(),
            right_text.width.max(1) as usize,
            None,
            &self.theme,
        );
        let right_scroll = synced_scroll(&left, &right, self.scroll_top, right_text.height as usize);

        self.draw_lines(frame, &left, left_text, left_bar, self.scroll_top);
        self.draw_lines(frame, &right, right_text, right_bar, right_scroll);

        if let Some(cursor) = left.cursor {
            if cursor.line >= self.scroll_top
                && cursor.line < self.scroll_top + viewport_height
                && left_text.width > 0
            {
                let cursor_y = left_text.y + (cursor.line - self.scroll_top) as u16;
                let cursor_x = left_text.x + cursor.column.min(left_text.width - 1);
                frame.set_cursor_position(Position::new(cursor_x, cursor_y));
            }
        }

        let status_line = self.status_line();
        let status_widget = Paragraph::new(status_line)
            .style(self.theme.status_bar_style())
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(status_widget, vertical[1]);

        if self.language_menu.is_some() {
            self.render_language_menu(frame, area);
        }
    }

    /// Draws the border of a pane and returns its text and scrollbar areas.
    fn draw_pane_frame(&self, frame: &mut Frame, area: Rect, original: bool) -> (Rect, Rect) {
        let title = if original {
            format!(" Original: {} ", file_name(self.session.source()))
        } else {
            let marker = if self.session.is_dirty() { "*" } else { "" };
            format!(" Translation: {}{marker} ", self.session.target().name)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(self.theme.border_style(original));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        (columns[0], columns[1])
    }

    fn draw_lines(
        &self,
        frame: &mut Frame,
        render: &RenderResult,
        text_area: Rect,
        scrollbar_area: Rect,
        scroll: usize,
    ) {
        let paragraph = Paragraph::new(Text::from(render.lines.clone())).scroll((scroll as u16, 0));
        frame.render_widget(paragraph, text_area);

        let mut scrollbar_state = ScrollbarState::new(render.total_lines).position(scroll);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(self.theme.scrollbar_knob_style())
            .track_style(self.theme.scrollbar_track_style());
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }

    fn status_line(&mut self) -> Line<'static> {
        self.prune_status_message();
        if let Some(status) = &self.status {
            let style = match status.kind {
                StatusKind::Info => self.theme.status_bar_style(),
                StatusKind::Error => self.theme.error_style(),
            };
            return Line::from(Span::styled(status.text.clone(), style));
        }

        let marker = if self.session.is_dirty() { "*" } else { "" };
        let position = match self.selection.range() {
            Some(range) => format!("{} chars selected", range.len()),
            None => format!(
                "{}/{}",
                self.selection.cursor(),
                self.session.original_flat().len()
            ),
        };
        let details = format!(
            " | {} via {} | {} | Shift-arrows select | t translate | l language | Ctrl-S save | q quit",
            self.session.target(),
            self.session.translator_name(),
            position,
        );
        Line::from(vec![
            Span::styled(
                format!("{}{marker}", file_name(self.session.source())),
                self.theme.filename_style(),
            ),
            Span::styled(details, self.theme.status_bar_style()),
        ])
    }

    fn render_language_menu(&self, frame: &mut Frame, area: Rect) {
        let Some(menu) = &self.language_menu else {
            return;
        };

        if area.width < 3 || area.height < 3 {
            return;
        }

        let max_label_width = menu
            .entries()
            .iter()
            .map(|entry| match entry {
                MenuEntry::Item(item) => item.label.chars().count() + 5,
                MenuEntry::Section(title) => title.chars().count(),
            })
            .max()
            .unwrap_or(0);
        let content_width = max_label_width as u16;
        let min_width = 10.min(area.width);
        let width = (content_width + 4).min(area.width).max(min_width);
        let desired_height = (menu.entries().len() as u16 + 2).min(area.height);
        let height = desired_height.max(3.min(area.height));

        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);

        let popup_style = self.theme.menu_style();
        let items: Vec<ListItem> = menu
            .entries()
            .iter()
            .map(|entry| match entry {
                MenuEntry::Section(title) => ListItem::new(Line::from(Span::styled(
                    *title,
                    popup_style.add_modifier(Modifier::BOLD),
                ))),
                MenuEntry::Item(item) => {
                    let key = item.shortcut.map(|shortcut| shortcut.key).unwrap_or(' ');
                    let mark = if item.current { " ✓" } else { "" };
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{key}  "), self.theme.menu_hint_style()),
                        Span::raw(format!("{}{mark}", item.label)),
                    ]))
                }
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(menu.selected_index()));

        let list = List::new(items)
            .highlight_style(self.theme.menu_selected_style())
            .style(popup_style)
            .block(
                Block::default()
                    .title("Language")
                    .borders(Borders::ALL)
                    .style(popup_style)
                    .border_style(Style::default().fg(self.theme.active_border)),
            );

        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn handle_menu_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(menu) = self.language_menu.as_mut() else {
            return;
        };

        let action = match code {
            KeyCode::Esc | KeyCode::Char('l') => {
                self.language_menu = None;
                return;
            }
            KeyCode::Up => {
                menu.move_selection(-1);
                None
            }
            KeyCode::Down => {
                menu.move_selection(1);
                None
            }
            KeyCode::Enter => menu.current_action(),
            KeyCode::Char(_) => menu.shortcut_action(code, modifiers),
            _ => None,
        };

        if let Some(action) = action {
            self.execute_menu_action(action);
            self.language_menu = None;
        }
    }

    fn execute_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::SetLanguage(language) => {
                self.session.set_target(language);
                self.set_status(format!("Target language: {language}"), StatusKind::Info);
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return;
        };

        if self.language_menu.is_some() {
            self.handle_menu_key(code, modifiers);
            return;
        }

        if code != KeyCode::Char('q') {
            self.quit_armed = false;
        }

        let extend = modifiers.contains(KeyModifiers::SHIFT);
        let by_word = modifiers.contains(KeyModifiers::CONTROL);
        match (code, modifiers) {
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.save();
            }
            (KeyCode::Char('q'), _) => self.request_quit(),
            (KeyCode::Left, _) => {
                let motion = if by_word { Motion::WordLeft } else { Motion::Left };
                self.move_cursor(motion, extend);
            }
            (KeyCode::Right, _) => {
                let motion = if by_word {
                    Motion::WordRight
                } else {
                    Motion::Right
                };
                self.move_cursor(motion, extend);
            }
            (KeyCode::Up, _) => self.move_cursor(Motion::ParagraphUp, extend),
            (KeyCode::Down, _) => self.move_cursor(Motion::ParagraphDown, extend),
            (KeyCode::Home, _) => self.move_cursor(Motion::ParagraphStart, extend),
            (KeyCode::End, _) => self.move_cursor(Motion::ParagraphEnd, extend),
            (KeyCode::Char('w'), KeyModifiers::NONE) => self.move_cursor(Motion::WordRight, false),
            (KeyCode::Char('b'), KeyModifiers::NONE) => self.move_cursor(Motion::WordLeft, false),
            (KeyCode::Char('W'), _) => self.move_cursor(Motion::WordRight, true),
            (KeyCode::Char('B'), _) => self.move_cursor(Motion::WordLeft, true),
            (KeyCode::Esc, _) => self.selection.clear(),
            (KeyCode::Char('t'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
                self.request_translation();
            }
            (KeyCode::Char('l'), KeyModifiers::NONE) => {
                self.language_menu = Some(LanguageMenu::new(self.session.target()));
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => self.reload(),
            (KeyCode::PageUp, _) => {
                self.follow_cursor = false;
                self.scroll_top = self.scroll_top.saturating_sub(self.last_view_height);
            }
            (KeyCode::PageDown, _) => {
                self.follow_cursor = false;
                self.scroll_top += self.last_view_height;
            }
            _ => {}
        }
    }

    pub fn on_tick(&mut self) {
        self.prune_status_message();
    }

    /// Runs a queued translation. Returns whether there was one.
    pub fn run_pending(&mut self) -> bool {
        let Some(PendingAction::Translate(text)) = self.pending.take() else {
            return false;
        };

        match self.session.translate_selection(&text) {
            Ok(replacement) => {
                let count = replacement.paragraphs.len();
                let noun = if count == 1 { "paragraph" } else { "paragraphs" };
                self.set_status(
                    format!(
                        "Translated {count} {noun} into {} ({})",
                        self.session.target().name,
                        replacement.strategy.label()
                    ),
                    StatusKind::Info,
                );
            }
            Err(err) if err.is_noop() => {}
            Err(err) => {
                self.set_status(format!("{:#}", anyhow::Error::new(err)), StatusKind::Error);
            }
        }
        true
    }

    fn move_cursor(&mut self, motion: Motion, extend: bool) {
        self.selection
            .apply(motion, self.session.original_flat(), extend);
        self.follow_cursor = true;
    }

    fn request_translation(&mut self) {
        let Some(range) = self.selection.range() else {
            self.set_status(
                "Select some text in the left pane first (Shift + arrows)".to_string(),
                StatusKind::Error,
            );
            return;
        };
        let text = self.session.selected_text(range);
        if text.trim().is_empty() {
            return;
        }
        self.pending = Some(PendingAction::Translate(text));
        self.set_status(
            format!("Translating into {}...", self.session.target().name),
            StatusKind::Info,
        );
    }

    fn request_quit(&mut self) {
        if self.session.is_dirty() && !self.quit_armed {
            self.quit_armed = true;
            self.set_status(
                "Unsaved translation. Press q again to quit or Ctrl-S to save".to_string(),
                StatusKind::Error,
            );
            return;
        }
        self.should_quit = true;
    }

    fn save(&mut self) {
        let path = self.output_path();
        match self.session.save_translation(&path) {
            Ok(_) => {
                self.set_status(
                    format!("Saved translation to {}", path.display()),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                error!(path = %path.display(), %err, "saving translation failed");
                self.set_status(format!("{:#}", anyhow::Error::new(err)), StatusKind::Error);
            }
        }
    }

    fn reload(&mut self) {
        match self.session.reload() {
            Ok(()) => {
                self.selection.clear();
                self.selection.clamp(self.session.original_flat().len());
                self.follow_cursor = true;
                info!("viewer reloaded");
                self.set_status(
                    format!("Reloaded {}", file_name(self.session.source())),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                error!(%err, "reloading failed");
                self.set_status(format!("{:#}", anyhow::Error::new(err)), StatusKind::Error);
            }
        }
    }

    fn set_status(&mut self, text: String, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text,
            kind,
            shown_at: Instant::now(),
        });
    }

    fn prune_status_message(&mut self) {
        if self.pending.is_some() {
            return;
        }
        if let Some(status) = &self.status {
            if status.shown_at.elapsed() > STATUS_TIMEOUT {
                self.status = None;
            }
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if self.follow_cursor {
            if let Some(cursor) = &render.cursor {
                if cursor.line < self.scroll_top {
                    self.scroll_top = cursor.line;
                } else if cursor.line >= self.scroll_top + viewport {
                    let target = cursor.line.saturating_add(1);
                    self.scroll_top = target.saturating_sub(viewport);
                }
            }
        }
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
