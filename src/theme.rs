use ratatui::style::{Color, Modifier, Style};

/// Colors used by the two-pane viewer
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Color for status messages reporting a failure
    pub error_color: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    /// Foreground color for highlighted text (InlineStyle::Highlight)
    pub highlight_fg: Color,

    /// Background color for highlighted text (InlineStyle::Highlight)
    pub highlight_bg: Color,

    /// Color for links
    pub link_color: Color,

    /// Color for list markers and quote bars
    pub marker_color: Color,

    /// Border color of the pane holding the cursor
    pub active_border: Color,

    /// Border color of the other pane
    pub inactive_border: Color,

    /// Foreground color for the scrollbar knob
    pub scrollbar_knob_fg: Color,

    /// Foreground color for the scrollbar track
    pub scrollbar_track_fg: Color,

    /// Foreground color for menu items
    pub menu_fg: Color,

    /// Background color for menu
    pub menu_bg: Color,

    /// Foreground color for selected menu entry
    pub menu_selected_fg: Color,

    /// Background color for selected menu entry
    pub menu_selected_bg: Color,

    /// Foreground color for the shortcut column and the current language mark
    pub menu_hint_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            error_color: Color::LightRed,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightYellow,
            link_color: Color::Blue,
            marker_color: Color::DarkGray,
            active_border: Color::Gray,
            inactive_border: Color::DarkGray,
            scrollbar_knob_fg: Color::Reset,
            scrollbar_track_fg: Color::DarkGray,
            menu_fg: Color::White,
            menu_bg: Color::Black,
            menu_selected_fg: Color::White,
            menu_selected_bg: Color::LightBlue,
            menu_hint_fg: Color::DarkGray,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        self.status_bar_style().fg(self.filename_color)
    }

    pub fn error_style(&self) -> Style {
        self.status_bar_style()
            .fg(self.error_color)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    /// Get the style for highlighted text
    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }

    /// Get the style for links
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn marker_style(&self) -> Style {
        Style::default().fg(self.marker_color)
    }

    pub fn border_style(&self, active: bool) -> Style {
        let color = if active {
            self.active_border
        } else {
            self.inactive_border
        };
        Style::default().fg(color)
    }

    /// Get the style for the scrollbar knob
    pub fn scrollbar_knob_style(&self) -> Style {
        Style::default().fg(self.scrollbar_knob_fg)
    }

    /// Get the style for the scrollbar track
    pub fn scrollbar_track_style(&self) -> Style {
        Style::default().fg(self.scrollbar_track_fg)
    }

    /// Get the style for the menu/popup
    pub fn menu_style(&self) -> Style {
        Style::default().fg(self.menu_fg).bg(self.menu_bg)
    }

    /// Get the style for a selected menu entry
    pub fn menu_selected_style(&self) -> Style {
        Style::default()
            .fg(self.menu_selected_fg)
            .bg(self.menu_selected_bg)
    }

    pub fn menu_hint_style(&self) -> Style {
        Style::default().fg(self.menu_hint_fg)
    }
}
