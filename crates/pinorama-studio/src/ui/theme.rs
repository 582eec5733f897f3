use ratatui::style::{Color, Modifier, Style};

use crate::app::Connection;

/// Color theme for the studio
pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Accent colors
    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    // JSON colors (details panel)
    pub const JSON_KEY: Color = Color::Cyan;
    pub const JSON_STRING: Color = Color::Green;
    pub const JSON_NUMBER: Color = Color::Yellow;
    pub const JSON_BOOL: Color = Color::Magenta;
    pub const JSON_NULL: Color = Color::Red;

    // Border styles
    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    pub fn border_for(focused: bool) -> Style {
        if focused {
            Self::border_focused()
        } else {
            Self::border()
        }
    }

    // Text styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    // Table styles
    pub fn table_header() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn row_selected() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // Toggle indicators
    pub fn toggle(on: bool) -> Style {
        if on {
            Style::default()
                .fg(Self::SUCCESS)
                .add_modifier(Modifier::BOLD)
        } else {
            Self::text_dim()
        }
    }

    // Status bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG_DIM).bg(Color::DarkGray)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn connection(connection: &Connection) -> Style {
        match connection {
            Connection::Connected => Style::default().fg(Self::SUCCESS),
            Connection::Connecting => Style::default().fg(Self::WARNING),
            Connection::Disconnected => Self::text_dim(),
            Connection::Unreachable(_) => Style::default().fg(Self::ERROR),
        }
    }

    // Error
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }
}
