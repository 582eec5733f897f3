use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::messages::Messages;
use crate::ui::{Layout, Theme};

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, messages: &Messages) {
        let popup_area = Layout::popup(frame.area(), 50, 30);
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Navigation"),
            Self::key_line("j/↓", "Next row"),
            Self::key_line("k/↑", "Previous row"),
            Self::key_line("Ctrl+d", "Page down"),
            Self::key_line("Ctrl+u", "Page up"),
            Self::key_line("g/G", "First/last row"),
            Self::key_line("Tab", "Switch table/filters"),
            Line::from(""),
            Self::section("Toolbar"),
            Self::key_line("/", messages.search_logs),
            Self::key_line("f", messages.filters),
            Self::key_line("l", messages.live),
            Self::key_line("r", messages.refresh),
            Self::key_line("x", messages.clear_filters),
            Self::key_line("c", messages.columns),
            Self::key_line("d/Enter", messages.details),
            Line::from(""),
            Self::section("Display"),
            Self::key_line("t", "Local time / UTC"),
            Self::key_line("J/K", "Scroll details"),
            Self::key_line("o", "Connect / disconnect"),
            Line::from(""),
            Self::key_line("?", messages.help),
            Self::key_line("Esc", "Close"),
            Self::key_line("q", messages.quit),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(format!(" {} ", messages.help), Theme::title())),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Theme::HIGHLIGHT)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Theme::SUCCESS)),
            Span::styled(format!("  {}", desc), Theme::text()),
        ])
    }
}
