use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::AppState;
use crate::format;
use crate::ui::{Layout, Theme};

/// Popup listing the table columns with their visibility
pub struct ColumnToggle;

impl ColumnToggle {
    pub fn render(frame: &mut Frame, state: &AppState) {
        let messages = state.messages();
        let height = state.columns.len() as u16 + 4;
        let popup_area = Layout::popup(frame.area(), 44, height.max(6));
        frame.render_widget(Clear, popup_area);

        let name_width = popup_area.width.saturating_sub(10) as usize;
        let mut lines: Vec<Line> = state
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let is_cursor = index == state.ui_state.column_cursor;
                let cursor = if is_cursor { "▸" } else { " " };
                let checkbox_style = if column.visible {
                    Style::default().fg(Theme::SUCCESS)
                } else {
                    Theme::text_dim()
                };
                let name_style = if is_cursor {
                    Style::default()
                        .fg(Theme::PRIMARY)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Theme::PRIMARY)
                };

                Line::from(vec![
                    Span::styled(format!(" {}", cursor), Theme::text()),
                    Span::styled(if column.visible { "[✓] " } else { "[ ] " }, checkbox_style),
                    Span::styled(format::truncate(&column.title, name_width), name_style),
                ])
            })
            .collect();

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" [Enter]", Theme::text_highlight()),
            Span::styled("Toggle ", Theme::text_dim()),
            Span::styled("[Esc]", Theme::text_highlight()),
            Span::styled("Close", Theme::text_dim()),
        ]));

        let popup = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(format!(" {} ", messages.columns), Theme::title())),
        );
        frame.render_widget(popup, popup_area);
    }
}
