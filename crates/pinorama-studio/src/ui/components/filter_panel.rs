use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::app::{key_to_value, AppState, Focus};
use crate::format::{self, css_style};
use crate::ui::Theme;

/// Facets with their value counts; selected values become filters
pub struct FilterPanel;

impl FilterPanel {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let messages = state.messages();
        let focused = state.ui_state.focus == Focus::Filters;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_for(focused))
            .title(Span::styled(format!(" {} ", messages.filters), Theme::title()));

        let Some(intro) = &state.introspection else {
            frame.render_widget(block, area);
            return;
        };

        let entries = state.filter_entries();
        if entries.is_empty() {
            let empty = Paragraph::new(Span::styled(format!(" {}", messages.no_facets), Theme::text_dim()))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let mut lines = Vec::new();
        let mut cursor_line = 0;
        let mut current_property: Option<&str> = None;

        for (index, entry) in entries.iter().enumerate() {
            if current_property != Some(entry.property.as_str()) {
                if current_property.is_some() {
                    lines.push(Line::from(""));
                }
                current_property = Some(entry.property.as_str());
                lines.push(Line::from(Span::styled(
                    format::truncate(intro.label(&entry.property), inner_width),
                    Theme::text_highlight(),
                )));
            }

            let is_cursor = focused && index == state.ui_state.filter_cursor;
            if is_cursor {
                cursor_line = lines.len();
            }
            let selected = state.filters.contains(&entry.property, &entry.key);
            let value = key_to_value(&entry.key);
            let label = display_label(state, &entry.property, &value, &entry.key);
            let count = entry.count.to_string();

            let label_width = inner_width.saturating_sub(count.len() + 6);
            let label = format::truncate(&label, label_width);
            let padding = label_width.saturating_sub(label.width());

            let mut value_style = css_style(&intro.style(&entry.property, Some(&value)));
            if is_cursor {
                value_style = value_style.add_modifier(Modifier::REVERSED);
            }
            let checkbox_style = if selected {
                Style::default().fg(Theme::SUCCESS)
            } else {
                Theme::text_dim()
            };

            lines.push(Line::from(vec![
                Span::styled(if selected { " [✓] " } else { " [ ] " }, checkbox_style),
                Span::styled(label, value_style),
                Span::raw(" ".repeat(padding + 1)),
                Span::styled(count, Theme::text_dim()),
            ]));
        }

        // Keep the cursor in view
        let height = area.height.saturating_sub(2) as usize;
        let scroll = cursor_line.saturating_sub(height.saturating_sub(1));

        let panel = Paragraph::new(lines)
            .block(block)
            .scroll((scroll as u16, 0));
        frame.render_widget(panel, area);
    }
}

/// Decoded label of a facet value, falling back to the raw key
fn display_label(state: &AppState, property: &str, value: &Value, key: &str) -> String {
    match &state.introspection {
        Some(intro) => intro
            .value_label(property, value)
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string()),
        None => key.to_string(),
    }
}
