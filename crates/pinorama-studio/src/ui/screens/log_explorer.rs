use ratatui::{
    layout::{Alignment, Constraint, Margin, Rect},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
    Frame,
};

use crate::app::{AppState, Connection, Focus, LogsStatus};
use crate::format::{self, TimeZoneMode};
use crate::ui::components::{
    ColumnToggle, DetailsPanel, FilterPanel, HelpOverlay, StatusBar, TitleBar, Toolbar,
};
use crate::ui::{Layout, Theme};

/// The log explorer: toolbar, filters, log table and details
pub struct LogExplorerScreen;

impl LogExplorerScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let (title_area, toolbar_area, content_area, status_area) = Layout::main(frame.area());
        let (filters_area, table_area, details_area) = Layout::content(
            content_area,
            state.ui_state.filters_visible,
            state.ui_state.details_visible,
        );

        frame.render_widget(
            TitleBar {
                connection: &state.connection,
                server_url: &state.server_url,
                messages: state.messages(),
            },
            title_area,
        );
        Toolbar::render(frame, toolbar_area, state);

        if let Some(area) = filters_area {
            FilterPanel::render(frame, area, state);
        }
        Self::render_table(frame, table_area, state);
        if let Some(area) = details_area {
            DetailsPanel::render(frame, area, state);
        }

        Self::render_status_bar(frame, status_area, state);

        if state.ui_state.columns_visible {
            ColumnToggle::render(frame, state);
        }
        if state.ui_state.help_visible {
            HelpOverlay::render(frame, state.messages());
        }
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let messages = state.messages();
        let focused = state.ui_state.focus == Focus::Logs;
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_for(focused));
        if let Some(error) = &state.ui_state.error_message {
            block = block.title_bottom(Span::styled(format!(" {} ", error), Theme::error()));
        }

        // Rows inside the borders, below the header
        let height = area.height.saturating_sub(3) as usize;
        state.ui_state.page_size = height.max(1);

        if state.rows.is_empty() {
            let (text, style) = match (&state.connection, &state.status) {
                (Connection::Disconnected, _) => (messages.disconnected.to_string(), Theme::text_dim()),
                (_, LogsStatus::Failed(reason)) => {
                    (format!("{}: {}", messages.error_loading, reason), Theme::error())
                }
                (_, LogsStatus::Loading) => (messages.loading.to_string(), Theme::text_dim()),
                (_, LogsStatus::Ready) => (messages.no_logs_found.to_string(), Theme::text_dim()),
            };
            let placeholder = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, style))])
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let total = state.rows.len();
        let offset = window_offset(
            state.ui_state.table_state.offset(),
            state.selected_index(),
            total,
            height,
            state.live,
        );
        *state.ui_state.table_state.offset_mut() = offset;

        let Some(intro) = &state.introspection else {
            frame.render_widget(block, area);
            return;
        };
        let tz = state.ui_state.time_zone;
        let columns: Vec<_> = state.visible_columns().collect();

        let header = Row::new(
            columns
                .iter()
                .map(|c| Cell::from(format::truncate(&c.title, c.width as usize))),
        )
        .style(Theme::table_header());

        let end = (offset + height).min(total);
        let rows = state.rows[offset..end].iter().map(|record| {
            Row::new(columns.iter().map(|column| {
                let (text, style) = format::cell(intro, &column.property, record, tz);
                Cell::from(Span::styled(format::truncate(&text, column.width as usize), style))
            }))
        });

        let widths: Vec<Constraint> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i + 1 == columns.len() {
                    Constraint::Min(c.width)
                } else {
                    Constraint::Length(c.width)
                }
            })
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Theme::row_selected());

        let mut window_state =
            TableState::default().with_selected(state.selected_index().map(|i| i - offset));
        frame.render_stateful_widget(table, area, &mut window_state);

        if total > height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total.saturating_sub(height))
                .position(offset);
            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let messages = state.messages();
        let hints: Vec<(&str, &str)> = match state.ui_state.focus {
            Focus::Search => vec![("Enter", "Apply"), ("Esc", "Cancel"), ("^U", "Clear")],
            Focus::Filters => vec![
                ("↑/↓", "Move"),
                ("Enter", "Toggle"),
                ("Tab", "Table"),
                ("?", messages.help),
                ("q", messages.quit),
            ],
            Focus::Logs => vec![
                ("/", "Search"),
                ("f", messages.filters),
                ("l", messages.live),
                ("r", messages.refresh),
                ("?", messages.help),
                ("q", messages.quit),
            ],
        };

        let zone = match state.ui_state.time_zone {
            TimeZoneMode::Local => messages.local_time,
            TimeZoneMode::Utc => messages.utc,
        };
        let mut right = format!("{} {} │ {}", state.rows.len(), messages.logs, zone);
        if state.live {
            right.push_str(&format!(" │ ● {}", messages.live));
        }

        frame.render_widget(StatusBar::new().hints(hints).right(right), area);
    }
}

/// First row of the visible window
///
/// Keeps the selection in view. Without a selection, live mode follows the
/// newest rows.
fn window_offset(
    current: usize,
    selected: Option<usize>,
    total: usize,
    height: usize,
    follow: bool,
) -> usize {
    let max_offset = total.saturating_sub(height);
    let offset = match selected {
        Some(sel) if sel < current => sel,
        Some(sel) if height > 0 && sel >= current + height => sel + 1 - height,
        Some(_) => current,
        None if follow => max_offset,
        None => current,
    };
    offset.min(max_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Locale;
    use pinorama_types::Introspection;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn screen_text(state: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| LogExplorerScreen::render(frame, state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn connected() -> AppState {
        let mut state = AppState::new("http://127.0.0.1:6200", Locale::En);
        let intro: Introspection = serde_json::from_value(json!({
            "dbSchema": { "level": "enum", "msg": "string" },
            "columns": {
                "level": { "visible": true, "size": 80 },
                "msg": { "visible": true, "size": 300 }
            },
            "labels": { "level": ["Level", { "30": "INFO" }], "msg": "Message" }
        }))
        .unwrap();
        state.set_introspection(intro);
        state
    }

    #[test]
    fn test_window_offset() {
        assert_eq!(window_offset(0, None, 100, 10, false), 0);
        assert_eq!(window_offset(0, None, 100, 10, true), 90);
        assert_eq!(window_offset(0, Some(15), 100, 10, false), 6);
        assert_eq!(window_offset(20, Some(15), 100, 10, false), 15);
        assert_eq!(window_offset(10, Some(15), 100, 10, true), 10);
        assert_eq!(window_offset(50, None, 5, 10, false), 0);
    }

    #[test]
    fn test_renders_rows_with_labels() {
        let mut state = connected();
        let request = state.restart_query().unwrap();
        state.logs_loaded(
            request.generation,
            vec![json!({ "level": 30, "msg": "server started" })],
            false,
        );

        let text = screen_text(&mut state);
        assert!(text.contains("Pinorama"));
        assert!(text.contains("Connected"));
        assert!(text.contains("Level"));
        assert!(text.contains("INFO"));
        assert!(text.contains("server started"));
        assert!(text.contains("1 logs"));
    }

    #[test]
    fn test_empty_and_failed_states() {
        let mut state = connected();
        let request = state.restart_query().unwrap();
        assert!(screen_text(&mut state).contains("Loading..."));

        state.logs_loaded(request.generation, Vec::new(), false);
        assert!(screen_text(&mut state).contains("No logs found"));

        let request = state.restart_query().unwrap();
        state.logs_failed(request.generation, "boom".into(), false);
        assert!(screen_text(&mut state).contains("Error loading logs: boom"));
    }

    #[test]
    fn test_clear_filters_control_follows_state() {
        let mut state = connected();
        assert!(!screen_text(&mut state).contains("Clear filters"));
        state.search_text = "boom".into();
        assert!(screen_text(&mut state).contains("Clear filters"));
    }

    #[test]
    fn test_italian_messages() {
        let mut state = connected();
        state.locale = Locale::It;
        let request = state.restart_query().unwrap();
        state.logs_loaded(request.generation, Vec::new(), false);
        assert!(screen_text(&mut state).contains("Nessun log trovato"));
    }
}
