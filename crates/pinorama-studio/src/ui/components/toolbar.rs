use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{AppState, Focus};
use crate::ui::Theme;

/// Toolbar above the log table: search input and the hotkey controls
pub struct Toolbar;

impl Toolbar {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let messages = state.messages();
        let ui = &state.ui_state;
        let editing = ui.focus == Focus::Search;

        let mut spans = vec![
            Self::key("f"),
            Span::styled(format!(" {}", messages.filters), Theme::toggle(ui.filters_visible)),
        ];
        if !state.filters.is_empty() {
            spans.push(Span::styled(format!(" ({})", state.filters.len()), Theme::text_highlight()));
        }
        spans.push(Self::separator());

        spans.push(Self::key("/"));
        spans.push(Span::raw(" "));
        if editing {
            spans.push(Span::styled(ui.search_input.clone(), Theme::text()));
            spans.push(Span::styled(
                "█",
                Theme::text_highlight().add_modifier(Modifier::SLOW_BLINK),
            ));
        } else if state.search_text.is_empty() {
            spans.push(Span::styled(messages.search_logs, Theme::text_dim()));
        } else {
            spans.push(Span::styled(state.search_text.clone(), Theme::text_highlight()));
        }
        spans.push(Self::separator());

        spans.push(Self::key("l"));
        spans.push(Span::styled(
            format!(" {} {}", if state.live { "●" } else { "○" }, messages.live),
            Theme::toggle(state.live),
        ));
        spans.push(Self::separator());

        spans.push(Self::key("r"));
        if state.fetching {
            spans.push(Span::styled(format!(" ⟳ {}", messages.refreshing), Theme::text_highlight()));
        } else {
            spans.push(Span::styled(format!(" {}", messages.refresh), Theme::text()));
        }

        if state.show_clear_filters() {
            spans.push(Self::separator());
            spans.push(Self::key("x"));
            spans.push(Span::styled(format!(" {}", messages.clear_filters), Theme::text()));
        }

        spans.push(Self::separator());
        spans.push(Self::key("c"));
        spans.push(Span::styled(format!(" {}", messages.columns), Theme::toggle(ui.columns_visible)));
        spans.push(Self::separator());
        spans.push(Self::key("d"));
        spans.push(Span::styled(format!(" {}", messages.details), Theme::toggle(ui.details_visible)));

        let toolbar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_for(editing)),
        );
        frame.render_widget(toolbar, area);
    }

    fn key(key: &str) -> Span<'static> {
        Span::styled(format!("[{}]", key), Theme::text_dim())
    }

    fn separator() -> Span<'static> {
        Span::styled(" │ ", Theme::text_dim())
    }
}
