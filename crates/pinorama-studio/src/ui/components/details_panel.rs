use std::iter::Peekable;
use std::str::Chars;

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;

use crate::app::AppState;
use crate::ui::Theme;

/// Selected record as pretty-printed JSON
pub struct DetailsPanel;

impl DetailsPanel {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let messages = state.messages();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(format!(" {} ", messages.details), Theme::title()));

        let lines = match state.selected_record() {
            Some(record) => json_lines(record),
            None => vec![Line::from(Span::styled(
                format!(" {}", messages.no_selection),
                Theme::text_dim(),
            ))],
        };

        let details = Paragraph::new(lines)
            .block(block)
            .scroll((state.ui_state.details_scroll, 0));
        frame.render_widget(details, area);
    }
}

/// Pretty-print a value into colored lines
pub fn json_lines(value: &Value) -> Vec<Line<'static>> {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    pretty.lines().map(colorize_json_line).collect()
}

/// Colorize one line of pretty-printed JSON
fn colorize_json_line(line: &str) -> Line<'static> {
    let punct_style = Theme::text_dim();
    let mut spans = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' => spans.push(Span::raw(" ")),
            '{' | '}' | '[' | ']' | ':' | ',' => {
                spans.push(Span::styled(c.to_string(), punct_style));
            }
            '"' => {
                let s = read_string(&mut chars);
                // A string followed by a colon is a key
                let is_key = chars.clone().find(|c| !c.is_whitespace()) == Some(':');
                let style = if is_key {
                    Style::default().fg(Theme::JSON_KEY)
                } else {
                    Style::default().fg(Theme::JSON_STRING)
                };
                spans.push(Span::styled(s, style));
            }
            _ => {
                let mut word = String::from(c);
                while let Some(next) = chars.next_if(|n| !matches!(n, ',' | ']' | '}' | ' ' | ':')) {
                    word.push(next);
                }
                let style = match word.as_str() {
                    "true" | "false" => Style::default().fg(Theme::JSON_BOOL),
                    "null" => Style::default().fg(Theme::JSON_NULL),
                    w if w.parse::<f64>().is_ok() => Style::default().fg(Theme::JSON_NUMBER),
                    _ => punct_style,
                };
                spans.push(Span::styled(word, style));
            }
        }
    }

    Line::from(spans)
}

/// Read a string literal whose opening quote was consumed, quotes included
fn read_string(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut s = String::from("\"");
    while let Some(c) = chars.next() {
        s.push(c);
        match c {
            '"' => break,
            '\\' => {
                if let Some(escaped) = chars.next() {
                    s.push(escaped);
                }
            }
            _ => {}
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn styled(line: &Line) -> Vec<(String, Style)> {
        line.spans
            .iter()
            .filter(|s| !s.content.trim().is_empty())
            .map(|s| (s.content.to_string(), s.style))
            .collect()
    }

    #[test]
    fn test_pretty_print_lines() {
        let lines = json_lines(&json!({ "msg": "hi", "level": 30 }));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].to_string(), "{");
    }

    #[test]
    fn test_tokens_are_colored() {
        let line = colorize_json_line(r#"  "msg": "a \"quoted\": b","#);
        let spans = styled(&line);
        assert_eq!(spans[0], ("\"msg\"".to_string(), Style::default().fg(Theme::JSON_KEY)));
        assert_eq!(
            spans[2],
            ("\"a \\\"quoted\\\": b\"".to_string(), Style::default().fg(Theme::JSON_STRING))
        );

        let line = colorize_json_line(r#"  "n": -1.5e3,"#);
        assert_eq!(styled(&line)[2].1, Style::default().fg(Theme::JSON_NUMBER));

        let line = colorize_json_line(r#"  "ok": true"#);
        assert_eq!(styled(&line)[2].1, Style::default().fg(Theme::JSON_BOOL));

        let line = colorize_json_line(r#"  "x": null"#);
        assert_eq!(styled(&line)[2].1, Style::default().fg(Theme::JSON_NULL));
    }
}
