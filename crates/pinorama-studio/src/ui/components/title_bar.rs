use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::app::Connection;
use crate::messages::Messages;
use crate::ui::Theme;

/// Product name on the left, connection status centered, server URL right
pub struct TitleBar<'a> {
    pub connection: &'a Connection,
    pub server_url: &'a str,
    pub messages: &'a Messages,
}

impl TitleBar<'_> {
    fn status(&self) -> (&'static str, Style) {
        let label = match self.connection {
            Connection::Connected => self.messages.connected,
            Connection::Connecting => self.messages.connecting,
            Connection::Disconnected => self.messages.disconnected,
            Connection::Unreachable(_) => self.messages.unreachable,
        };
        (label, Theme::connection(self.connection))
    }
}

impl Widget for TitleBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let logo = Line::from(vec![
            Span::styled(" ◆ ", Theme::title()),
            Span::styled("Pinorama", Theme::title()),
            Span::styled(" Studio", Theme::text_dim()),
        ]);
        buf.set_line(area.x, area.y, &logo, area.width);

        let (label, style) = self.status();
        let status = Line::from(vec![Span::styled("● ", style), Span::styled(label, style)]);
        let status_width = status.width() as u16;
        let status_x = area.x + area.width.saturating_sub(status_width) / 2;
        if status_x > area.x + logo.width() as u16 {
            buf.set_line(status_x, area.y, &status, status_width);
        }

        let url_width = self.server_url.width() as u16;
        let url_x = area.x + area.width.saturating_sub(url_width + 1);
        if url_x > status_x + status_width + 1 {
            buf.set_span(url_x, area.y, &Span::styled(self.server_url, Theme::text_dim()), url_width);
        }
    }
}
