use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Width of the filters panel
const FILTERS_WIDTH: u16 = 32;

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Title bar, toolbar, content and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Length(3), // Toolbar
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2], chunks[3])
    }

    /// Split the content into optional filters panel, table and optional
    /// details panel
    pub fn content(area: Rect, filters: bool, details: bool) -> (Option<Rect>, Rect, Option<Rect>) {
        let mut constraints = Vec::with_capacity(3);
        if filters {
            constraints.push(Constraint::Length(FILTERS_WIDTH.min(area.width / 2)));
        }
        constraints.push(Constraint::Min(10));
        if details {
            constraints.push(Constraint::Percentage(40));
        }

        let chunks = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        let mut index = 0;
        let filters_area = filters.then(|| {
            index += 1;
            chunks[0]
        });
        let table_area = chunks[index];
        let details_area = details.then(|| chunks[index + 1]);

        (filters_area, table_area, details_area)
    }

    /// Centered popup of at most the given size
    pub fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}
