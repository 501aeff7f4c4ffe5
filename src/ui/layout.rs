use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};

use super::theme::Palette;

pub struct PageLayout {
    pub header_area: Rect,
    pub body_area: Rect,
    pub help_area: Rect,
}

/// Header, body, and a one-line key help footer.
pub fn calculate_page_chunks(area: Rect) -> PageLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    PageLayout {
        header_area: chunks[0],
        body_area: chunks[1],
        help_area: chunks[2],
    }
}

/// Left tree and right preview of the question list page.
pub fn calculate_list_columns(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Popup of `width` x `height` anchored just below the top-left corner of
/// `anchor`, shifted back inside `bounds` when it would overflow.
pub fn popup_below(anchor: Rect, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let max_x = bounds.x + bounds.width - width;
    let max_y = bounds.y + bounds.height - height;
    Rect::new(
        (anchor.x + 1).clamp(bounds.x, max_x),
        (anchor.y + 1).clamp(bounds.y, max_y),
        width,
        height,
    )
}

/// "Key Label  Key Label" hint line.
pub fn help_line(palette: &Palette, hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, label) in hints {
        spans.push(Span::styled(key.to_string(), palette.key_hint()));
        spans.push(Span::styled(format!(" {}  ", label), palette.muted()));
    }
    Line::from(spans)
}
