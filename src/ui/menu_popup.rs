use crate::menu::{MenuAction, MenuCursor};
use crate::ui::layout::popup_below;
use crate::ui::theme::Palette;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

const MENU_WIDTH: u16 = 24;

/// Screen rect of a menu with `entries` actions opened from `panel_area`.
pub fn menu_area(panel_area: Rect, entries: usize, bounds: Rect) -> Rect {
    popup_below(panel_area, MENU_WIDTH, entries as u16 + 2, bounds)
}

/// Index of the entry under (`column`, `row`) in a menu drawn at `area`.
pub fn entry_at(area: Rect, entries: usize, column: u16, row: u16) -> Option<usize> {
    let inside_x = column > area.x && column < area.x + area.width.saturating_sub(1);
    if !inside_x || row <= area.y {
        return None;
    }
    let index = (row - area.y - 1) as usize;
    (index < entries).then_some(index)
}

pub fn draw_panel_menu(
    f: &mut Frame,
    area: Rect,
    actions: &[MenuAction],
    cursor: MenuCursor,
    palette: &Palette,
) {
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let style = if i == cursor.selected {
                palette.selected()
            } else {
                palette.text()
            };
            ListItem::new(Line::from(Span::styled(action.label(), style)))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(cursor.selected));
    let list = List::new(items).highlight_symbol("> ").block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Panel ")
            .border_style(palette.border(true)),
    );
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_hit_testing() {
        let area = Rect::new(10, 5, 24, 5);
        assert_eq!(entry_at(area, 3, 12, 6), Some(0));
        assert_eq!(entry_at(area, 3, 12, 8), Some(2));
        // Borders and rows past the last entry.
        assert_eq!(entry_at(area, 3, 12, 5), None);
        assert_eq!(entry_at(area, 3, 12, 9), None);
        assert_eq!(entry_at(area, 3, 10, 6), None);
    }
}
