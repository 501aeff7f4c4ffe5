use crate::code_run::{CodeRunPanel, RunStage};
use crate::ui::theme::Palette;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// (row, column) of the editor cursor, counting display cells.
fn editor_cursor(panel: &CodeRunPanel) -> (usize, usize) {
    let before = &panel.editor.text()[..panel.editor.cursor_byte()];
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (row, before[line_start..].width())
}

fn output_text(panel: &CodeRunPanel, palette: &Palette) -> Text<'static> {
    let mut lines = Vec::new();
    match panel.stage() {
        Some(RunStage::CompileService { .. }) => lines.push(Line::from(Span::styled(
            "Compiling and running...",
            palette.muted().fg(palette.warning).add_modifier(Modifier::ITALIC),
        ))),
        Some(RunStage::ToolChat { .. }) => lines.push(Line::from(Span::styled(
            "Compiler unavailable, running through the code tool...",
            palette.muted().fg(palette.warning).add_modifier(Modifier::ITALIC),
        ))),
        None => {}
    }

    if let Some(stdout) = panel.output.stdout.as_deref().filter(|s| !s.is_empty()) {
        lines.push(Line::from(Span::styled("stdout:", palette.heading())));
        lines.extend(stdout.lines().map(|l| Line::from(l.to_string())));
    }
    if let Some(stderr) = panel.output.stderr.as_deref().filter(|s| !s.is_empty()) {
        lines.push(Line::from(Span::styled("stderr:", palette.heading().fg(palette.error))));
        lines.extend(
            stderr
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), palette.error()))),
        );
    }
    if let Some(error) = &panel.error {
        lines.push(Line::from(Span::styled(format!("Error: {}", error), palette.error())));
    }
    if panel.used_fallback && !panel.is_in_flight() {
        lines.push(Line::from(Span::styled("(ran via code tool)", palette.muted())));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("Ctrl+R to run", palette.muted())));
    }
    Text::from(lines)
}

pub fn draw_code_panel(
    f: &mut Frame,
    area: Rect,
    panel: &CodeRunPanel,
    title: &str,
    focused: bool,
    palette: &Palette,
) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(palette.border(focused));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    let editor_area = chunks[0];
    let (row, col) = editor_cursor(panel);
    let visible = editor_area.height as usize;
    let scroll_rows = (row + 1).saturating_sub(visible);
    let scroll_cols = (col + 1).saturating_sub(editor_area.width as usize);

    let editor = Paragraph::new(panel.editor.text().to_string())
        .style(palette.text().fg(palette.code))
        .scroll((scroll_rows as u16, scroll_cols as u16));
    f.render_widget(editor, editor_area);

    if focused {
        f.set_cursor_position((
            editor_area.x + (col - scroll_cols) as u16,
            editor_area.y + (row - scroll_rows) as u16,
        ));
    }

    let output = Paragraph::new(output_text(panel, palette))
        .style(palette.text())
        .wrap(Wrap { trim: false })
        .scroll((panel.scroll_y, 0))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(" Output ")
                .border_style(palette.border(false)),
        );
    f.render_widget(output, chunks[1]);
}
