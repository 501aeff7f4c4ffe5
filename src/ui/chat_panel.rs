use crate::chat::ChatSession;
use crate::models::Sender;
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Palette;
use crate::utils::{
    calculate_max_scroll, calculate_wrapped_cursor_position, estimate_text_height,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rebuild the rendered transcript. Markdown parsing is the expensive part,
/// so this only runs when the message count changes.
pub fn rebuild_chat_cache(chat: &mut ChatSession, palette: &Palette) {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in &chat.messages {
        match msg.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    palette.heading().fg(palette.user),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(format!("  {}", line)));
                }
            }
            Sender::Bot => {
                lines.push(Line::from(Span::styled(
                    "Tutor:",
                    palette.heading().fg(palette.bot),
                )));
                for line in render_markdown(&msg.text, palette) {
                    let mut indented: Vec<Span<'static>> = vec![Span::from("  ")];
                    indented.extend(line.spans);
                    lines.push(Line::from(indented));
                }
            }
        }
        lines.push(Line::from(""));
    }

    chat.rendered_lines_cache = lines;
    chat.cached_message_count = chat.messages.len();
}

pub fn draw_chat_panel(
    f: &mut Frame,
    area: Rect,
    chat: &mut ChatSession,
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
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    if chat.cached_message_count != chat.messages.len() {
        rebuild_chat_cache(chat, palette);
    }
    let mut message_lines = chat.rendered_lines_cache.clone();

    if chat.is_in_flight() {
        message_lines.push(Line::from(Span::styled(
            "Thinking...",
            palette.muted().fg(palette.warning).add_modifier(Modifier::ITALIC),
        )));
    }
    if let Some(err) = &chat.error {
        message_lines.push(Line::from(Span::styled(
            format!("Error: {}", err),
            palette.error(),
        )));
    }

    let visible_height = chunks[0].height as usize;
    let text_width = chunks[0].width as usize;
    let content = Text::from(message_lines);
    let content_height = estimate_text_height(&content, text_width);
    let max_scroll = calculate_max_scroll(content_height, visible_height);
    chat.max_scroll = max_scroll;

    let scroll = if chat.is_in_flight() {
        max_scroll
    } else {
        chat.scroll_y.min(max_scroll)
    };
    chat.scroll_y = scroll;

    let messages = Paragraph::new(content)
        .style(palette.text())
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(messages, chunks[0]);

    let input_text = if chat.input.text().is_empty() {
        Text::from(Span::styled("Ask about this problem...", palette.muted()))
    } else {
        Text::from(chat.input.text().to_string())
    };
    // One visible row: keep the cursor's wrapped line in view.
    let input_width = chunks[1].width.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) =
        calculate_wrapped_cursor_position(chat.input.text(), chat.input.cursor(), input_width);
    let input_border = if chat.is_in_flight() {
        palette.muted()
    } else {
        palette.border(focused)
    };
    let input = Paragraph::new(input_text)
        .style(palette.text())
        .wrap(Wrap { trim: true })
        .scroll((cursor_line as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Message ")
                .border_style(input_border),
        );
    f.render_widget(input, chunks[1]);

    if focused {
        f.set_cursor_position((chunks[1].x + 1 + cursor_col as u16, chunks[1].y + 1));
    }
}
