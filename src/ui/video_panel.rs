use crate::illustration::VideoPanel;
use crate::ui::theme::Palette;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_video_panel(
    f: &mut Frame,
    area: Rect,
    video: &VideoPanel,
    generating: bool,
    title: &str,
    focused: bool,
    palette: &Palette,
) {
    let mut lines = Vec::new();
    if generating {
        lines.push(Line::from(Span::styled(
            "Rendering illustration, this can take a few minutes...",
            palette.muted().fg(palette.warning).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(""));
    }

    match &video.video_url {
        Some(url) => {
            if let Some(question) = &video.question {
                lines.push(Line::from(Span::styled(question.clone(), palette.heading())));
            }
            lines.push(Line::from(vec![
                Span::styled("Video: ", palette.heading()),
                Span::styled(
                    url.clone(),
                    palette.text().add_modifier(Modifier::UNDERLINED),
                ),
            ]));
            if let Some(key) = &video.storage_key {
                lines.push(Line::from(Span::styled(format!("Stored as {}", key), palette.muted())));
            }
        }
        None if !generating => {
            lines.push(Line::from(Span::styled("No illustration yet", palette.muted())));
            lines.push(Line::from(Span::styled(
                "Ctrl+G or Enter to generate one for this question",
                palette.muted(),
            )));
        }
        None => {}
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .style(palette.text())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(palette.border(focused)),
        );
    f.render_widget(paragraph, area);
}
