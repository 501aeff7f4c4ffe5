use crate::app::QuestionListState;
use crate::grouping::GroupRow;
use crate::models::Difficulty;
use crate::ui::layout::{calculate_list_columns, calculate_page_chunks, help_line};
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Palette;
use crate::utils::truncate_string;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

pub fn draw_question_list(f: &mut Frame, list: &QuestionListState, palette: &Palette) {
    let page = calculate_page_chunks(f.area());

    let header_width = page.header_area.width.saturating_sub(2) as usize;
    let search = &list.search;
    let header_line = if search.active {
        let mut spans = vec![
            Span::styled("Search: ", palette.heading()),
            Span::styled(search.input.text().to_string(), palette.text()),
        ];
        if search.is_in_flight() {
            spans.push(Span::styled(
                "  searching...",
                palette.muted().add_modifier(Modifier::ITALIC),
            ));
        } else if let Some(error) = &search.error {
            spans.push(Span::styled(format!("  {}", error), palette.error()));
        }
        Line::from(spans)
    } else if !search.alternatives.is_empty() {
        let others: Vec<String> = search
            .alternatives
            .iter()
            .map(|q| format!("#{} {}", q.id, q.question))
            .collect();
        Line::from(vec![
            Span::styled("Also close: ", palette.heading()),
            Span::styled(
                truncate_string(&others.join(", "), header_width.saturating_sub(12)),
                palette.muted(),
            ),
        ])
    } else {
        Line::from(Span::styled(
            format!("DSA Workspace - {} questions", list.grouped.question_count()),
            palette.heading(),
        ))
    };
    let alignment = if search.active {
        Alignment::Left
    } else {
        Alignment::Center
    };
    let header = Paragraph::new(header_line).alignment(alignment).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(search.active)),
    );
    f.render_widget(header, page.header_area);
    if search.active {
        let column = "Search: ".len() + search.input.cursor();
        f.set_cursor_position((
            page.header_area.x + 1 + column.min(header_width) as u16,
            page.header_area.y + 1,
        ));
    }

    let (tree_area, preview_area) = calculate_list_columns(page.body_area);
    let tree_block = Block::default()
        .borders(Borders::ALL)
        .title(" Questions ")
        .border_style(palette.border(true));

    if list.loading && list.questions.is_empty() {
        let loading = Paragraph::new(Span::styled(
            "Loading questions...",
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::ITALIC),
        ))
        .block(tree_block);
        f.render_widget(loading, tree_area);
    } else if let Some(error) = &list.error {
        let text = Text::from(vec![
            Line::from(Span::styled(format!("Error: {}", error), palette.error())),
            Line::from(""),
            Line::from(Span::styled("Press r to retry", palette.muted())),
        ]);
        f.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: true }).block(tree_block),
            tree_area,
        );
    } else if list.grouped.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No questions found",
            palette.muted().add_modifier(Modifier::ITALIC),
        ))
        .block(tree_block);
        f.render_widget(empty, tree_area);
    } else {
        let text_width = tree_area.width.saturating_sub(8) as usize;
        let mut question_index = 0;
        let mut selected_row = None;
        let items: Vec<ListItem> = list
            .grouped
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row, entry)| match entry {
                GroupRow::Topic(topic) => ListItem::new(Line::from(Span::styled(
                    topic.to_string(),
                    palette.heading(),
                ))),
                GroupRow::Difficulty(difficulty) => ListItem::new(Line::from(Span::styled(
                    format!("  {}", difficulty.label()),
                    Style::default()
                        .fg(difficulty_color(difficulty))
                        .add_modifier(Modifier::BOLD),
                ))),
                GroupRow::Question(question) => {
                    let is_selected = question_index == list.selected;
                    if is_selected {
                        selected_row = Some(row);
                    }
                    question_index += 1;
                    let style = if is_selected {
                        palette.selected()
                    } else {
                        palette.text()
                    };
                    let marker = if is_selected { "  > " } else { "    " };
                    let label = if question.question.is_empty() {
                        format!("#{}", question.id)
                    } else {
                        format!("#{} {}", question.id, question.question)
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, style),
                        Span::styled(truncate_string(&label, text_width), style),
                    ]))
                }
            })
            .collect();

        let mut state = ListState::default().with_selected(selected_row);
        f.render_stateful_widget(List::new(items).block(tree_block), tree_area, &mut state);
    }

    let preview_text = match list.selected_question() {
        Some(question) if !question.markdown.trim().is_empty() => {
            Text::from(render_markdown(&question.markdown, palette))
        }
        Some(question) => Text::from(vec![
            Line::from(Span::styled(question.title.clone(), palette.heading())),
            Line::from(""),
            Line::from(question.question.clone()),
        ]),
        None => Text::from(Span::styled("Select a question", palette.muted())),
    };
    let preview = Paragraph::new(preview_text)
        .style(palette.text())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Preview ")
                .border_style(palette.border(false)),
        );
    f.render_widget(preview, preview_area);

    let keys: &[(&str, &str)] = if search.active {
        &[("Enter", "Search"), ("↑/↓", "Select"), ("Esc", "Cancel")]
    } else {
        &[
            ("↑/↓", "Select"),
            ("Enter", "Open workspace"),
            ("/", "Search"),
            ("r", "Refresh"),
            ("t", "Theme"),
            ("q", "Quit"),
        ]
    };
    let help = Paragraph::new(help_line(palette, keys)).alignment(Alignment::Center);
    f.render_widget(help, page.help_area);
}
