use crate::app::App;
use crate::layout::DragHandle;
use crate::models::PanelId;
use crate::ui::chat_panel::draw_chat_panel;
use crate::ui::code_panel::draw_code_panel;
use crate::ui::layout::{calculate_page_chunks, help_line};
use crate::ui::menu_popup::{draw_panel_menu, menu_area};
use crate::ui::theme::Palette;
use crate::ui::video_panel::draw_video_panel;
use ratatui::{
    layout::Alignment,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn panel_title(panel: PanelId, menu_open: bool) -> String {
    let key = match panel {
        PanelId::Chat => "F1",
        PanelId::Compiler => "F2",
        PanelId::Video => "F3",
    };
    let marker = if menu_open { "▴" } else { "▾" };
    format!(" [{}] {} {} ", key, panel.title(), marker)
}

pub fn draw_workspace(f: &mut Frame, app: &mut App) {
    let palette = Palette::for_theme(app.theme);
    let page = calculate_page_chunks(f.area());

    let heading = match &app.workspace_question {
        Some(q) => format!("#{} {} ({})", q.id, q.title, q.difficulty),
        None => "Workspace".to_string(),
    };
    let mut header_spans = vec![Span::styled(heading, palette.heading())];
    if app.illustration.is_rendering_bound() {
        header_spans.push(Span::styled(
            "  rendering illustration...",
            palette.muted().add_modifier(Modifier::ITALIC),
        ));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false)),
        );
    f.render_widget(header, page.header_area);

    let root = page.body_area;
    let areas = app.layout.compute_areas(root);
    app.last_root = root;
    app.last_areas = Some(areas);

    let active_menu = app.layout.active_menu();
    for panel in PanelId::ALL {
        let rect = app.layout.panel_area(&areas, panel);
        let focused = app.layout.is_focused(panel);
        let title = panel_title(panel, active_menu == Some(panel));
        match panel {
            PanelId::Chat => draw_chat_panel(f, rect, &mut app.chat, &title, focused, &palette),
            PanelId::Compiler => {
                draw_code_panel(f, rect, &app.code_run, &title, focused, &palette)
            }
            PanelId::Video => draw_video_panel(
                f,
                rect,
                &app.illustration.video,
                app.illustration.is_rendering_bound(),
                &title,
                focused,
                &palette,
            ),
        }
    }

    if let Some(handle) = app.layout.dragging_handle() {
        let rect = match handle {
            DragHandle::Main => areas.main_handle,
            DragHandle::Secondary => areas.secondary_handle,
        };
        f.buffer_mut().set_style(rect.intersection(root), palette.selected());
    }

    app.last_menu_area = None;
    if let Some(panel) = active_menu {
        let actions = app.layout.menu_actions(panel);
        let anchor = app.layout.panel_area(&areas, panel);
        let area = menu_area(anchor, actions.len(), f.area());
        draw_panel_menu(f, area, &actions, app.menu_cursor, &palette);
        app.last_menu_area = Some(area);
    }

    let help = Paragraph::new(help_line(
        &palette,
        &[
            ("Tab", "Focus"),
            ("F10", "Menu"),
            ("^O", "Orientation"),
            ("^S", "Swap"),
            ("^Arrows", "Resize"),
            ("^R", "Run"),
            ("^G", "Illustrate"),
            ("Esc", "Back"),
        ],
    ))
    .alignment(Alignment::Center);
    f.render_widget(help, page.help_area);
}
