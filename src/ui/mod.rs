pub mod chat_panel;
pub mod code_panel;
pub mod layout;
pub mod markdown;
pub mod menu_popup;
pub mod question_list;
pub mod theme;
pub mod video_panel;
pub mod workspace;

pub use question_list::draw_question_list;
pub use theme::Palette;
pub use workspace::draw_workspace;

use crate::app::App;
use crate::models::AppState;
use ratatui::Frame;

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.state {
        AppState::QuestionList => {
            let palette = Palette::for_theme(app.theme);
            draw_question_list(f, &app.list, &palette);
        }
        AppState::Workspace => draw_workspace(f, app),
    }
}
