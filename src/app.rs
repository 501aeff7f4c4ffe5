use crate::chat::ChatSession;
use crate::code_run::CodeRunPanel;
use crate::config::WorkspaceConfig;
use crate::db::prefs::PrefsStore;
use crate::grouping::{group_questions, GroupedQuestions};
use crate::illustration::IllustrationFlow;
use crate::layout::{handle_at, LayoutState, PanelAreas, RESIZE_STEP};
use crate::menu::MenuCursor;
use crate::models::{AppState, BackendRequest, BackendResponse, ChatPurpose, PanelId, Question, Theme};
use crate::search::QuestionSearch;
use crate::ui::menu_popup::entry_at;
use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tracing::{debug, error, info, warn};

/// The list page: fetched questions, their grouping, and the selection.
#[derive(Debug, Default)]
pub struct QuestionListState {
    pub questions: Vec<Question>,
    pub grouped: GroupedQuestions,
    /// Index into `grouped.questions()`.
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub search: QuestionSearch,
}

impl QuestionListState {
    /// Replace the questions, keeping the selection on the same id when it survives.
    pub fn set_questions(&mut self, questions: Vec<Question>) {
        let previous = self.selected_question().map(|q| q.id);
        self.grouped = group_questions(&questions);
        self.questions = questions;
        if !previous.is_some_and(|id| self.select_id(id)) {
            self.selected = 0;
        }
    }

    /// Move the selection to question `id`. False when it is not listed.
    pub fn select_id(&mut self, id: i64) -> bool {
        match self.grouped.questions().position(|q| q.id == id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn selected_question(&self) -> Option<&Question> {
        self.grouped.questions().nth(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.grouped.question_count() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub struct App {
    pub state: AppState,
    pub theme: Theme,
    pub list: QuestionListState,
    pub workspace_question: Option<Question>,
    pub layout: LayoutState,
    pub menu_cursor: MenuCursor,
    pub chat: ChatSession,
    pub illustration: IllustrationFlow,
    pub code_run: CodeRunPanel,
    pub should_quit: bool,
    /// Geometry of the last drawn workspace frame, for mouse hit-testing.
    pub last_root: Rect,
    pub last_areas: Option<PanelAreas>,
    pub last_menu_area: Option<Rect>,
    config: WorkspaceConfig,
    prefs: Option<PrefsStore>,
    user_id: String,
    backend_tx: Option<Sender<BackendRequest>>,
    response_rx: Option<Receiver<BackendResponse>>,
}

impl App {
    pub fn new(
        config: WorkspaceConfig,
        prefs: Option<PrefsStore>,
        backend_tx: Option<Sender<BackendRequest>>,
        response_rx: Option<Receiver<BackendResponse>>,
    ) -> Self {
        let user_id = match prefs.as_ref().map(PrefsStore::user_id) {
            Some(Ok(id)) => id,
            Some(Err(e)) => {
                warn!(error = %e, "Could not load session id, using a temporary one");
                uuid::Uuid::new_v4().to_string()
            }
            None => uuid::Uuid::new_v4().to_string(),
        };
        let theme = match prefs.as_ref().map(PrefsStore::theme) {
            Some(Ok(theme)) => theme,
            Some(Err(e)) => {
                warn!(error = %e, "Could not load theme preference");
                Theme::default()
            }
            None => Theme::default(),
        };

        let chat = ChatSession::new(
            user_id.clone(),
            None,
            config.toolkits.clone(),
            config.model.clone(),
            backend_tx.clone(),
        );
        let code_run = CodeRunPanel::new(
            user_id.clone(),
            config.toolkits.clone(),
            config.model.clone(),
            backend_tx.clone(),
        );

        Self {
            state: AppState::QuestionList,
            theme,
            list: QuestionListState::default(),
            workspace_question: None,
            layout: LayoutState::default(),
            menu_cursor: MenuCursor::default(),
            chat,
            illustration: IllustrationFlow::new(backend_tx.clone()),
            code_run,
            should_quit: false,
            last_root: Rect::default(),
            last_areas: None,
            last_menu_area: None,
            config,
            prefs,
            user_id,
            backend_tx,
            response_rx,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Ask the worker for the question list. No-op while a fetch is running.
    pub fn request_questions(&mut self) -> bool {
        if self.list.loading {
            return false;
        }
        self.list.loading = true;
        self.list.error = None;
        let dispatched = self
            .backend_tx
            .as_ref()
            .is_some_and(|tx| tx.send(BackendRequest::FetchQuestions).is_ok());
        if !dispatched {
            self.apply_response(BackendResponse::Questions(Err(
                crate::api::ApiError::WorkerGone,
            )));
        }
        true
    }

    /// Drain every response the worker has produced so far.
    pub fn poll_responses(&mut self) {
        let pending: Vec<BackendResponse> = match &self.response_rx {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        for response in pending {
            self.apply_response(response);
        }
    }

    pub fn apply_response(&mut self, response: BackendResponse) {
        match response {
            BackendResponse::Questions(result) => {
                self.list.loading = false;
                match result {
                    Ok(questions) => {
                        info!(count = questions.len(), "Questions loaded");
                        self.list.error = None;
                        self.list.set_questions(questions);
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to load questions");
                        self.list.error = Some(e.to_string());
                    }
                }
            }
            BackendResponse::Chat {
                request_id,
                purpose: ChatPurpose::Conversation,
                result,
            } => self.chat.apply_reply(request_id, result),
            BackendResponse::Chat {
                request_id,
                purpose: ChatPurpose::CodeRun,
                result,
            } => self.code_run.apply_tool_result(request_id, result),
            BackendResponse::Illustration { request_id, result } => self.illustration.apply_result(
                request_id,
                result,
                &mut self.chat,
                Some(&mut self.layout),
            ),
            BackendResponse::CompileRun { run_id, result } => {
                self.code_run.apply_compile_result(run_id, result)
            }
            BackendResponse::Search { request_id, result } => {
                self.apply_search_result(request_id, result)
            }
        }
    }

    fn apply_search_result(
        &mut self,
        request_id: u64,
        result: Result<crate::api::SearchResponse, crate::api::ApiError>,
    ) {
        let Some(best) = self.list.search.apply_result(request_id, result) else {
            return;
        };
        if self.list.select_id(best.id) {
            info!(question_id = best.id, "Search jumped to question");
            self.list.search.close();
        } else {
            self.list.search.error = Some(format!(
                "Best match #{} {} is not in the loaded list",
                best.id, best.question
            ));
        }
    }

    /// Enter the workspace for the selected question with fresh chat and code
    /// panels. The illustration flow is only rebound so a running render keeps
    /// its slot.
    pub fn open_workspace(&mut self) -> bool {
        let Some(question) = self.list.selected_question().cloned() else {
            return false;
        };
        info!(question_id = question.id, "Opening workspace");

        self.chat = ChatSession::new(
            self.user_id.clone(),
            Some(question.id),
            self.config.toolkits.clone(),
            self.config.model.clone(),
            self.backend_tx.clone(),
        );
        self.illustration.bind(question.id);
        self.code_run = CodeRunPanel::new(
            self.user_id.clone(),
            self.config.toolkits.clone(),
            self.config.model.clone(),
            self.backend_tx.clone(),
        );
        self.layout.close_menu();
        self.layout.end_drag();
        self.menu_cursor.reset();
        self.workspace_question = Some(question);
        self.state = AppState::Workspace;
        true
    }

    pub fn back_to_list(&mut self) {
        self.layout.close_menu();
        self.layout.end_drag();
        self.last_areas = None;
        self.last_menu_area = None;
        self.state = AppState::QuestionList;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        // Cached transcript lines carry the old palette.
        self.chat.cached_message_count = 0;
        if let Some(prefs) = &self.prefs {
            if let Err(e) = prefs.set_theme(self.theme) {
                warn!(error = %e, "Could not persist theme");
            }
        }
        debug!(theme = self.theme.as_str(), "Theme toggled");
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            // A release outside the window never arrives; losing focus ends the drag.
            Event::FocusLost => {
                self.layout.end_drag();
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.state {
            AppState::QuestionList => self.handle_list_key(key),
            AppState::Workspace => self.handle_workspace_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if self.list.search.active {
            self.handle_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Up => self.list.select_previous(),
            KeyCode::Down => self.list.select_next(),
            KeyCode::Enter => {
                self.open_workspace();
            }
            KeyCode::Char('r') => {
                self.request_questions();
            }
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('/') => self.list.search.open(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.list.search.submit(self.backend_tx.as_ref());
            }
            KeyCode::Esc => self.list.search.close(),
            KeyCode::Up => self.list.select_previous(),
            KeyCode::Down => self.list.select_next(),
            _ => {
                self.list.search.input.handle_key(key, false);
            }
        }
    }

    fn handle_menu_key(&mut self, panel: PanelId, key: KeyEvent) {
        let actions = self.layout.menu_actions(panel);
        match key.code {
            KeyCode::Up => self.menu_cursor.move_up(),
            KeyCode::Down => self.menu_cursor.move_down(actions.len()),
            KeyCode::Enter => {
                if let Some(action) = self.menu_cursor.current(&actions) {
                    self.layout.apply_menu_action(panel, action);
                }
                self.menu_cursor.reset();
            }
            KeyCode::Esc | KeyCode::F(10) => self.layout.close_menu(),
            _ => {}
        }
    }

    fn open_menu(&mut self, panel: PanelId) {
        self.layout.toggle_menu(panel);
        self.menu_cursor.reset();
    }

    fn handle_workspace_key(&mut self, key: KeyEvent) {
        if let Some(panel) = self.layout.active_menu() {
            self.handle_menu_key(panel, key);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('o') => self.layout.toggle_orientation(),
                KeyCode::Char('s') => self.layout.swap_secondary(),
                KeyCode::Left => {
                    self.layout.nudge_main(-RESIZE_STEP);
                }
                KeyCode::Right => {
                    self.layout.nudge_main(RESIZE_STEP);
                }
                KeyCode::Up => {
                    self.layout.nudge_secondary(-RESIZE_STEP);
                }
                KeyCode::Down => {
                    self.layout.nudge_secondary(RESIZE_STEP);
                }
                KeyCode::Char('g') => self.generate_illustration(),
                KeyCode::Char('r') => {
                    self.code_run.run();
                }
                _ => {}
            }
            return;
        }

        let focused = self.layout.focused_panel_id();
        match key.code {
            KeyCode::Tab if focused != PanelId::Compiler => self.layout.cycle(),
            KeyCode::BackTab => self.layout.cycle(),
            KeyCode::F(1) => self.layout.focus(PanelId::Chat),
            KeyCode::F(2) => self.layout.focus(PanelId::Compiler),
            KeyCode::F(3) => self.layout.focus(PanelId::Video),
            KeyCode::F(10) => self.open_menu(focused),
            KeyCode::Esc => self.back_to_list(),
            _ => self.route_to_panel(focused, key),
        }
    }

    fn generate_illustration(&mut self) {
        self.illustration.generate(&mut self.chat);
    }

    fn route_to_panel(&mut self, panel: PanelId, key: KeyEvent) {
        match panel {
            PanelId::Chat => match key.code {
                KeyCode::Enter => {
                    self.chat.send();
                }
                KeyCode::Up | KeyCode::PageUp => self.chat.scroll_up(),
                KeyCode::Down | KeyCode::PageDown => self.chat.scroll_down(),
                _ => {
                    self.chat.input.handle_key(key, false);
                }
            },
            PanelId::Compiler => match key.code {
                KeyCode::PageUp => self.code_run.scroll_up(),
                KeyCode::PageDown => self.code_run.scroll_down(),
                _ => {
                    self.code_run.editor.handle_key(key, true);
                }
            },
            PanelId::Video => {
                if key.code == KeyCode::Enter {
                    self.generate_illustration();
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        if self.state == AppState::QuestionList {
            match mouse.kind {
                MouseEventKind::ScrollUp => self.list.select_previous(),
                MouseEventKind::ScrollDown => self.list.select_next(),
                _ => {}
            }
            return;
        }
        let Some(areas) = self.last_areas else {
            return;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(&areas, column, row),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.layout
                    .drag_move(column, row, self.last_root, areas.secondary_region);
            }
            MouseEventKind::Up(_) => {
                self.layout.end_drag();
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let up = mouse.kind == MouseEventKind::ScrollUp;
                match self.layout.panel_at(&areas, column, row) {
                    Some(PanelId::Chat) if up => self.chat.scroll_up(),
                    Some(PanelId::Chat) => self.chat.scroll_down(),
                    Some(PanelId::Compiler) if up => self.code_run.scroll_up(),
                    Some(PanelId::Compiler) => self.code_run.scroll_down(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn mouse_down(&mut self, areas: &PanelAreas, column: u16, row: u16) {
        if let Some(panel) = self.layout.active_menu() {
            if let Some(menu) = self.last_menu_area {
                if menu.contains(Position::new(column, row)) {
                    let actions = self.layout.menu_actions(panel);
                    if let Some(index) = entry_at(menu, actions.len(), column, row) {
                        self.layout.apply_menu_action(panel, actions[index]);
                        self.menu_cursor.reset();
                    }
                    return;
                }
            }
            self.layout.close_menu();
        }

        if let Some(handle) = handle_at(areas, column, row) {
            self.layout.begin_drag(handle);
            return;
        }

        if let Some(panel) = self.layout.panel_at(areas, column, row) {
            if row == self.layout.panel_area(areas, panel).y {
                self.open_menu(panel);
            }
        }
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame) {
        crate::ui::draw(f, self);
    }
}
