use crate::layout::LayoutState;
use crate::models::PanelId;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    MakeMain,
    ToggleOrientation,
    SwapPanels,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::MakeMain => "Make main panel",
            MenuAction::ToggleOrientation => "Toggle orientation",
            MenuAction::SwapPanels => "Swap panels",
        }
    }
}

impl LayoutState {
    /// Open `panel`'s menu. Any other open menu is closed.
    pub fn open_menu(&mut self, panel: PanelId) {
        self.active_menu = Some(panel);
        debug!(target: "layout", ?panel, "Menu opened");
    }

    pub fn toggle_menu(&mut self, panel: PanelId) {
        if self.active_menu == Some(panel) {
            self.close_menu();
        } else {
            self.open_menu(panel);
        }
    }

    pub fn close_menu(&mut self) {
        self.active_menu = None;
    }

    pub fn menu_actions(&self, panel: PanelId) -> Vec<MenuAction> {
        let focused = self.is_focused(panel);
        let mut actions = Vec::with_capacity(3);
        if !focused {
            actions.push(MenuAction::MakeMain);
        }
        actions.push(MenuAction::ToggleOrientation);
        if !focused {
            actions.push(MenuAction::SwapPanels);
        }
        actions
    }

    /// Run `action` from `panel`'s menu and close the menu.
    /// Actions the menu does not offer for `panel` are refused.
    pub fn apply_menu_action(&mut self, panel: PanelId, action: MenuAction) -> bool {
        if !self.menu_actions(panel).contains(&action) {
            return false;
        }
        match action {
            MenuAction::MakeMain => self.focus(panel),
            MenuAction::ToggleOrientation => self.toggle_orientation(),
            MenuAction::SwapPanels => self.swap_secondary(),
        }
        self.close_menu();
        true
    }
}

/// Highlighted entry of the open menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuCursor {
    pub selected: usize,
}

impl MenuCursor {
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn current(&self, actions: &[MenuAction]) -> Option<MenuAction> {
        actions.get(self.selected).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;

    #[test]
    fn test_focused_panel_only_offers_orientation() {
        let layout = LayoutState::default();
        assert_eq!(
            layout.menu_actions(PanelId::Chat),
            vec![MenuAction::ToggleOrientation]
        );
        assert_eq!(
            layout.menu_actions(PanelId::Video),
            vec![
                MenuAction::MakeMain,
                MenuAction::ToggleOrientation,
                MenuAction::SwapPanels
            ]
        );
    }

    #[test]
    fn test_only_one_menu_open() {
        let mut layout = LayoutState::default();
        layout.open_menu(PanelId::Chat);
        layout.open_menu(PanelId::Video);
        assert_eq!(layout.active_menu(), Some(PanelId::Video));
        layout.toggle_menu(PanelId::Video);
        assert_eq!(layout.active_menu(), None);
    }

    #[test]
    fn test_make_main_focuses_and_closes() {
        let mut layout = LayoutState::default();
        layout.open_menu(PanelId::Compiler);
        assert!(layout.apply_menu_action(PanelId::Compiler, MenuAction::MakeMain));
        assert_eq!(layout.focused_panel_id(), PanelId::Compiler);
        assert_eq!(layout.active_menu(), None);
    }

    #[test]
    fn test_swap_from_secondary_panel() {
        let mut layout = LayoutState::default();
        layout.open_menu(PanelId::Video);
        assert!(layout.apply_menu_action(PanelId::Video, MenuAction::SwapPanels));
        assert_eq!(layout.secondary_order(), [PanelId::Video, PanelId::Compiler]);
        assert_eq!(layout.active_menu(), None);
    }

    #[test]
    fn test_focused_panel_cannot_swap_or_promote() {
        let mut layout = LayoutState::default();
        layout.open_menu(PanelId::Chat);
        assert!(!layout.apply_menu_action(PanelId::Chat, MenuAction::SwapPanels));
        assert!(!layout.apply_menu_action(PanelId::Chat, MenuAction::MakeMain));
        assert_eq!(layout.secondary_order(), [PanelId::Compiler, PanelId::Video]);
        assert_eq!(layout.active_menu(), Some(PanelId::Chat));

        assert!(layout.apply_menu_action(PanelId::Chat, MenuAction::ToggleOrientation));
        assert_eq!(layout.secondary_orientation(), Orientation::Horizontal);
        assert_eq!(layout.active_menu(), None);
    }

    #[test]
    fn test_menu_cursor_bounds() {
        let actions = [
            MenuAction::MakeMain,
            MenuAction::ToggleOrientation,
            MenuAction::SwapPanels,
        ];
        let mut cursor = MenuCursor::default();
        cursor.move_up();
        assert_eq!(cursor.selected, 0);
        for _ in 0..5 {
            cursor.move_down(actions.len());
        }
        assert_eq!(cursor.current(&actions), Some(MenuAction::SwapPanels));
        cursor.reset();
        assert_eq!(cursor.current(&actions), Some(MenuAction::MakeMain));
    }
}
