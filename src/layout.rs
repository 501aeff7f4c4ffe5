use crate::models::PanelId;
use ratatui::layout::Rect;
use tracing::debug;

/// Open interval for the focused/secondary split, in percent of the width.
pub const MAIN_SPLIT_BOUNDS: (f32, f32) = (25.0, 75.0);
/// Open interval for the split inside the secondary region.
pub const SECONDARY_SPLIT_BOUNDS: (f32, f32) = (15.0, 85.0);

pub const DEFAULT_MAIN_SPLIT: f32 = 60.0;
pub const DEFAULT_SECONDARY_SPLIT: f32 = 50.0;

/// Step used by keyboard resizing.
pub const RESIZE_STEP: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Secondary panels stacked top/bottom.
    Vertical,
    /// Secondary panels side by side.
    Horizontal,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    Main,
    Secondary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub(crate) focused_panel_id: PanelId,
    pub(crate) main_split_percent: f32,
    pub(crate) secondary_split_percent: f32,
    pub(crate) secondary_orientation: Orientation,
    pub(crate) secondary_order: [PanelId; 2],
    pub(crate) active_menu: Option<PanelId>,
    pub(crate) dragging_handle: Option<DragHandle>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(PanelId::Chat)
    }
}

/// Screen rectangles for one frame of the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelAreas {
    pub focused: Rect,
    pub secondary_region: Rect,
    /// Rects for `secondary_order[0]` and `secondary_order[1]`.
    pub secondary: [Rect; 2],
    pub main_handle: Rect,
    pub secondary_handle: Rect,
}

fn in_open_interval(value: f32, (low, high): (f32, f32)) -> bool {
    value > low && value < high
}

/// Position of `pos` along a container that starts at `start` and spans `len` cells.
fn percent_along(pos: u16, start: u16, len: u16) -> Option<f32> {
    if len == 0 {
        return None;
    }
    let offset = i32::from(pos) - i32::from(start);
    Some(offset as f32 / f32::from(len) * 100.0)
}

fn portion(total: u16, percent: f32) -> u16 {
    ((f32::from(total) * percent / 100.0).round() as u16).min(total)
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

impl LayoutState {
    pub fn new(focused: PanelId) -> Self {
        Self {
            focused_panel_id: focused,
            main_split_percent: DEFAULT_MAIN_SPLIT,
            secondary_split_percent: DEFAULT_SECONDARY_SPLIT,
            secondary_orientation: Orientation::Vertical,
            secondary_order: focused.others(),
            active_menu: None,
            dragging_handle: None,
        }
    }

    pub fn focused_panel_id(&self) -> PanelId {
        self.focused_panel_id
    }

    pub fn main_split_percent(&self) -> f32 {
        self.main_split_percent
    }

    pub fn secondary_split_percent(&self) -> f32 {
        self.secondary_split_percent
    }

    pub fn secondary_orientation(&self) -> Orientation {
        self.secondary_orientation
    }

    pub fn secondary_order(&self) -> [PanelId; 2] {
        self.secondary_order
    }

    pub fn active_menu(&self) -> Option<PanelId> {
        self.active_menu
    }

    pub fn dragging_handle(&self) -> Option<DragHandle> {
        self.dragging_handle
    }

    pub fn is_focused(&self, panel: PanelId) -> bool {
        self.focused_panel_id == panel
    }

    /// Move `panel` into the main region. The previously focused panel takes
    /// the secondary slot `panel` vacated, so the untouched panel keeps its slot.
    pub fn focus(&mut self, panel: PanelId) {
        if panel == self.focused_panel_id {
            return;
        }
        let previous = self.focused_panel_id;
        match self.secondary_order.iter().position(|p| *p == panel) {
            Some(slot) => self.secondary_order[slot] = previous,
            None => self.secondary_order = panel.others(),
        }
        self.focused_panel_id = panel;
        debug!(target: "layout", ?panel, order = ?self.secondary_order, "Focus changed");
    }

    pub fn cycle(&mut self) {
        self.focus(self.focused_panel_id.next());
    }

    pub fn toggle_orientation(&mut self) {
        self.secondary_orientation = self.secondary_orientation.flipped();
    }

    pub fn swap_secondary(&mut self) {
        self.secondary_order.swap(0, 1);
    }

    /// Start a splitter drag. Only one drag may be active at a time.
    pub fn begin_drag(&mut self, handle: DragHandle) -> bool {
        if self.dragging_handle.is_some() {
            return false;
        }
        self.dragging_handle = Some(handle);
        debug!(target: "layout", ?handle, "Drag started");
        true
    }

    /// Tear down the drag session, wherever the pointer was released.
    pub fn end_drag(&mut self) -> Option<DragHandle> {
        let ended = self.dragging_handle.take();
        if let Some(handle) = ended {
            debug!(
                target: "layout",
                ?handle,
                main = self.main_split_percent,
                secondary = self.secondary_split_percent,
                "Drag ended"
            );
        }
        ended
    }

    /// Apply a pointer move to the active drag. `root` is the workspace
    /// container and `secondary` the secondary region of the current frame.
    /// Returns whether a split ratio changed; out-of-range positions are ignored.
    pub fn drag_move(&mut self, column: u16, row: u16, root: Rect, secondary: Rect) -> bool {
        match self.dragging_handle {
            None => false,
            Some(DragHandle::Main) => match percent_along(column, root.x, root.width) {
                Some(percent) => self.set_main_split(percent),
                None => false,
            },
            Some(DragHandle::Secondary) => {
                let percent = match self.secondary_orientation {
                    Orientation::Vertical => percent_along(row, secondary.y, secondary.height),
                    Orientation::Horizontal => percent_along(column, secondary.x, secondary.width),
                };
                match percent {
                    Some(percent) => self.set_secondary_split(percent),
                    None => false,
                }
            }
        }
    }

    pub fn set_main_split(&mut self, percent: f32) -> bool {
        if !in_open_interval(percent, MAIN_SPLIT_BOUNDS) {
            return false;
        }
        self.main_split_percent = percent;
        true
    }

    pub fn set_secondary_split(&mut self, percent: f32) -> bool {
        if !in_open_interval(percent, SECONDARY_SPLIT_BOUNDS) {
            return false;
        }
        self.secondary_split_percent = percent;
        true
    }

    pub fn nudge_main(&mut self, delta: f32) -> bool {
        self.set_main_split(self.main_split_percent + delta)
    }

    pub fn nudge_secondary(&mut self, delta: f32) -> bool {
        self.set_secondary_split(self.secondary_split_percent + delta)
    }

    pub fn compute_areas(&self, area: Rect) -> PanelAreas {
        let focused_width = portion(area.width, self.main_split_percent);
        let focused = Rect::new(area.x, area.y, focused_width, area.height);
        let region = Rect::new(
            area.x + focused_width,
            area.y,
            area.width - focused_width,
            area.height,
        );

        let (first, second, secondary_handle) = match self.secondary_orientation {
            Orientation::Vertical => {
                let first_height = portion(region.height, self.secondary_split_percent);
                let first = Rect::new(region.x, region.y, region.width, first_height);
                let second = Rect::new(
                    region.x,
                    region.y + first_height,
                    region.width,
                    region.height - first_height,
                );
                let handle_y = second.y.saturating_sub(1).max(region.y);
                let handle = Rect::new(region.x, handle_y, region.width, (second.y - handle_y + 1).min(region.height));
                (first, second, handle)
            }
            Orientation::Horizontal => {
                let first_width = portion(region.width, self.secondary_split_percent);
                let first = Rect::new(region.x, region.y, first_width, region.height);
                let second = Rect::new(
                    region.x + first_width,
                    region.y,
                    region.width - first_width,
                    region.height,
                );
                let handle_x = second.x.saturating_sub(1).max(region.x);
                let handle = Rect::new(handle_x, region.y, (second.x - handle_x + 1).min(region.width), region.height);
                (first, second, handle)
            }
        };

        // Straddles the boundary: right border of the focused panel and left
        // border of the secondary region.
        let main_x = region.x.saturating_sub(1).max(area.x);
        let main_handle = Rect::new(main_x, area.y, (region.x - main_x + 1).min(area.width), area.height);

        PanelAreas {
            focused,
            secondary_region: region,
            secondary: [first, second],
            main_handle,
            secondary_handle,
        }
    }

    /// Rect of a given panel within `areas`.
    pub fn panel_area(&self, areas: &PanelAreas, panel: PanelId) -> Rect {
        if panel == self.focused_panel_id {
            areas.focused
        } else if panel == self.secondary_order[0] {
            areas.secondary[0]
        } else {
            areas.secondary[1]
        }
    }

    /// Panel under the pointer, if any.
    pub fn panel_at(&self, areas: &PanelAreas, column: u16, row: u16) -> Option<PanelId> {
        PanelId::ALL
            .into_iter()
            .find(|panel| contains(self.panel_area(areas, *panel), column, row))
    }
}

/// Which splitter, if any, a pointer-down at (`column`, `row`) grabs.
pub fn handle_at(areas: &PanelAreas, column: u16, row: u16) -> Option<DragHandle> {
    if contains(areas.main_handle, column, row) {
        Some(DragHandle::Main)
    } else if contains(areas.secondary_handle, column, row) {
        Some(DragHandle::Secondary)
    } else {
        None
    }
}
