use tracing::info;

use crate::layout::engine::{Layout, StageMember, compute_layout};
use crate::layout::mode::LayoutMode;

/// Holds the current layout mode and applies the screen-share nudge.
///
/// The nudge is edge-triggered: only a screen share *becoming* active while
/// in grid mode switches to sidebar. It never switches back, and a manual
/// choice of grid during an ongoing share stays in effect.
#[derive(Debug, Clone)]
pub struct LayoutController {
    mode: LayoutMode,
    screen_share_active: bool,
}

impl LayoutController {
    pub fn new(mode: LayoutMode) -> Self {
        Self {
            mode,
            screen_share_active: false,
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Manual selection. Sticky until the next screen share starts.
    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.mode = mode;
    }

    /// Feed the current stage. Returns the new mode when the nudge fired.
    pub fn observe(&mut self, members: &[StageMember]) -> Option<LayoutMode> {
        let active = members.iter().any(|m| m.capabilities.has_screen_share);
        let started = active && !self.screen_share_active;
        self.screen_share_active = active;

        if started && self.mode == LayoutMode::Grid {
            info!("Screen share started, switching layout from grid to sidebar");
            self.mode = LayoutMode::Sidebar;
            return Some(self.mode);
        }
        None
    }

    /// Recomputed on every call from the members given.
    pub fn layout(&self, members: &[StageMember]) -> Layout {
        compute_layout(self.mode, members)
    }
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new(LayoutMode::default())
    }
}
