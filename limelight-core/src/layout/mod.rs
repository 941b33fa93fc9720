mod controller;
mod engine;
mod mode;

pub use controller::LayoutController;
pub use engine::{Layout, StageMember, Tile, compute_layout};
pub use mode::{LayoutMode, ParseLayoutModeError};
