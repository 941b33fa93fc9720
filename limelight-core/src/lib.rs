pub mod error;
pub mod layout;
pub mod model;

pub use error::{MetadataError, StageError};
pub use layout::{Layout, LayoutController, LayoutMode, StageMember, Tile, compute_layout};
pub use model::*;
