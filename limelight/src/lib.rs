pub use limelight_core::{Identity, LayoutMode, RoomId, StageError};

pub mod model {
    pub use limelight_core::model::*;
}

pub mod layout {
    pub use limelight_core::layout::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use limelight_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use limelight_client::*;
}
