pub mod config;
pub mod http;
pub mod room;
pub mod stage;
pub mod transport;

pub use config::*;
pub use http::*;
pub use room::*;
pub use stage::*;
pub use transport::*;
