mod authority;
mod service;

pub use authority::*;
pub use service::*;
