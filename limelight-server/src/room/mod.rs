mod admission;
mod credentials;
mod host_registry;

pub use admission::*;
pub use credentials::*;
pub use host_registry::*;
