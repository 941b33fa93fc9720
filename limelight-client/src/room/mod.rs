mod handle;
mod subscription;

pub use handle::*;
pub use subscription::Subscription;
