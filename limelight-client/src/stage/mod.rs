mod controller;
mod observer;

pub use controller::*;
pub use observer::*;
