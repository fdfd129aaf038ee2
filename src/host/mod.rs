//! Host module - The view and controller driving the sprite player.

mod app;
mod view;

pub use app::*;
pub use view::*;
