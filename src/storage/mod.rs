//! Storage module - Sprite assets and the shared selection store.

mod assets;
mod selection;

pub use assets::*;
pub use selection::*;
