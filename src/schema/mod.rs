//! Schema module - Configuration and catalog record types.

mod config;
mod entity;

pub use config::*;
pub use entity::*;
