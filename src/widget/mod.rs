//! Widget module - Timeline provider mirroring the selection.

mod center;
mod provider;

pub use center::*;
pub use provider::*;
