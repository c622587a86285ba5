//! Immediate-mode UI helpers
//!
//! Rect layout, per-frame mouse state and a flat toolbar.

mod input;
mod rect;
mod widgets;

pub use input::*;
pub use rect::*;
pub use widgets::*;
