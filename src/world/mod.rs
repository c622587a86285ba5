//! World module - sector-grid maps
//!
//! - Per-cell sectors with walls, height surfaces and optional doors
//! - Sparse multi-floor storage with adjoin consistency
//! - RON persistence

mod error;
mod geometry;
mod level;
mod map;

pub use error::*;
pub use geometry::*;
pub use level::*;
pub use map::*;
