//! Map Editor
//!
//! - 2D grid view of one floor (camera, picking, drawing)
//! - Editor session: selection, draw mode, status line, files
//! - Texture name resolution and surface preview

mod draw_list;
mod grid_view;
mod picker;
mod state;
mod surface_preview;
mod textures;

pub use draw_list::*;
pub use grid_view::*;
pub use picker::*;
pub use state::*;
pub use surface_preview::*;
pub use textures::*;
