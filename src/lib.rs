//! Sector editor: multi-floor grid maps for sector/portal engines
//!
//! - `world`: sectors, walls, surfaces, doors and the map that keeps
//!   adjoins consistent
//! - `editor`: camera, picking and the editing session
//! - `ui`: immediate-mode helpers for the macroquad front end

pub mod config;
pub mod editor;
pub mod ui;
pub mod world;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
