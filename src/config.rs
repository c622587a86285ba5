//! Editor configuration
//!
//! Read from a RON file; every field falls back to its default, so a
//! partial or missing file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory texture names are resolved against
    pub texture_dir: PathBuf,
    /// Extension appended when a bare texture name is not found
    pub texture_ext: String,
    /// Default directory for map files
    pub levels_dir: PathBuf,
    /// On-screen cell size at zoom 0, in pixels
    pub min_cell_size: f32,
    /// On-screen cell size at zoom 1, in pixels
    pub max_cell_size: f32,
    pub default_zoom: f32,
    /// Initial camera offset, in cells
    pub start_cam_z: f32,
    pub start_cam_x: f32,
    /// Range the editor keeps floor/ceiling height offsets in
    pub min_surface_offset: i32,
    pub max_surface_offset: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("Textures"),
            texture_ext: ".png".to_string(),
            levels_dir: PathBuf::from("assets/levels"),
            min_cell_size: 16.0,
            max_cell_size: 256.0,
            default_zoom: 0.5,
            start_cam_z: -7.5,
            start_cam_x: -3.5,
            min_surface_offset: -2,
            max_surface_offset: 2,
        }
    }
}

impl EditorConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = ron::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path().join("editor.ron")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        fs::write(&path, "(max_cell_size: 128.0, texture_ext: \".bmp\")").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.max_cell_size, 128.0);
        assert_eq!(config.texture_ext, ".bmp");
        assert_eq!(config.min_cell_size, 16.0);
        assert_eq!(config.max_surface_offset, 2);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        fs::write(&path, "(max_cell_size: )").unwrap();
        assert!(EditorConfig::load(&path).is_err());
    }
}
