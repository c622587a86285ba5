//! Texture name resolution against a texture directory
//!
//! Only names are handled here; images are never decoded.

use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::config::EditorConfig;

/// A directory of texture files plus the extension tried for bare names
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDir {
    dir: PathBuf,
    ext: String,
}

impl TextureDir {
    pub fn new(dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ext: ext.into(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.texture_dir.clone(), config.texture_ext.clone())
    }

    /// Resolve a user-typed name to a texture file name.
    ///
    /// Returns `name` if `<dir>/<name>` exists, else `name` with the default
    /// extension appended if that exists, else `None`.
    pub fn adjust_name(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if self.dir.join(name).is_file() {
            return Some(name.to_string());
        }

        let with_ext = format!("{}{}", name, self.ext);
        if self.dir.join(&with_ext).is_file() {
            return Some(with_ext);
        }

        None
    }

    /// File names in the directory, sorted
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read texture dir {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }
}
